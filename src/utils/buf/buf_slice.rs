use std::{ops::Range, sync::Arc};

use super::{BufWtr, OwnedBufWtr};

/// Read-only view into a shared buffer. Cloning shares the buffer.
#[derive(Debug)]
pub struct BufSlice {
    buf: Arc<OwnedBufWtr>,
    range: Range<usize>,
}

pub struct BufSliceBuilder {
    pub buf: Arc<OwnedBufWtr>,
    pub range: Range<usize>,
}

impl BufSliceBuilder {
    pub fn build(self) -> Result<BufSlice, Error> {
        if !(self.range.start <= self.range.end) {
            return Err(Error::IndexOutOfRange);
        }
        if !(self.range.end <= self.buf.data_len()) {
            return Err(Error::IndexOutOfRange);
        }

        let this = BufSlice {
            buf: self.buf,
            range: self.range,
        };
        this.check_rep();
        Ok(this)
    }
}

impl BufSlice {
    #[inline]
    fn check_rep(&self) {
        assert!(self.range.start <= self.range.end);
        assert!(self.range.end <= self.buf.data_len());
    }

    pub fn from_wtr(wtr: OwnedBufWtr) -> Self {
        let range = 0..wtr.data_len();
        let this = BufSlice {
            buf: Arc::new(wtr),
            range,
        };
        this.check_rep();
        this
    }

    pub fn from_bytes(buf: Vec<u8>) -> Self {
        let buf_len = buf.len();
        let wtr = OwnedBufWtr::from_bytes(buf, 0, buf_len);
        Self::from_wtr(wtr)
    }

    #[must_use]
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.buf.data()[self.range.start..self.range.end]
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both slices view the same underlying allocation.
    #[must_use]
    #[inline]
    pub fn shares_buf_with(&self, other: &BufSlice) -> bool {
        Arc::ptr_eq(&self.buf, &other.buf)
    }

    pub fn pop_front(&mut self, len: usize) -> Result<BufSlice, Error> {
        let range_mid = self.range.start + len;
        if !(range_mid <= self.range.end) {
            return Err(Error::IndexOutOfRange);
        }
        let front = BufSliceBuilder {
            buf: Arc::clone(&self.buf),
            range: self.range.start..range_mid,
        }
        .build()?;
        self.range.start = range_mid;
        self.check_rep();
        Ok(front)
    }
}

impl Clone for BufSlice {
    fn clone(&self) -> Self {
        BufSlice {
            buf: Arc::clone(&self.buf),
            range: self.range.clone(),
        }
    }
}

impl PartialEq for BufSlice {
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data()
    }
}

impl Eq for BufSlice {}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    IndexOutOfRange,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{BufSlice, BufSliceBuilder, BufWtr, OwnedBufWtr};

    #[test]
    fn data() {
        let mut buf = OwnedBufWtr::new(1024, 512);
        buf.append(&[0, 1, 2]).unwrap();
        let slice = BufSliceBuilder {
            buf: Arc::new(buf),
            range: 1..3,
        }
        .build()
        .unwrap();
        assert_eq!(slice.data(), vec![1, 2]);
    }

    #[test]
    fn pop_front() {
        let mut buf = BufSlice::from_bytes(vec![0, 1, 2, 3, 4, 5]);
        let slice0 = buf.pop_front(1).unwrap();
        assert_eq!(slice0.data(), vec![0]);
        let slice12 = buf.pop_front(2).unwrap();
        assert_eq!(slice12.data(), vec![1, 2]);
        assert!(!buf.is_empty());
        assert!(buf.pop_front(99).is_err());
        let slice345 = buf.pop_front(3).unwrap();
        assert_eq!(slice345.data(), vec![3, 4, 5]);
        assert!(buf.is_empty());
        assert!(buf.pop_front(1).is_err());
    }

    #[test]
    fn clone_shares_buf() {
        let a = BufSlice::from_bytes(vec![1, 2, 3]);
        let b = a.clone();
        let c = BufSlice::from_bytes(vec![1, 2, 3]);
        assert!(a.shares_buf_with(&b));
        assert!(!a.shares_buf_with(&c));
        assert_eq!(a, c);
    }
}
