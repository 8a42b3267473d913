use super::{buf_wtr::Error, BufWtr};

#[derive(Debug)]
pub struct OwnedBufWtr {
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl OwnedBufWtr {
    #[inline]
    fn check_rep(&self) {
        assert!(self.start <= self.end);
        assert!(self.end <= self.buf.len());
    }

    pub fn from_bytes(buf: Vec<u8>, start: usize, end: usize) -> Self {
        let this = Self { buf, start, end };
        this.check_rep();
        this
    }

    /// `headroom` bytes are reserved in front of the data for prepending.
    pub fn new(len: usize, headroom: usize) -> Self {
        let this = Self {
            buf: vec![0; len],
            start: headroom,
            end: headroom,
        };
        this.check_rep();
        this
    }
}

impl BufWtr for OwnedBufWtr {
    #[inline]
    fn data_len(&self) -> usize {
        self.end - self.start
    }
    #[inline]
    fn front_len(&self) -> usize {
        self.start
    }
    #[inline]
    fn back_len(&self) -> usize {
        self.buf.len() - self.end
    }
    #[inline]
    fn is_empty(&self) -> bool {
        self.data_len() == 0
    }
    #[inline]
    fn data(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }
    #[inline]
    fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.start..self.end]
    }
    #[inline]
    fn front_free_space(&mut self) -> &mut [u8] {
        &mut self.buf[..self.start]
    }
    #[inline]
    fn back_free_space(&mut self) -> &mut [u8] {
        &mut self.buf[self.end..]
    }
    #[inline]
    fn grow_front(&mut self, len: usize) -> Result<(), Error> {
        if self.start < len {
            return Err(Error::NotEnoughSpace);
        }
        self.start -= len;
        self.check_rep();
        Ok(())
    }
    #[inline]
    fn grow_back(&mut self, len: usize) -> Result<(), Error> {
        if self.buf.len() < self.end + len {
            return Err(Error::NotEnoughSpace);
        }
        self.end += len;
        self.check_rep();
        Ok(())
    }
    #[inline]
    fn append(&mut self, n: &[u8]) -> Result<(), Error> {
        if self.back_len() < n.len() {
            return Err(Error::NotEnoughSpace);
        }
        self.back_free_space()[..n.len()].copy_from_slice(n);
        self.grow_back(n.len())?;
        Ok(())
    }
    #[inline]
    fn prepend(&mut self, n: &[u8]) -> Result<(), Error> {
        if self.front_len() < n.len() {
            return Err(Error::NotEnoughSpace);
        }
        let start = self.start - n.len();
        self.front_free_space()[start..].copy_from_slice(n);
        self.grow_front(n.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy() {
        let mut buf = OwnedBufWtr::new(1024, 512);
        let tail = vec![1, 2, 3];
        let head = vec![4, 5, 6];
        buf.append(&tail).unwrap();
        buf.prepend(&head).unwrap();
        assert_eq!(buf.data(), vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn exact_fit() {
        let mut buf = OwnedBufWtr::new(5, 2);
        buf.append(b"xxx").unwrap();
        buf.prepend(&[1, 2]).unwrap();
        assert_eq!(buf.data(), b"\x01\x02xxx");
        assert_eq!(buf.front_len(), 0);
        assert_eq!(buf.back_len(), 0);
        assert_eq!(buf.prepend(&[0]), Err(Error::NotEnoughSpace));
        assert_eq!(buf.append(b"x"), Err(Error::NotEnoughSpace));
    }
}
