use std::{
    io::{Cursor, Read},
    net::Ipv6Addr,
};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use crate::utils::buf::{BufSlice, BufWtr};

use super::{BuildError, DecodingError, EncodingError, IpProto};

pub const SRH_FIXED_LEN: usize = 8;
pub const SEGMENT_LEN: usize = 16;
pub const ROUTING_TYPE_SRH: u8 = 4;
/// `hdr_ext_len` counts 8-byte units in a `u8`
pub const MAX_SEGMENTS: usize = u8::MAX as usize * 8 / SEGMENT_LEN;

/// IPv6 routing header of type 4.
///
/// Segments are kept in wire order: `segments[0]` is the final segment and
/// `segments[last_entry]` is the first one visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRoutingHeader {
    next_header: IpProto,
    segments_left: u8,
    last_entry: u8,
    flags: u8,
    tag: u16,
    segments: Vec<Ipv6Addr>,
}

pub struct SegmentRoutingHeaderBuilder {
    pub next_header: IpProto,
    pub flags: u8,
    pub tag: u16,
    pub segments: Vec<Ipv6Addr>,
}

impl SegmentRoutingHeaderBuilder {
    /// `segments_left` and `last_entry` are both derived as `segments.len() - 1`.
    pub fn build(self) -> Result<SegmentRoutingHeader, BuildError> {
        if self.segments.is_empty() {
            return Err(BuildError::NoSegments);
        }
        if self.segments.len() > MAX_SEGMENTS {
            return Err(BuildError::TooManySegments);
        }
        let last_entry = (self.segments.len() - 1) as u8;
        let this = SegmentRoutingHeader {
            next_header: self.next_header,
            segments_left: last_entry,
            last_entry,
            flags: self.flags,
            tag: self.tag,
            segments: self.segments,
        };
        this.check_rep();
        Ok(this)
    }
}

impl SegmentRoutingHeader {
    #[inline]
    fn check_rep(&self) {
        assert!(!self.segments.is_empty());
        assert!(self.segments.len() <= MAX_SEGMENTS);
        assert_eq!(self.last_entry as usize + 1, self.segments.len());
        assert!(self.segments_left <= self.last_entry);
    }

    pub fn from_slice(slice: &mut BufSlice) -> Result<Self, DecodingError> {
        let mut rdr = Cursor::new(slice.data());
        let next_header = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "next_header" })?;
        let next_header = IpProto::try_from(next_header)
            .map_err(|_e| DecodingError::Decoding { field: "next_header" })?;
        let hdr_ext_len = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "hdr_ext_len" })?;
        let routing_type = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "routing_type" })?;
        if routing_type != ROUTING_TYPE_SRH {
            return Err(DecodingError::Decoding {
                field: "routing_type",
            });
        }
        let segments_left = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "segments_left" })?;
        let last_entry = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "last_entry" })?;
        if segments_left > last_entry {
            return Err(DecodingError::Decoding {
                field: "segments_left",
            });
        }
        let segment_count = last_entry as usize + 1;
        if hdr_ext_len as usize * 8 != segment_count * SEGMENT_LEN {
            return Err(DecodingError::Decoding {
                field: "hdr_ext_len",
            });
        }
        let flags = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "flags" })?;
        let tag = rdr
            .read_u16::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "tag" })?;
        let mut segments = Vec::with_capacity(segment_count);
        for _ in 0..segment_count {
            let mut segment = [0; 16];
            rdr.read_exact(&mut segment)
                .map_err(|_e| DecodingError::Decoding { field: "segments" })?;
            segments.push(Ipv6Addr::from(segment));
        }

        let rdr_len = rdr.position() as usize;
        slice
            .pop_front(rdr_len)
            .map_err(|_e| DecodingError::Decoding { field: "segments" })?;

        let this = SegmentRoutingHeader {
            next_header,
            segments_left,
            last_entry,
            flags,
            tag,
            segments,
        };
        this.check_rep();
        Ok(this)
    }

    pub fn prepend_to(&self, wtr: &mut impl BufWtr) -> Result<(), EncodingError> {
        let mut hdr = vec![0; self.hdr_len()];
        hdr[0] = self.next_header.into();
        hdr[1] = self.hdr_ext_len();
        hdr[2] = ROUTING_TYPE_SRH;
        hdr[3] = self.segments_left;
        hdr[4] = self.last_entry;
        hdr[5] = self.flags;
        BigEndian::write_u16(&mut hdr[6..8], self.tag);
        for (i, segment) in self.segments.iter().enumerate() {
            let start = SRH_FIXED_LEN + i * SEGMENT_LEN;
            hdr[start..start + SEGMENT_LEN].copy_from_slice(&segment.octets());
        }

        wtr.prepend(&hdr)
            .map_err(|_e| EncodingError::NotEnoughSpace)?;
        Ok(())
    }

    /// Header length in bytes
    #[must_use]
    #[inline]
    pub fn hdr_len(&self) -> usize {
        SRH_FIXED_LEN + self.segments.len() * SEGMENT_LEN
    }

    /// Length in 8-octet units, not counting the first 8 octets
    #[must_use]
    #[inline]
    pub fn hdr_ext_len(&self) -> u8 {
        (SEGMENT_LEN * self.segments.len() / 8) as u8
    }

    #[must_use]
    #[inline]
    pub fn next_header(&self) -> IpProto {
        self.next_header
    }

    #[must_use]
    #[inline]
    pub fn segments_left(&self) -> u8 {
        self.segments_left
    }

    #[must_use]
    #[inline]
    pub fn last_entry(&self) -> u8 {
        self.last_entry
    }

    #[must_use]
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[must_use]
    #[inline]
    pub fn tag(&self) -> u16 {
        self.tag
    }

    #[must_use]
    #[inline]
    pub fn segments(&self) -> &[Ipv6Addr] {
        &self.segments
    }

    /// The segment currently being visited, i.e. the outer IPv6 destination.
    #[must_use]
    #[inline]
    pub fn active_segment(&self) -> Ipv6Addr {
        self.segments[self.segments_left as usize]
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::buf::OwnedBufWtr;

    use super::*;

    fn addr(s: &str) -> Ipv6Addr {
        s.parse().unwrap()
    }

    #[test]
    fn one_segment() {
        let hdr = SegmentRoutingHeaderBuilder {
            next_header: IpProto::IpIp,
            flags: 0,
            tag: 0,
            segments: vec![addr("fc00:2::2")],
        }
        .build()
        .unwrap();
        assert_eq!(hdr.hdr_ext_len(), 2);
        assert_eq!(hdr.segments_left(), 0);
        assert_eq!(hdr.last_entry(), 0);
        assert_eq!(hdr.hdr_len(), 24);
        assert_eq!(hdr.active_segment(), addr("fc00:2::2"));

        let mut wtr = OwnedBufWtr::new(1024, 512);
        hdr.prepend_to(&mut wtr).unwrap();
        assert_eq!(
            wtr.data(),
            vec![
                4, 2, 4, 0, // next_header, hdr_ext_len, routing_type, segments_left
                0, 0, 0, 0, // last_entry, flags, tag
                0xfc, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, // segment[0]
            ]
        );
    }

    #[test]
    fn three_segments() {
        let segments = vec![addr("fc00:3::3"), addr("fc00:2::2"), addr("fc00:1::1")];
        let hdr1 = SegmentRoutingHeaderBuilder {
            next_header: IpProto::Ipv6,
            flags: 0,
            tag: 0xbeef,
            segments: segments.clone(),
        }
        .build()
        .unwrap();
        assert_eq!(hdr1.hdr_ext_len(), 6);
        assert_eq!(hdr1.segments_left(), 2);
        assert_eq!(hdr1.last_entry(), 2);
        assert_eq!(hdr1.active_segment(), addr("fc00:1::1"));

        let mut wtr = OwnedBufWtr::new(1024, 512);
        wtr.append(&[1, 2]).unwrap();
        hdr1.prepend_to(&mut wtr).unwrap();
        let mut slice = BufSlice::from_wtr(wtr);
        let hdr2 = SegmentRoutingHeader::from_slice(&mut slice).unwrap();
        assert_eq!(hdr1, hdr2);
        assert_eq!(hdr2.segments(), &segments[..]);
        assert_eq!(slice.data(), vec![1, 2]);
    }

    #[test]
    fn segment_bounds() {
        let build = |n: usize| {
            SegmentRoutingHeaderBuilder {
                next_header: IpProto::IpIp,
                flags: 0,
                tag: 0,
                segments: vec![Ipv6Addr::LOCALHOST; n],
            }
            .build()
        };
        assert_eq!(build(0).unwrap_err(), BuildError::NoSegments);
        assert_eq!(build(MAX_SEGMENTS).unwrap().hdr_ext_len(), 254);
        assert_eq!(build(MAX_SEGMENTS + 1).unwrap_err(), BuildError::TooManySegments);
    }

    #[test]
    fn bad_fields() {
        let mut bytes = vec![4, 2, 4, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&[0; 16]);

        let mut wrong_type = bytes.clone();
        wrong_type[2] = 0;
        let err = SegmentRoutingHeader::from_slice(&mut BufSlice::from_bytes(wrong_type));
        assert_eq!(
            err.unwrap_err(),
            DecodingError::Decoding {
                field: "routing_type"
            }
        );

        let mut wrong_len = bytes.clone();
        wrong_len[1] = 4;
        let err = SegmentRoutingHeader::from_slice(&mut BufSlice::from_bytes(wrong_len));
        assert_eq!(
            err.unwrap_err(),
            DecodingError::Decoding {
                field: "hdr_ext_len"
            }
        );

        let mut wrong_left = bytes.clone();
        wrong_left[3] = 1;
        let err = SegmentRoutingHeader::from_slice(&mut BufSlice::from_bytes(wrong_left));
        assert_eq!(
            err.unwrap_err(),
            DecodingError::Decoding {
                field: "segments_left"
            }
        );

        bytes.truncate(20);
        let err = SegmentRoutingHeader::from_slice(&mut BufSlice::from_bytes(bytes));
        assert_eq!(err.unwrap_err(), DecodingError::Decoding { field: "segments" });
    }
}
