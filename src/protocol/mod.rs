//! # Segment routing header
//!
//! ```text
//! 0       8       16      24      32 (BIT)
//! +-------+-------+-------+-------+
//! | next  |hdr len| type  |seg lft|
//! +-------+-------+-------+-------+
//! |last en| flags |      tag      |
//! +-------+-------+---------------+
//! |     segment[0] (16 BYTE)      |
//! +-------------------------------+
//! |              ...              |
//! +-------------------------------+
//! | segment[last en] (16 BYTE)    |
//! +-------------------------------+
//! ```
//!
//! Ethernet, IPv6, IPv4 and UDP headers are encoded and decoded with
//! `etherparse`.
//!
//! # Packet structure
//!
//! ```text
//! (Ethernet) (IPv6) (SRH) (IPv4) (UDP) (Payload)
//! ```
//!
//! # Invariants
//!
//! - SRH `hdr len` is `2 * (last en + 1)`; TLVs are not carried
//! - SRH `seg lft` is not greater than `last en`
//! - Every length field covers exactly the bytes that follow its header

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub mod mac;
pub mod packet;
pub mod srh;

/// IP protocol numbers carried in the SRH `next` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum IpProto {
    /// IPv4 encapsulated in IP
    IpIp = 4,
    Udp = 17,
    Ipv6 = 41,
    Ipv6Route = 43,
}

impl From<IpProto> for etherparse::IpNumber {
    fn from(proto: IpProto) -> Self {
        etherparse::IpNumber(proto.into())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DecodingError {
    Decoding { field: &'static str },
}

#[derive(Debug, PartialEq, Eq)]
pub enum EncodingError {
    NotEnoughSpace,
    Header { field: &'static str },
}

#[derive(Debug, PartialEq, Eq)]
pub enum BuildError {
    NoSegments,
    TooManySegments,
    PayloadTooLarge,
}
