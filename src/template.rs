use std::net::{Ipv4Addr, Ipv6Addr};

use etherparse::{EtherType, Ethernet2Header, IpNumber, Ipv4Header, Ipv6Header, UdpHeader};
use log::debug;

use crate::{
    protocol::{
        mac::MacAddr,
        packet::{self, Srv6Packet, Srv6PacketBuilder},
        srh::{SegmentRoutingHeaderBuilder, SEGMENT_LEN, SRH_FIXED_LEN},
        BuildError, DecodingError, EncodingError, IpProto,
    },
    utils::buf::BufSlice,
};

pub const DEFAULT_HOP_LIMIT: u8 = 64;
pub const DEFAULT_TTL: u8 = 64;
pub const DEFAULT_IPV4_ID: u16 = 1;
pub const DEFAULT_PORT: u16 = 10053;
pub const DEFAULT_FILLER: u8 = b'x';

/// Parameters of an End.DX4 benchmark packet:
/// `Ethernet / IPv6 / SRH(segments) / IPv4 / UDP / filler`.
///
/// The outer IPv6 destination is the last of `segments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBuilder {
    pub dst_mac: MacAddr,
    pub src_mac: MacAddr,
    pub outer_src: Ipv6Addr,
    pub hop_limit: u8,
    pub segments: Vec<Ipv6Addr>,
    pub inner_src: Ipv4Addr,
    pub inner_dst: Ipv4Addr,
    pub ttl: u8,
    pub src_port: u16,
    pub dst_port: u16,
    pub filler: u8,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        TemplateBuilder {
            dst_mac: MacAddr::BROADCAST,
            src_mac: MacAddr::ZERO,
            outer_src: Ipv6Addr::new(0xfc00, 1, 0, 0, 0, 0, 0, 1),
            hop_limit: DEFAULT_HOP_LIMIT,
            segments: vec![Ipv6Addr::new(0xfc00, 2, 0, 0, 0, 0, 0, 2)],
            inner_src: Ipv4Addr::new(10, 1, 0, 1),
            inner_dst: Ipv4Addr::new(10, 2, 0, 1),
            ttl: DEFAULT_TTL,
            src_port: DEFAULT_PORT,
            dst_port: DEFAULT_PORT,
            filler: DEFAULT_FILLER,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    NoSegments,
    TooManySegments,
    PacketTooLarge,
    Packet(packet::Error),
    Encoding(EncodingError),
}

impl From<BuildError> for Error {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::NoSegments => Error::NoSegments,
            BuildError::TooManySegments => Error::TooManySegments,
            BuildError::PayloadTooLarge => Error::PacketTooLarge,
        }
    }
}

impl TemplateBuilder {
    /// Length of the header stack alone.
    #[must_use]
    pub fn unpadded_len(&self) -> usize {
        Ethernet2Header::LEN
            + Ipv6Header::LEN
            + SRH_FIXED_LEN
            + SEGMENT_LEN * self.segments.len()
            + Ipv4Header::MIN_LEN
            + UdpHeader::LEN
    }

    /// Pads the header stack with `filler` up to `packet_len` bytes. A
    /// `packet_len` shorter than the header stack yields no padding; headers
    /// are never truncated.
    pub fn build(&self, packet_len: i64) -> Result<PacketTemplate, Error> {
        let unpadded_len = self.unpadded_len();
        let padding_len = packet_len.saturating_sub(unpadded_len as i64).max(0);
        let padding_len = usize::try_from(padding_len).map_err(|_e| Error::PacketTooLarge)?;

        let srh = SegmentRoutingHeaderBuilder {
            next_header: IpProto::IpIp,
            flags: 0,
            tag: 0,
            segments: self.segments.clone(),
        }
        .build()?;
        let payload = vec![self.filler; padding_len];

        let total_len = u16::try_from(Ipv4Header::MIN_LEN + UdpHeader::LEN + padding_len)
            .map_err(|_e| Error::PacketTooLarge)?;
        let mut ipv4 = Ipv4Header {
            total_len,
            identification: DEFAULT_IPV4_ID,
            dont_fragment: false,
            more_fragments: false,
            time_to_live: self.ttl,
            protocol: IpNumber::UDP,
            source: self.inner_src.octets(),
            destination: self.inner_dst.octets(),
            ..Default::default()
        };
        ipv4.header_checksum = ipv4.calc_header_checksum();
        let udp = UdpHeader::with_ipv4_checksum(self.src_port, self.dst_port, &ipv4, &payload)
            .map_err(|_e| Error::PacketTooLarge)?;

        let payload_length = u16::try_from(srh.hdr_len() + total_len as usize)
            .map_err(|_e| Error::PacketTooLarge)?;
        let ipv6 = Ipv6Header {
            traffic_class: 0,
            payload_length,
            next_header: IpProto::Ipv6Route.into(),
            hop_limit: self.hop_limit,
            source: self.outer_src.octets(),
            destination: srh.active_segment().octets(),
            ..Default::default()
        };
        let ether = Ethernet2Header {
            source: self.src_mac.octets(),
            destination: self.dst_mac.octets(),
            ether_type: EtherType::IPV6,
        };

        let packet = Srv6PacketBuilder {
            ether,
            ipv6,
            srh,
            ipv4,
            udp,
            payload: BufSlice::from_bytes(payload),
        }
        .build()
        .map_err(Error::Packet)?;
        let bytes = packet.encode().map_err(Error::Encoding)?;

        debug!(
            "built SRv6 template: {} bytes ({} padding, {} segments)",
            bytes.len(),
            padding_len,
            self.segments.len()
        );
        let this = PacketTemplate { bytes, padding_len };
        this.check_rep(unpadded_len);
        Ok(this)
    }
}

/// Immutable packet bytes. Clones share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketTemplate {
    bytes: BufSlice,
    padding_len: usize,
}

impl PacketTemplate {
    #[inline]
    fn check_rep(&self, unpadded_len: usize) {
        assert_eq!(self.bytes.len(), unpadded_len + self.padding_len);
    }

    #[must_use]
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.bytes.data()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn padding_len(&self) -> usize {
        self.padding_len
    }

    #[must_use]
    #[inline]
    pub fn shares_bytes_with(&self, other: &PacketTemplate) -> bool {
        self.bytes.shares_buf_with(&other.bytes)
    }

    pub fn decode(&self) -> Result<Srv6Packet, DecodingError> {
        let mut slice = self.bytes.clone();
        Srv6Packet::from_slice(&mut slice)
    }
}
