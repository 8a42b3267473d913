use std::net::Ipv6Addr;

use etherparse::{EtherType, Ethernet2Header, IpNumber, Ipv4Header, Ipv6Header, UdpHeader};

use crate::utils::buf::{BufSlice, BufWtr, OwnedBufWtr};

use super::{srh::SegmentRoutingHeader, DecodingError, EncodingError, IpProto};

/// `Ethernet / IPv6 / SRH / IPv4 / UDP / payload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Srv6Packet {
    ether: Ethernet2Header,
    ipv6: Ipv6Header,
    srh: SegmentRoutingHeader,
    ipv4: Ipv4Header,
    udp: UdpHeader,
    payload: BufSlice,
}

pub struct Srv6PacketBuilder {
    pub ether: Ethernet2Header,
    pub ipv6: Ipv6Header,
    pub srh: SegmentRoutingHeader,
    pub ipv4: Ipv4Header,
    pub udp: UdpHeader,
    pub payload: BufSlice,
}

impl Srv6PacketBuilder {
    pub fn build(self) -> Result<Srv6Packet, Error> {
        let this = Srv6Packet {
            ether: self.ether,
            ipv6: self.ipv6,
            srh: self.srh,
            ipv4: self.ipv4,
            udp: self.udp,
            payload: self.payload,
        };
        this.validate().map_err(|field| Error::Inconsistent { field })?;
        this.check_rep();
        Ok(this)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Inconsistent { field: &'static str },
}

/// Decodes one header off the front of `slice`.
fn pop_hdr<H, E>(
    slice: &mut BufSlice,
    field: &'static str,
    from_slice: impl FnOnce(&[u8]) -> Result<(H, &[u8]), E>,
) -> Result<H, DecodingError> {
    let data = slice.data();
    let (hdr, rest) = from_slice(data).map_err(|_e| DecodingError::Decoding { field })?;
    let hdr_len = data.len() - rest.len();
    slice
        .pop_front(hdr_len)
        .map_err(|_e| DecodingError::Decoding { field })?;
    Ok(hdr)
}

/// Serializes one header in front of what `wtr` already holds.
fn prepend_hdr<E>(
    wtr: &mut impl BufWtr,
    field: &'static str,
    write: impl FnOnce(&mut Vec<u8>) -> Result<(), E>,
) -> Result<(), EncodingError> {
    let mut hdr = Vec::new();
    write(&mut hdr).map_err(|_e| EncodingError::Header { field })?;
    wtr.prepend(&hdr)
        .map_err(|_e| EncodingError::NotEnoughSpace)?;
    Ok(())
}

impl Srv6Packet {
    #[inline]
    fn check_rep(&self) {
        assert_eq!(self.validate(), Ok(()));
    }

    /// Names the first header field that disagrees with the layers after it.
    fn validate(&self) -> Result<(), &'static str> {
        if self.ether.ether_type != EtherType::IPV6 {
            return Err("ether_type");
        }
        if self.ipv6.next_header != IpNumber::from(IpProto::Ipv6Route) {
            return Err("next_header");
        }
        if Ipv6Addr::from(self.ipv6.destination) != self.srh.active_segment() {
            return Err("destination");
        }
        if self.ipv6.payload_length as usize != self.srh.hdr_len() + self.ipv4.total_len as usize {
            return Err("payload_length");
        }
        if self.srh.next_header() != IpProto::IpIp {
            return Err("next_header");
        }
        if self.ipv4.protocol != IpNumber::UDP {
            return Err("protocol");
        }
        if self.ipv4.header_checksum != self.ipv4.calc_header_checksum() {
            return Err("header_checksum");
        }
        if self.ipv4.total_len as usize != self.ipv4.header_len() + self.udp.length as usize {
            return Err("total_len");
        }
        if self.udp.length as usize != UdpHeader::LEN + self.payload.len() {
            return Err("length");
        }
        // zero means no checksum was computed
        if self.udp.checksum != 0
            && self
                .udp
                .calc_checksum_ipv4(&self.ipv4, self.payload.data())
                .ok()
                != Some(self.udp.checksum)
        {
            return Err("checksum");
        }
        Ok(())
    }

    /// Consumes the whole slice.
    pub fn from_slice(slice: &mut BufSlice) -> Result<Self, DecodingError> {
        let ether = pop_hdr(slice, "ethernet", Ethernet2Header::from_slice)?;
        let ipv6 = pop_hdr(slice, "ipv6", Ipv6Header::from_slice)?;
        if ipv6.payload_length as usize != slice.len() {
            return Err(DecodingError::Decoding {
                field: "payload_length",
            });
        }
        let srh = SegmentRoutingHeader::from_slice(slice)?;
        let ipv4 = pop_hdr(slice, "ipv4", Ipv4Header::from_slice)?;
        let udp = pop_hdr(slice, "udp", UdpHeader::from_slice)?;
        let payload = slice
            .pop_front(slice.len())
            .map_err(|_e| DecodingError::Decoding { field: "payload" })?;

        let this = Srv6Packet {
            ether,
            ipv6,
            srh,
            ipv4,
            udp,
            payload,
        };
        this.validate()
            .map_err(|field| DecodingError::Decoding { field })?;
        Ok(this)
    }

    /// Writes the payload, then prepends every header innermost-first.
    pub fn encode(&self) -> Result<BufSlice, EncodingError> {
        let hdr_len = self.hdr_len();
        let mut wtr = OwnedBufWtr::new(hdr_len + self.payload.len(), hdr_len);
        wtr.append(self.payload.data())
            .map_err(|_e| EncodingError::NotEnoughSpace)?;
        prepend_hdr(&mut wtr, "udp", |hdr| self.udp.write(hdr))?;
        prepend_hdr(&mut wtr, "ipv4", |hdr| self.ipv4.write(hdr))?;
        self.srh.prepend_to(&mut wtr)?;
        prepend_hdr(&mut wtr, "ipv6", |hdr| self.ipv6.write(hdr))?;
        prepend_hdr(&mut wtr, "ethernet", |hdr| self.ether.write(hdr))?;
        assert_eq!(wtr.data_len(), self.frame_len());
        Ok(BufSlice::from_wtr(wtr))
    }

    /// Length of the header stack without payload
    #[must_use]
    pub fn hdr_len(&self) -> usize {
        Ethernet2Header::LEN
            + Ipv6Header::LEN
            + self.srh.hdr_len()
            + self.ipv4.header_len()
            + UdpHeader::LEN
    }

    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.hdr_len() + self.payload.len()
    }

    #[must_use]
    #[inline]
    pub fn ether(&self) -> &Ethernet2Header {
        &self.ether
    }

    #[must_use]
    #[inline]
    pub fn ipv6(&self) -> &Ipv6Header {
        &self.ipv6
    }

    #[must_use]
    #[inline]
    pub fn srh(&self) -> &SegmentRoutingHeader {
        &self.srh
    }

    #[must_use]
    #[inline]
    pub fn ipv4(&self) -> &Ipv4Header {
        &self.ipv4
    }

    #[must_use]
    #[inline]
    pub fn udp(&self) -> &UdpHeader {
        &self.udp
    }

    #[must_use]
    #[inline]
    pub fn payload(&self) -> &BufSlice {
        &self.payload
    }
}
