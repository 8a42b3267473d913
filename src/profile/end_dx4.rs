//! SRv6 End.DX4 benchmark profile.
//!
//! Every stream carries the same packet: an IPv4/UDP datagram encapsulated
//! in IPv6 with a one-segment SRH, padded with filler to the requested size.

use log::trace;

use crate::{
    stream::{Stream, StreamBuilder, StreamOptions, TxMode},
    template::TemplateBuilder,
};

use super::{Error, StreamProfile};

pub const NAME: &str = "srv6_end_dx4";
/// Frame check sequence the host appends to every packet on the wire
pub const FCS_LEN: i64 = 4;

#[derive(Debug, Clone, Default)]
pub struct Srv6EndDx4Bench {
    template: TemplateBuilder,
}

impl Srv6EndDx4Bench {
    pub fn new(template: TemplateBuilder) -> Self {
        Srv6EndDx4Bench { template }
    }

    /// `stream_count` continuous streams sharing one `packet_len`-byte
    /// template.
    pub fn create_stream(&self, packet_len: i64, stream_count: usize) -> Result<Vec<Stream>, Error> {
        let packet = self.template.build(packet_len)?;
        let streams = (0..stream_count)
            .map(|_| {
                StreamBuilder {
                    packet: packet.clone(),
                    mode: TxMode::Continuous,
                }
                .build()
            })
            .collect();
        Ok(streams)
    }
}

impl StreamProfile for Srv6EndDx4Bench {
    fn name(&self) -> &'static str {
        NAME
    }

    /// `direction` and extra options do not affect the packet.
    fn get_streams(&self, opts: &StreamOptions) -> Result<Vec<Stream>, Error> {
        for (key, value) in &opts.extra {
            trace!("{}: ignoring option {}={}", NAME, key, value);
        }
        self.create_stream(opts.packet_len.saturating_sub(FCS_LEN), opts.stream_count)
    }
}

/// Discovery entry point.
pub fn register() -> Box<dyn StreamProfile> {
    Box::new(Srv6EndDx4Bench::default())
}
