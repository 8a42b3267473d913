use std::{collections::BTreeMap, fmt};

use crate::template::PacketTemplate;

/// How the host transmits a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Retransmit the packet repeatedly with no total count
    Continuous,
}

/// A packet template paired with its transmission mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    packet: PacketTemplate,
    mode: TxMode,
}

pub struct StreamBuilder {
    pub packet: PacketTemplate,
    pub mode: TxMode,
}

impl StreamBuilder {
    pub fn build(self) -> Stream {
        Stream {
            packet: self.packet,
            mode: self.mode,
        }
    }
}

impl Stream {
    #[must_use]
    #[inline]
    pub fn packet(&self) -> &PacketTemplate {
        &self.packet
    }

    #[must_use]
    #[inline]
    pub fn mode(&self) -> TxMode {
        self.mode
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    ClientToServer,
    ServerToClient,
}

impl Direction {
    pub fn from_tunable(value: &str) -> Option<Self> {
        match value {
            "0" => Some(Direction::ClientToServer),
            "1" => Some(Direction::ServerToClient),
            _ => None,
        }
    }
}

pub const DEFAULT_PACKET_LEN: i64 = 64;
pub const DEFAULT_STREAM_COUNT: usize = 1;

/// Arguments of a `get_streams` call.
///
/// `direction`, `packet_len` and `stream_count` are the recognized options;
/// anything else the host passes lands in `extra`, where profiles are free
/// to ignore it. So does a `direction` outside `0` and `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    pub direction: Direction,
    pub packet_len: i64,
    pub stream_count: usize,
    pub extra: BTreeMap<String, String>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            direction: Direction::default(),
            packet_len: DEFAULT_PACKET_LEN,
            stream_count: DEFAULT_STREAM_COUNT,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum OptionsError {
    Syntax { option: String },
    Value { key: String, value: String },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::Syntax { option } => {
                write!(f, "expected `key=value`, got `{}`", option)
            }
            OptionsError::Value { key, value } => {
                write!(f, "invalid value `{}` for `{}`", value, key)
            }
        }
    }
}

impl std::error::Error for OptionsError {}

impl StreamOptions {
    /// Parses a host tunables string such as
    /// `packet_len=128,stream_count=4,vlan=10`.
    pub fn from_tunables(tunables: &str) -> Result<Self, OptionsError> {
        let mut this = StreamOptions::default();
        for option in tunables.split(',').map(str::trim) {
            if option.is_empty() {
                continue;
            }
            let (key, value) = option.split_once('=').ok_or_else(|| OptionsError::Syntax {
                option: option.to_string(),
            })?;
            this.set(key.trim(), value.trim())?;
        }
        Ok(this)
    }

    /// Sets one option by name. Unrecognized keys are stored in `extra`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = || OptionsError::Value {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "direction" => match Direction::from_tunable(value) {
                Some(direction) => self.direction = direction,
                None => {
                    self.extra.insert(key.to_string(), value.to_string());
                }
            },
            "packet_len" => {
                self.packet_len = value.parse().map_err(|_e| invalid())?;
            }
            "stream_count" => {
                // negative counts produce no streams
                let count: i64 = value.parse().map_err(|_e| invalid())?;
                self.stream_count = usize::try_from(count).unwrap_or(0);
            }
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = StreamOptions::default();
        assert_eq!(opts.direction, Direction::ClientToServer);
        assert_eq!(opts.packet_len, 64);
        assert_eq!(opts.stream_count, 1);
        assert!(opts.extra.is_empty());
        assert_eq!(StreamOptions::from_tunables("").unwrap(), opts);
    }

    #[test]
    fn tunables() {
        let opts =
            StreamOptions::from_tunables("packet_len=128, stream_count=4,direction=1,vlan=10,")
                .unwrap();
        assert_eq!(opts.packet_len, 128);
        assert_eq!(opts.stream_count, 4);
        assert_eq!(opts.direction, Direction::ServerToClient);
        assert_eq!(opts.extra.len(), 1);
        assert_eq!(opts.extra["vlan"], "10");
    }

    #[test]
    fn negative_values() {
        let opts = StreamOptions::from_tunables("packet_len=-5,stream_count=-1").unwrap();
        assert_eq!(opts.packet_len, -5);
        assert_eq!(opts.stream_count, 0);
    }

    #[test]
    fn bad_tunables() {
        assert_eq!(
            StreamOptions::from_tunables("packet_len").unwrap_err(),
            OptionsError::Syntax {
                option: "packet_len".to_string()
            }
        );
        assert_eq!(
            StreamOptions::from_tunables("stream_count=many").unwrap_err(),
            OptionsError::Value {
                key: "stream_count".to_string(),
                value: "many".to_string()
            }
        );
    }

    #[test]
    fn unknown_direction() {
        for value in ["2", "-1", "up"] {
            let opts = StreamOptions::from_tunables(&format!("direction={}", value)).unwrap();
            assert_eq!(opts.direction, Direction::ClientToServer);
            assert_eq!(opts.extra["direction"], value);
        }
        let mut opts = StreamOptions::default();
        opts.set("direction", "1").unwrap();
        assert_eq!(opts.direction, Direction::ServerToClient);
        assert!(opts.extra.is_empty());
    }
}
