//! SRv6 End.DX4 benchmark traffic profile.
//!
//! Builds continuous-transmission stream descriptors around a byte-accurate
//! `Ethernet / IPv6 / SRH / IPv4 / UDP / padding` template and exposes them
//! to a packet generator through [`profile::ProfileRegistry`].

pub mod profile;
pub mod protocol;
pub mod stream;
pub mod template;
pub mod utils;
