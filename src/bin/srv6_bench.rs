use std::{
    fs,
    net::{Ipv4Addr, Ipv6Addr},
    path::PathBuf,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use log::info;
use srv6_bench::{
    profile::{
        end_dx4::{self, Srv6EndDx4Bench},
        ProfileRegistry, StreamProfile,
    },
    protocol::{mac::MacAddr, packet::Srv6Packet},
    stream::StreamOptions,
    template::TemplateBuilder,
};

const HEX_LINE_LEN: usize = 16;

/// Renders the streams of a registered profile without transmitting them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Profile to render.
    #[arg(short, long, default_value = end_dx4::NAME)]
    profile: String,

    /// List registered profiles and exit.
    #[arg(long)]
    list: bool,

    /// Host-style tunables, e.g. "packet_len=128,stream_count=4".
    #[arg(short, long, default_value = "")]
    tunables: String,

    /// Frame length on the wire, FCS included. Overrides tunables.
    #[arg(short = 'l', long, allow_negative_numbers = true)]
    packet_len: Option<i64>,

    /// Number of streams. Overrides tunables.
    #[arg(short = 'n', long)]
    stream_count: Option<usize>,

    /// 0 = client to server, 1 = server to client. Overrides tunables.
    #[arg(short, long, allow_negative_numbers = true)]
    direction: Option<String>,

    /// Ethernet destination of the srv6_end_dx4 template.
    #[arg(long)]
    dst_mac: Option<MacAddr>,

    /// Ethernet source of the srv6_end_dx4 template.
    #[arg(long)]
    src_mac: Option<MacAddr>,

    /// Print a hex dump of the template.
    #[arg(long)]
    hex: bool,

    /// Print the decoded layers of the template.
    #[arg(long)]
    decode: bool,

    /// Write the raw template bytes to a file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let registry = ProfileRegistry::builtin();
    if cli.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let opts = stream_options(&cli)?;
    let profile = create_profile(&cli, &registry)?;
    let streams = profile.get_streams(&opts)?;
    info!(
        "{}: {} streams, packet_len={}",
        profile.name(),
        streams.len(),
        opts.packet_len
    );
    for (i, stream) in streams.iter().enumerate() {
        println!(
            "stream {}: {:?}, {} bytes ({} padding)",
            i,
            stream.mode(),
            stream.packet().len(),
            stream.packet().padding_len()
        );
    }

    let Some(first) = streams.first() else {
        return Ok(());
    };
    let template = first.packet();
    if cli.decode {
        let packet = template
            .decode()
            .map_err(|e| anyhow!("template does not decode: {:?}", e))?;
        print_layers(&packet);
    }
    if cli.hex {
        print_hex(template.data());
    }
    if let Some(path) = &cli.output {
        fs::write(path, template.data())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {} bytes to {}", template.len(), path.display());
    }
    Ok(())
}

/// Tunables first, then the explicit flags on top.
fn stream_options(cli: &Cli) -> Result<StreamOptions> {
    let mut opts = StreamOptions::from_tunables(&cli.tunables)?;
    if let Some(packet_len) = cli.packet_len {
        opts.packet_len = packet_len;
    }
    if let Some(stream_count) = cli.stream_count {
        opts.stream_count = stream_count;
    }
    if let Some(direction) = &cli.direction {
        opts.set("direction", direction)?;
    }
    Ok(opts)
}

fn create_profile(cli: &Cli, registry: &ProfileRegistry) -> Result<Box<dyn StreamProfile>> {
    if cli.dst_mac.is_none() && cli.src_mac.is_none() {
        return Ok(registry.create(&cli.profile)?);
    }
    if cli.profile != end_dx4::NAME {
        bail!("--dst-mac and --src-mac only apply to {}", end_dx4::NAME);
    }
    let defaults = TemplateBuilder::default();
    let template = TemplateBuilder {
        dst_mac: cli.dst_mac.unwrap_or(defaults.dst_mac),
        src_mac: cli.src_mac.unwrap_or(defaults.src_mac),
        ..defaults
    };
    Ok(Box::new(Srv6EndDx4Bench::new(template)))
}

fn print_layers(packet: &Srv6Packet) {
    let ether = packet.ether();
    println!(
        "Ether  {} > {} type={:#06x}",
        MacAddr::from(ether.source),
        MacAddr::from(ether.destination),
        ether.ether_type.0
    );
    let ipv6 = packet.ipv6();
    println!(
        "IPv6   {} > {} hlim={} plen={}",
        Ipv6Addr::from(ipv6.source),
        Ipv6Addr::from(ipv6.destination),
        ipv6.hop_limit,
        ipv6.payload_length
    );
    let srh = packet.srh();
    println!(
        "SRH    len={} segleft={} lastentry={} segments={:?}",
        srh.hdr_ext_len(),
        srh.segments_left(),
        srh.last_entry(),
        srh.segments()
    );
    let ipv4 = packet.ipv4();
    println!(
        "IPv4   {} > {} ttl={} len={} chksum={:#06x}",
        Ipv4Addr::from(ipv4.source),
        Ipv4Addr::from(ipv4.destination),
        ipv4.time_to_live,
        ipv4.total_len,
        ipv4.header_checksum
    );
    let udp = packet.udp();
    println!(
        "UDP    {} > {} len={} chksum={:#06x}",
        udp.source_port, udp.destination_port, udp.length, udp.checksum
    );
    println!("Raw    {} bytes", packet.payload().len());
}

fn print_hex(data: &[u8]) {
    for (i, line) in data.chunks(HEX_LINE_LEN).enumerate() {
        let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
        println!("{:04x}  {}", i * HEX_LINE_LEN, hex.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use srv6_bench::stream::Direction;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("srv6-bench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_tunables() {
        let cli = parse(&[
            "-t",
            "packet_len=128,stream_count=4,direction=1",
            "-l",
            "-5",
            "-d",
            "0",
        ]);
        let opts = stream_options(&cli).unwrap();
        assert_eq!(opts.packet_len, -5);
        assert_eq!(opts.stream_count, 4);
        assert_eq!(opts.direction, Direction::ClientToServer);
    }

    #[test]
    fn unknown_direction_is_kept() {
        let opts = stream_options(&parse(&["-d", "2"])).unwrap();
        assert_eq!(opts.direction, Direction::ClientToServer);
        assert_eq!(opts.extra["direction"], "2");
    }

    #[test]
    fn mac_flags() {
        let registry = ProfileRegistry::builtin();
        let cli = parse(&["--dst-mac", "02:00:00:00:00:02", "-n", "2"]);
        let profile = create_profile(&cli, &registry).unwrap();
        let streams = profile.get_streams(&stream_options(&cli).unwrap()).unwrap();
        assert_eq!(streams.len(), 2);
        let data = streams[0].packet().data();
        assert_eq!(&data[..6], [2, 0, 0, 0, 0, 2]);
        assert_eq!(&data[6..12], MacAddr::ZERO.octets());

        assert!(Cli::try_parse_from(["srv6-bench", "--src-mac", "02:00"]).is_err());
    }

    #[test]
    fn mac_flags_need_end_dx4() {
        let mut registry = ProfileRegistry::new();
        registry.register("other", end_dx4::register).unwrap();
        let cli = parse(&["-p", "other", "--src-mac", "02:00:00:00:00:01"]);
        assert!(create_profile(&cli, &registry).is_err());
    }
}
