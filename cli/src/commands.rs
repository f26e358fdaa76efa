pub mod ping;

use std::time::Duration;

use clap::{ArgAction, Parser};
use jollyip_common::config::{Config, DEFAULT_CONCURRENCY};
use jollyip_common::network::target::{DEFAULT_MAX_TARGETS, ExpandOptions};

const TARGET_HELP: &str = "\
<TARGET> can be an IPv4 or IPv6 host, subnet, or range, or an FQDN.

Examples:
  jollyip 192.0.2.1
  jollyip 192.0.2.0/24
  jollyip 192.0.2.1-5
  jollyip 192.0.2.1-5,192.0.2.9-14
  jollyip 2001:db8::1
  jollyip 2001:db8::/126
  jollyip 2001:db8::1-a";

#[derive(Parser)]
#[command(name = "jollyip")]
#[command(version, about = "Ping every host of an address range, concurrently.")]
#[command(after_help = TARGET_HELP)]
pub struct CommandLine {
    /// Hosts to ping: addresses, CIDR blocks or ranges, comma separated
    pub target: String,

    /// ICMP timeout in seconds (integer or decimal)
    #[arg(short, long, value_parser = parse_seconds, default_value = "0.5")]
    pub timeout: Duration,

    /// Maximum number of probes in flight
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Skip network and broadcast addresses of CIDR blocks
    #[arg(long)]
    pub hosts_only: bool,

    /// Refuse targets that expand to more addresses than this
    #[arg(long, default_value_t = DEFAULT_MAX_TARGETS)]
    pub max_targets: usize,

    /// Do not ask before large sweeps
    #[arg(short = 'y', long = "yes")]
    pub assume_yes: bool,

    /// Less output: -q hides unreachable hosts, -qq hides every host line
    #[arg(short, action = ArgAction::Count)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        Config {
            timeout: self.timeout,
            concurrency: self.concurrency,
            expand: ExpandOptions {
                hosts_only: self.hosts_only,
                max_targets: self.max_targets,
            },
            quiet: self.quiet,
            assume_yes: self.assume_yes,
        }
    }
}

/// Accepts "1", "0.5", "2.25" and the like.
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let seconds: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("'{s}' must be a positive number of seconds"));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
