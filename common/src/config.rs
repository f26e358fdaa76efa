use std::time::Duration;

use anyhow::ensure;

use crate::network::target::ExpandOptions;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_CONCURRENCY: usize = 64;
/// Sweeps larger than this ask for confirmation first.
pub const LARGE_SWEEP_THRESHOLD: usize = 254;

pub struct Config {
    /// How long to wait for each echo reply.
    pub timeout: Duration,

    /// Maximum number of probes in flight.
    pub concurrency: usize,

    pub expand: ExpandOptions,

    /// 0 prints everything, 1 hides unreachable hosts, 2 hides every host line.
    pub quiet: u8,

    /// Skips the large-sweep confirmation.
    pub assume_yes: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.concurrency > 0, "concurrency must be at least 1");
        ensure!(!self.timeout.is_zero(), "timeout must be greater than zero");
        ensure!(self.expand.max_targets > 0, "max targets must be at least 1");
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            expand: ExpandOptions::default(),
            quiet: 0,
            assume_yes: false,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
