//! # Sweep Results
//!
//! Per-address probe outcomes and the tally built from them.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Why a probe did not count as alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreachableReason {
    /// No echo reply arrived within the timeout.
    Timeout,
    /// The ICMP layer reported an error (host unreachable, send failure, ...).
    Transport(String),
}

impl fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnreachableReason::Timeout => write!(f, "timed out"),
            UnreachableReason::Transport(detail) => write!(f, "{detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Alive { rtt: Duration },
    Unreachable { reason: UnreachableReason },
}

/// Outcome of probing a single address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub addr: IpAddr,
    pub status: ProbeStatus,
}

impl ProbeResult {
    pub fn alive(addr: IpAddr, rtt: Duration) -> Self {
        Self {
            addr,
            status: ProbeStatus::Alive { rtt },
        }
    }

    pub fn unreachable(addr: IpAddr, reason: UnreachableReason) -> Self {
        Self {
            addr,
            status: ProbeStatus::Unreachable { reason },
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self.status, ProbeStatus::Alive { .. })
    }

    /// Round-trip time; only present when the host answered.
    pub fn latency(&self) -> Option<Duration> {
        match self.status {
            ProbeStatus::Alive { rtt } => Some(rtt),
            ProbeStatus::Unreachable { .. } => None,
        }
    }
}

/// Tally of a sweep.
///
/// `alive + unreachable == transmitted` always holds. `transmitted == targets`
/// holds unless the sweep was cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    pub targets: usize,
    pub transmitted: usize,
    pub alive: usize,
    pub unreachable: usize,
    pub cancelled: bool,
}

impl ProbeSummary {
    pub fn new(targets: usize) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: &ProbeResult) {
        self.transmitted += 1;
        if result.is_reachable() {
            self.alive += 1;
        } else {
            self.unreachable += 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.transmitted == self.targets
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
