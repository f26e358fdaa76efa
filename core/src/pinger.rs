//! The ICMP collaborator.
//!
//! The sweep only depends on the [`Pinger`] trait. [`IcmpPinger`] is the real
//! implementation on top of `surge-ping`; tests plug in their own.

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use jollyip_common::network::range::IpCollection;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use thiserror::Error;
use tracing::{debug, trace};

/// Size of the echo payload, same as the classic `ping` default.
const PAYLOAD_SIZE: usize = 56;

/// What the ICMP layer reported for one echo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingOutcome {
    Reply(Duration),
    Timeout,
    Failed(String),
}

/// Sends a single echo request and waits at most `timeout` for the reply.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self, addr: IpAddr, timeout: Duration) -> PingOutcome;
}

#[derive(Debug, Error)]
pub enum PingerError {
    #[error("opening an ICMP socket requires elevated privileges (run as root or grant CAP_NET_RAW)")]
    Privilege(#[source] io::Error),

    #[error("unable to open an {family} ICMP socket")]
    Socket {
        family: &'static str,
        #[source]
        source: io::Error,
    },
}

/// `surge-ping` backed pinger holding one client per address family.
pub struct IcmpPinger {
    v4: Option<Client>,
    v6: Option<Client>,
    payload: [u8; PAYLOAD_SIZE],
}

impl IcmpPinger {
    /// Opens sockets only for the families present in `targets`, so an IPv4
    /// sweep still works on a host without IPv6.
    pub fn for_targets(targets: &IpCollection) -> Result<Self, PingerError> {
        let v4 = if targets.has_ipv4() {
            Some(open_client(ICMP::V4)?)
        } else {
            None
        };
        let v6 = if targets.has_ipv6() {
            Some(open_client(ICMP::V6)?)
        } else {
            None
        };

        Ok(Self {
            v4,
            v6,
            payload: [0; PAYLOAD_SIZE],
        })
    }

    fn client_for(&self, addr: &IpAddr) -> Option<&Client> {
        match addr {
            IpAddr::V4(_) => self.v4.as_ref(),
            IpAddr::V6(_) => self.v6.as_ref(),
        }
    }
}

#[async_trait]
impl Pinger for IcmpPinger {
    async fn ping(&self, addr: IpAddr, timeout: Duration) -> PingOutcome {
        let Some(client) = self.client_for(&addr) else {
            return PingOutcome::Failed(format!("no ICMP socket open for {addr}"));
        };

        let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &self.payload).await {
            Ok((_packet, rtt)) => {
                trace!("Echo reply from {addr} in {rtt:?}");
                PingOutcome::Reply(rtt)
            }
            Err(SurgeError::Timeout { .. }) => PingOutcome::Timeout,
            Err(e) => {
                debug!("Probe to {addr} failed: {e}");
                PingOutcome::Failed(e.to_string())
            }
        }
    }
}

fn open_client(kind: ICMP) -> Result<Client, PingerError> {
    let family = match kind {
        ICMP::V4 => "IPv4",
        ICMP::V6 => "IPv6",
    };
    let config = Config::builder().kind(kind).build();

    Client::new(&config).map_err(|source| match source.kind() {
        io::ErrorKind::PermissionDenied => PingerError::Privilege(source),
        _ => PingerError::Socket { family, source },
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
