use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use jollyip_core::pinger::{PingOutcome, Pinger};

/// Pinger whose answers are decided up front.
///
/// Every probe takes `delay`. Addresses in `alive` reply with `rtt`, everything
/// else times out. All probed addresses are recorded in call order.
pub struct ScriptedPinger {
    pub alive: HashSet<IpAddr>,
    pub delay: Duration,
    pub rtt: Duration,
    pub probed: Mutex<Vec<IpAddr>>,
}

impl ScriptedPinger {
    pub fn new(alive: &[&str], delay: Duration) -> Self {
        Self {
            alive: alive
                .iter()
                .map(|s| s.parse().expect("test address"))
                .collect(),
            delay,
            rtt: Duration::from_millis(7),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<IpAddr> {
        self.probed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Pinger for ScriptedPinger {
    async fn ping(&self, addr: IpAddr, _timeout: Duration) -> PingOutcome {
        if let Ok(mut probed) = self.probed.lock() {
            probed.push(addr);
        }
        tokio::time::sleep(self.delay).await;

        if self.alive.contains(&addr) {
            PingOutcome::Reply(self.rtt)
        } else {
            PingOutcome::Timeout
        }
    }
}
