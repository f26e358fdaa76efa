//! # Sweep Engine
//!
//! Probes every address of an [`IpCollection`] with bounded concurrency.
//!
//! A dispatcher task hands one address at a time to a spawned probe task once a
//! semaphore permit is free. Finished probes send their [`ProbeResult`] over a
//! channel to a single consumer, which owns the [`ProbeSummary`] and calls the
//! caller's callback in completion order.
//!
//! Cancelling the token stops dispatch, abandons in-flight probes and returns
//! the tally of everything that completed before that point.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use jollyip_common::config::Config;
use jollyip_common::network::range::IpCollection;
use jollyip_common::sweep::{ProbeResult, ProbeSummary, UnreachableReason};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::pinger::{PingOutcome, Pinger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    pub timeout: Duration,
    /// Maximum number of probes in flight. Clamped to `1..=targets`.
    pub concurrency: usize,
}

impl From<&Config> for SweepOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            timeout: cfg.timeout,
            concurrency: cfg.concurrency,
        }
    }
}

/// Runs a sweep and returns its tally.
///
/// `on_result` is invoked exactly once per completed probe, in completion order.
pub async fn run<F>(
    targets: &IpCollection,
    pinger: Arc<dyn Pinger>,
    options: SweepOptions,
    cancel: CancellationToken,
    mut on_result: F,
) -> ProbeSummary
where
    F: FnMut(&ProbeResult),
{
    let mut summary = ProbeSummary::new(targets.len());
    if targets.is_empty() {
        return summary;
    }

    let limit = options.concurrency.clamp(1, targets.len());
    debug!("Sweeping {} targets, {} at a time", targets.len(), limit);

    let (tx, mut rx) = mpsc::channel::<ProbeResult>(limit);
    let dispatcher = tokio::spawn(dispatch(
        targets.as_slice().to_vec(),
        pinger,
        options.timeout,
        limit,
        cancel.clone(),
        tx,
    ));

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                summary.cancelled = true;
                break;
            }
            received = rx.recv() => match received {
                Some(result) => {
                    summary.record(&result);
                    on_result(&result);
                }
                None => break,
            },
        }
    }

    if summary.cancelled {
        // Results that completed before the cancellation still count.
        while let Ok(result) = rx.try_recv() {
            summary.record(&result);
            on_result(&result);
        }
        debug!(
            "Sweep cancelled after {} of {} probes",
            summary.transmitted, summary.targets
        );
    }

    drop(rx);
    if let Err(e) = dispatcher.await {
        warn!("Probe dispatcher ended abnormally: {e}");
    }

    summary
}

async fn dispatch(
    addrs: Vec<IpAddr>,
    pinger: Arc<dyn Pinger>,
    timeout: Duration,
    limit: usize,
    cancel: CancellationToken,
    tx: mpsc::Sender<ProbeResult>,
) {
    let permits = Arc::new(Semaphore::new(limit));
    let mut tasks = JoinSet::new();

    for addr in addrs {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&permits).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        while tasks.try_join_next().is_some() {}

        let pinger = Arc::clone(&pinger);
        let tx = tx.clone();
        tasks.spawn(async move {
            let result = probe(pinger.as_ref(), addr, timeout).await;
            drop(permit);
            // The receiver is gone only after cancellation.
            let _ = tx.send(result).await;
        });
    }
    drop(tx);

    // Dropping the set on cancellation aborts the probes still running.
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = async { while tasks.join_next().await.is_some() {} } => {}
    }
}

/// Turns the collaborator's answer into a result. A reply slower than the
/// timeout, or no answer at all within it, counts as a timeout.
async fn probe(pinger: &dyn Pinger, addr: IpAddr, timeout: Duration) -> ProbeResult {
    trace!("Probing {addr}");
    match time::timeout(timeout, pinger.ping(addr, timeout)).await {
        Ok(PingOutcome::Reply(rtt)) if rtt <= timeout => ProbeResult::alive(addr, rtt),
        Ok(PingOutcome::Reply(_) | PingOutcome::Timeout) | Err(_) => {
            ProbeResult::unreachable(addr, UnreachableReason::Timeout)
        }
        Ok(PingOutcome::Failed(detail)) => {
            ProbeResult::unreachable(addr, UnreachableReason::Transport(detail))
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use jollyip_common::network::target::{ExpandOptions, expand};
    use tokio::time::Instant;

    /// Answers after `delay`; addresses in `dead` time out.
    struct StubPinger {
        delay: Duration,
        dead: HashSet<IpAddr>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StubPinger {
        fn new(delay: Duration, dead: &[&str]) -> Self {
            Self {
                delay,
                dead: dead.iter().map(|s| s.parse().unwrap()).collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Pinger for StubPinger {
        async fn ping(&self, addr: IpAddr, _timeout: Duration) -> PingOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.dead.contains(&addr) {
                PingOutcome::Timeout
            } else {
                PingOutcome::Reply(Duration::from_millis(3))
            }
        }
    }

    fn targets(expr: &str) -> IpCollection {
        expand(expr, &ExpandOptions::default()).unwrap()
    }

    fn options(concurrency: usize) -> SweepOptions {
        SweepOptions {
            timeout: Duration::from_millis(500),
            concurrency,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tally_and_one_callback_per_address() {
        let addrs = targets("192.0.2.1-6");
        let pinger = Arc::new(StubPinger::new(
            Duration::from_millis(20),
            &["192.0.2.4", "192.0.2.5"],
        ));

        let mut seen = Vec::new();
        let summary = run(&addrs, pinger, options(4), CancellationToken::new(), |r| {
            seen.push(r.addr)
        })
        .await;

        assert_eq!(
            summary,
            ProbeSummary {
                targets: 6,
                transmitted: 6,
                alive: 4,
                unreachable: 2,
                cancelled: false
            }
        );
        let seen: HashSet<IpAddr> = seen.into_iter().collect();
        assert_eq!(seen.len(), 6);
        assert!(addrs.iter().all(|a| seen.contains(a)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_limit_is_respected() {
        let addrs = targets("192.0.2.1-10");
        let pinger = Arc::new(StubPinger::new(Duration::from_millis(100), &[]));

        let start = Instant::now();
        let summary = run(&addrs, pinger.clone(), options(3), CancellationToken::new(), |_| {}).await;
        let elapsed = start.elapsed();

        assert_eq!(summary.transmitted, 10);
        assert_eq!(pinger.peak.load(Ordering::SeqCst), 3);
        // ceil(10 / 3) rounds of 100ms
        assert!(elapsed >= Duration::from_millis(400), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(500), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_reply_counts_as_timeout() {
        struct Slow;

        #[async_trait]
        impl Pinger for Slow {
            async fn ping(&self, _addr: IpAddr, _timeout: Duration) -> PingOutcome {
                PingOutcome::Reply(Duration::from_secs(2))
            }
        }

        let summary = run(&targets("192.0.2.1"), Arc::new(Slow), options(1), CancellationToken::new(), |r| {
            assert_eq!(r.latency(), None)
        })
        .await;
        assert_eq!(summary.unreachable, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_unreachable() {
        struct Broken;

        #[async_trait]
        impl Pinger for Broken {
            async fn ping(&self, _addr: IpAddr, _timeout: Duration) -> PingOutcome {
                PingOutcome::Failed("Destination Host Unreachable".into())
            }
        }

        let mut reasons = Vec::new();
        let summary = run(&targets("192.0.2.1-2"), Arc::new(Broken), options(2), CancellationToken::new(), |r| {
            reasons.push(r.status.clone())
        })
        .await;

        assert_eq!(summary.unreachable, 2);
        assert!(reasons.iter().all(|s| matches!(
            s,
            jollyip_common::sweep::ProbeStatus::Unreachable {
                reason: UnreachableReason::Transport(_)
            }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_keeps_completed_results() {
        let addrs = targets("192.0.2.1-10");
        let pinger = Arc::new(StubPinger::new(Duration::from_millis(100), &[]));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            trigger.cancel();
        });

        let mut callbacks = 0;
        let summary = run(&addrs, pinger, options(2), cancel, |_| callbacks += 1).await;

        assert!(summary.cancelled);
        assert!(summary.transmitted >= 4 && summary.transmitted < 10, "{summary:?}");
        assert_eq!(summary.alive + summary.unreachable, summary.transmitted);
        assert_eq!(callbacks, summary.transmitted);
        assert!(!summary.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_concurrency_is_clamped() {
        let addrs = targets("192.0.2.1-2");
        let pinger = Arc::new(StubPinger::new(Duration::from_millis(10), &[]));

        let summary = run(&addrs, pinger.clone(), options(usize::MAX), CancellationToken::new(), |_| {}).await;

        assert_eq!(summary.transmitted, 2);
        assert_eq!(summary.alive, 2);
        assert_eq!(pinger.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_pinger_times_out() {
        struct Stalled;

        #[async_trait]
        impl Pinger for Stalled {
            async fn ping(&self, _addr: IpAddr, _timeout: Duration) -> PingOutcome {
                std::future::pending().await
            }
        }

        let start = Instant::now();
        let target_set = targets("192.0.2.1-3");
        let sweep = run(&target_set, Arc::new(Stalled), options(1), CancellationToken::new(), |r| {
            assert_eq!(
                r.status,
                jollyip_common::sweep::ProbeStatus::Unreachable {
                    reason: UnreachableReason::Timeout
                }
            )
        });
        let summary = tokio::time::timeout(Duration::from_secs(60), sweep)
            .await
            .expect("sweep should finish once every probe timed out");

        assert_eq!(summary.transmitted, 3);
        assert_eq!(summary.unreachable, 3);
        // Three sequential probes, 500ms each.
        assert!(start.elapsed() < Duration::from_secs(2), "{:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let pinger = Arc::new(StubPinger::new(Duration::ZERO, &[]));
        let summary = run(&IpCollection::new(), pinger, options(8), CancellationToken::new(), |_| {
            panic!("no probes expected")
        })
        .await;
        assert_eq!(summary, ProbeSummary::default());
    }
}
