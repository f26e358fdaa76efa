use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use jollyip_common::config::Config;
use jollyip_common::network::target::{expand, ExpandOptions};
use jollyip_common::sweep::{ProbeResult, ProbeSummary};
use jollyip_core::sweep::{self, SweepOptions};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::utils::ScriptedPinger;

async fn sweep_expression(
    expression: &str,
    pinger: Arc<ScriptedPinger>,
    cfg: &Config,
    cancel: CancellationToken,
) -> anyhow::Result<(ProbeSummary, Vec<ProbeResult>)> {
    let targets = expand(expression, &cfg.expand)?;
    let mut results = Vec::new();
    let summary = sweep::run(&targets, pinger, SweepOptions::from(cfg), cancel, |r| {
        results.push(r.clone())
    })
    .await;
    Ok((summary, results))
}

#[tokio::test(start_paused = true)]
async fn test_range_sweep_tally() -> anyhow::Result<()> {
    let pinger = Arc::new(ScriptedPinger::new(
        &["192.0.2.1", "192.0.2.2", "192.0.2.3", "192.0.2.6"],
        Duration::from_millis(10),
    ));

    let (summary, results) = sweep_expression(
        "192.0.2.1-6",
        pinger.clone(),
        &Config::default(),
        CancellationToken::new(),
    )
    .await?;

    assert_eq!(
        summary,
        ProbeSummary {
            targets: 6,
            transmitted: 6,
            alive: 4,
            unreachable: 2,
            cancelled: false,
        }
    );
    assert!(summary.is_complete());

    let unreachable: HashSet<IpAddr> = results
        .iter()
        .filter(|r| !r.is_reachable())
        .map(|r| r.addr)
        .collect();
    let expected: HashSet<IpAddr> = ["192.0.2.4", "192.0.2.5"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(unreachable, expected);
    assert_eq!(pinger.probed().len(), 6);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_mixed_expression_probes_each_address_once() -> anyhow::Result<()> {
    let pinger = Arc::new(ScriptedPinger::new(&["192.0.2.1"], Duration::from_millis(5)));

    let (summary, results) = sweep_expression(
        "192.0.2.1,192.0.2.9-13,192.0.2.64/29,192.0.2.10",
        pinger.clone(),
        &Config::default(),
        CancellationToken::new(),
    )
    .await?;

    assert_eq!(summary.targets, 14);
    assert_eq!(summary.transmitted, 14);
    assert_eq!(summary.alive, 1);
    assert_eq!(summary.unreachable, 13);

    let probed = pinger.probed();
    let distinct: HashSet<&IpAddr> = probed.iter().collect();
    assert_eq!(probed.len(), 14);
    assert_eq!(distinct.len(), 14);
    assert_eq!(results.len(), 14);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_hosts_only_skips_network_and_broadcast() -> anyhow::Result<()> {
    let pinger = Arc::new(ScriptedPinger::new(&[], Duration::from_millis(1)));
    let cfg = Config {
        expand: ExpandOptions {
            hosts_only: true,
            ..ExpandOptions::default()
        },
        ..Config::default()
    };

    let (summary, _) =
        sweep_expression("192.0.2.64/29", pinger.clone(), &cfg, CancellationToken::new()).await?;

    assert_eq!(summary.targets, 6);
    let probed: HashSet<IpAddr> = pinger.probed().into_iter().collect();
    assert!(!probed.contains(&"192.0.2.64".parse::<IpAddr>()?));
    assert!(!probed.contains(&"192.0.2.71".parse::<IpAddr>()?));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_bounds_wall_time() -> anyhow::Result<()> {
    let pinger = Arc::new(ScriptedPinger::new(&[], Duration::from_millis(100)));
    let cfg = Config {
        concurrency: 4,
        ..Config::default()
    };

    let start = Instant::now();
    let (summary, _) =
        sweep_expression("192.0.2.1-8", pinger, &cfg, CancellationToken::new()).await?;
    let elapsed = start.elapsed();

    assert_eq!(summary.transmitted, 8);
    // Two full rounds of four probes.
    assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(300), "{elapsed:?}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_ipv6_tail_range() -> anyhow::Result<()> {
    let pinger = Arc::new(ScriptedPinger::new(&["2001:db8::a"], Duration::from_millis(1)));

    let (summary, results) = sweep_expression(
        "2001:db8::1-a",
        pinger,
        &Config::default(),
        CancellationToken::new(),
    )
    .await?;

    assert_eq!(summary.targets, 10);
    assert_eq!(summary.alive, 1);
    let alive: Vec<IpAddr> = results
        .iter()
        .filter(|r| r.is_reachable())
        .map(|r| r.addr)
        .collect();
    assert_eq!(alive, vec!["2001:db8::a".parse::<IpAddr>()?]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_sweep_reports_partial_tally() -> anyhow::Result<()> {
    let pinger = Arc::new(ScriptedPinger::new(&[], Duration::from_millis(100)));
    let cfg = Config {
        concurrency: 1,
        ..Config::default()
    };
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        trigger.cancel();
    });

    let (summary, results) = sweep_expression("192.0.2.1-20", pinger, &cfg, cancel).await?;

    assert!(summary.cancelled);
    assert_eq!(summary.targets, 20);
    assert_eq!(summary.transmitted, 3);
    assert_eq!(results.len(), summary.transmitted);
    assert_eq!(summary.alive + summary.unreachable, summary.transmitted);
    Ok(())
}

#[test]
fn test_descending_range_is_rejected() {
    let err = expand("192.0.2.5-192.0.2.1", &ExpandOptions::default()).unwrap_err();
    assert!(err.to_string().contains("192.0.2.5-192.0.2.1"));
}
