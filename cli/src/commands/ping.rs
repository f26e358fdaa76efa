use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, bail};
use console::Term;
use colored::*;
use jollyip_common::config::{Config, LARGE_SWEEP_THRESHOLD};
use jollyip_common::network::range::IpCollection;
use jollyip_common::network::target;
use jollyip_common::sweep::ProbeSummary;
use jollyip_common::{debug, success, warn};
use jollyip_core::pinger::IcmpPinger;
use jollyip_core::sweep::{self, SweepOptions};
use jollyip_core::{resolver, system};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::terminal::{colors, print, spinner::SweepProgress};

/// Expands `target`, pings every address and prints the results.
pub async fn ping(target: &str, cfg: &Config) -> anyhow::Result<ProbeSummary> {
    cfg.validate()?;

    let targets: IpCollection = resolve_targets(target, cfg).await?;
    let len: usize = targets.len();
    let unit: &str = if len == 1 { "IP address has been" } else { "IP addresses have been" };
    success!("{len} {unit} parsed successfully");

    if len > LARGE_SWEEP_THRESHOLD && !confirm_large_sweep(len, cfg)? {
        bail!("Aborted, no probes were sent");
    }

    system::warn_if_unprivileged();
    let pinger = IcmpPinger::for_targets(&targets)?;

    print::header("starting jolly ping", cfg.quiet);
    print::starting(target);

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let progress = SweepProgress::new(len);
    let quiet: u8 = cfg.quiet;
    let summary: ProbeSummary = sweep::run(
        &targets,
        Arc::new(pinger),
        SweepOptions::from(cfg),
        cancel.clone(),
        |result| {
            progress.advance();
            print::probe_result(result, quiet);
        },
    )
    .instrument(progress.span())
    .await;
    drop(progress);
    watcher.abort();

    print::completed(target, summary.cancelled);
    print::summary_table(&summary);

    Ok(summary)
}

/// Parses the expression, falling back to a DNS lookup when the whole target
/// looks like a hostname.
async fn resolve_targets(target: &str, cfg: &Config) -> anyhow::Result<IpCollection> {
    let parse_err = match target::expand(target, &cfg.expand) {
        Ok(targets) => return Ok(targets),
        Err(e) => e,
    };

    if !resolver::is_hostname(target.trim()) {
        return Err(parse_err.into());
    }

    let name: &str = target.trim();
    let resolved = match resolver::resolve_hostname(name).await {
        Ok(resolved) => resolved,
        Err(e) => {
            debug!("{e:#}");
            None
        }
    };

    match resolved {
        Some(addr) => {
            success!("Resolved {name} to {addr}");
            Ok(IpCollection::from_iter([addr]))
        }
        None => Err(anyhow::Error::new(parse_err).context(format!("'{name}' is not DNS-resolvable"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Assumed,
    Unattended,
    Ask,
}

/// The prompt goes to stderr and the answer comes from stdin, so both must be
/// terminals for a question to make sense.
fn confirmation_mode(assume_yes: bool, stdin_tty: bool, stderr_tty: bool) -> Confirmation {
    match (assume_yes, stdin_tty && stderr_tty) {
        (true, _) => Confirmation::Assumed,
        (false, false) => Confirmation::Unattended,
        (false, true) => Confirmation::Ask,
    }
}

/// Mirrors the classic "are you sure?" prompt before pinging a lot of hosts.
fn confirm_large_sweep(len: usize, cfg: &Config) -> anyhow::Result<bool> {
    let term = Term::stderr();
    match confirmation_mode(cfg.assume_yes, io::stdin().is_terminal(), term.is_term()) {
        Confirmation::Assumed => return Ok(true),
        Confirmation::Unattended => {
            warn!("Sweeping {len} targets without confirmation, no interactive terminal to ask on");
            return Ok(true);
        }
        Confirmation::Ask => {}
    }

    let prompt: String = format!(
        "{}{}{}\n{} [y/N] ",
        "You are trying to reach ".yellow(),
        len.to_string().red().bold(),
        " targets, which seems like a lot.".yellow(),
        "Are you sure you want to continue?".color(colors::TEXT_DEFAULT)
    );
    term.write_str(&prompt).context("failed to write confirmation prompt")?;
    let answer: String = term.read_line().context("failed to read confirmation")?;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupted, finishing up");
        cancel.cancel();
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
