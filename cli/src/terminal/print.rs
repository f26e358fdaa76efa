use colored::*;
use jollyip_common::sweep::{ProbeResult, ProbeStatus, ProbeSummary, UnreachableReason};
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

const SUMMARY_HEADERS: [&str; 4] = ["Targets", "Transmitted", "Alive", "Unreachable"];

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: "jollyip::print", raw_msg = msg);
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = UnicodeWidthStr::width(formatted.as_str());

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn starting(target: &str) {
    print(&format!(
        "{}{}{}",
        "Starting jolly ping to ".color(colors::TEXT_DEFAULT),
        target.color(colors::PRIMARY).bold(),
        "...".color(colors::TEXT_DEFAULT)
    ));
    mprint!();
}

/// One line per completed probe. `-q` drops unreachable hosts, `-qq` drops all.
pub fn probe_result(result: &ProbeResult, q_level: u8) {
    let host: String = result.addr.to_string();

    match &result.status {
        ProbeStatus::Alive { rtt } if q_level < 2 => {
            let millis: String = format!("{:.2}", rtt.as_secs_f64() * 1000.0);
            print(&format!(
                "  {}{}{}{}{}",
                "Response from ".color(colors::SUCCESS),
                host.color(colors::SUCCESS).bold().underline(),
                " received in ".color(colors::SUCCESS),
                millis.color(colors::SUCCESS).bold().underline(),
                " ms".color(colors::SUCCESS)
            ));
        }
        ProbeStatus::Unreachable { reason } if q_level < 1 => {
            let detail: String = match reason {
                UnreachableReason::Timeout => String::new(),
                UnreachableReason::Transport(_) => format!(" ({reason})"),
            };
            print(&format!(
                "  {}{}{}",
                host.color(colors::FAIL).bold().underline(),
                " is unreachable".color(colors::FAIL),
                detail.dimmed()
            ));
        }
        _ => {}
    }
}

pub fn completed(target: &str, cancelled: bool) {
    let lead: &str = if cancelled {
        "Stopping ping to "
    } else {
        "Completed jolly ping to "
    };
    mprint!();
    print(&format!(
        "{}{}",
        lead.color(colors::TEXT_DEFAULT),
        target.color(colors::PRIMARY).bold()
    ));
    mprint!();
}

/// Draws the final tally as a boxed, four-column table.
pub fn summary_table(summary: &ProbeSummary) {
    let values: [String; 4] = [
        summary.targets.to_string(),
        summary.transmitted.to_string(),
        summary.alive.to_string(),
        summary.unreachable.to_string(),
    ];
    let value_colors: [Color; 4] = [
        colors::TEXT_DEFAULT,
        colors::TEXT_DEFAULT,
        colors::SUCCESS,
        colors::ERROR,
    ];

    let widths: Vec<usize> = SUMMARY_HEADERS
        .iter()
        .zip(values.iter())
        .map(|(h, v)| UnicodeWidthStr::width(*h).max(UnicodeWidthStr::width(v.as_str())) + 2)
        .collect();

    let rule = |left: &str, mid: &str, right: &str| -> String {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        format!("{left}{}{right}", segments.join(mid))
            .color(colors::TEXT_DEFAULT)
            .to_string()
    };
    let bar: String = "│".color(colors::TEXT_DEFAULT).to_string();

    let header_cells: Vec<String> = SUMMARY_HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| format!(" {}", h.bold().white()) + &" ".repeat(w - 1 - h.width()))
        .collect();

    let value_cells: Vec<String> = values
        .iter()
        .zip(widths.iter())
        .zip(value_colors.iter())
        .map(|((v, w), c)| format!(" {}", v.color(*c).bold()) + &" ".repeat(w - 1 - v.width()))
        .collect();

    print(&rule("┌", "┬", "┐"));
    print(&format!("{bar}{}{bar}", header_cells.join(&bar)));
    print(&rule("├", "┼", "┤"));
    print(&format!("{bar}{}{bar}", value_cells.join(&bar)));
    print(&rule("└", "┴", "┘"));
}

pub fn error(err: &anyhow::Error) {
    let mut chain = err.chain();
    if let Some(top) = chain.next() {
        print(&format!("{} {}", "Error:".color(colors::ERROR).bold(), top.to_string().color(colors::ERROR)));
    }
    for cause in chain {
        print(&format!("  {} {}", "caused by:".color(colors::SEPARATOR), cause));
    }
}
