mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, ping};
use jollyip_common::error::ParseError;
use jollyip_core::pinger::PingerError;
use terminal::{logging, print};

const EXIT_FAILURE: u8 = 1;
const EXIT_PARSE: u8 = 2;
const EXIT_PRIVILEGE: u8 = 3;
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    if commands.no_color {
        colored::control::set_override(false);
    }
    logging::init_logging();

    let cfg = commands.to_config();

    match ping::ping(&commands.target, &cfg).await {
        Ok(summary) if summary.cancelled => ExitCode::from(EXIT_CANCELLED),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            print::error(&e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Parse failures and missing privileges get their own codes so scripts can
/// tell them apart from a sweep that merely found nothing alive.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ParseError>().is_some() {
        return EXIT_PARSE;
    }
    match err.downcast_ref::<PingerError>() {
        Some(PingerError::Privilege(_)) => EXIT_PRIVILEGE,
        _ => EXIT_FAILURE,
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
