//! nbcheck - static checks for the predefined speaker list of a podcast notebook
//!
//! Loads the notebook, finds the cell that assigns the speaker list, evaluates
//! it as a pure literal and verifies every entry carries the expected keys.

mod cli;
mod commands;

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;

use cli::{Cli, OutputFormat};
use nbcheck_core::error::{ExitCode as NbExitCode, NbError};
use nbcheck_core::logging;

fn main() -> ExitCode {
    let start = Instant::now();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if wants_json_errors() && !is_informational(&err) => {
            return report(&NbError::UsageError(err.to_string()), OutputFormat::Json, false);
        }
        Err(err) => err.exit(),
    };

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
    tracing::debug!(elapsed = ?start.elapsed(), "parse_args");

    match commands::dispatch::run(&cli, start) {
        Ok(()) => ExitCode::from(NbExitCode::Success as u8),
        Err(e) => report(&e, cli.format, cli.quiet),
    }
}

/// Print `err` in the requested format and turn it into the process exit code
fn report(err: &NbError, format: OutputFormat, quiet: bool) -> ExitCode {
    if format == OutputFormat::Json {
        eprintln!("{}", err.to_json());
    } else if !quiet {
        eprintln!("error: {}", err);
    }
    ExitCode::from(err.exit_code() as u8)
}

/// Help and version output are not failures
fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Raw argv scan for `--format json`, used when clap rejects the command line
/// before the parsed format is available
fn wants_json_errors() -> bool {
    let args: Vec<String> = env::args().skip(1).collect();
    args.iter().any(|a| a == "--format=json")
        || args.windows(2).any(|w| w[0] == "--format" && w[1] == "json")
}
