//! Command dispatch logic for nbcheck
use std::env;
use std::time::Instant;

use crate::cli::{Cli, Commands, TargetArgs};
use crate::commands;
use nbcheck_core::bail_usage;
use nbcheck_core::config::{is_identifier, CheckConfig};
use nbcheck_core::error::Result;
use nbcheck_core::locate::MatchPolicy;

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    match &cli.command {
        None => handle_no_command(),

        Some(Commands::Check(args)) => {
            let config = resolve_config(cli, args)?;
            tracing::debug!(elapsed = ?start.elapsed(), "resolve_config");
            commands::check::execute(cli, &config)
        }

        Some(Commands::Speakers(args)) => {
            let config = resolve_config(cli, args)?;
            tracing::debug!(elapsed = ?start.elapsed(), "resolve_config");
            commands::speakers::execute(cli, &config)
        }
    }
}

/// Build the effective config: config file first, then command-line overrides
pub fn resolve_config(cli: &Cli, args: &TargetArgs) -> Result<CheckConfig> {
    let cwd = env::current_dir()?;
    let mut config = CheckConfig::discover(cli.config.as_deref(), &cwd)?;

    if let Some(notebook) = &args.notebook {
        config.notebook = notebook.clone();
    }

    if let Some(variable) = &args.variable {
        if !is_identifier(variable) {
            bail_usage!(format!(
                "--variable must be a plain identifier, got {:?}",
                variable
            ));
        }
        config.variable = variable.clone();
    }

    if args.strict {
        config.match_policy = MatchPolicy::Assignment;
    }

    tracing::debug!(
        notebook = %config.notebook.display(),
        variable = %config.variable,
        policy = %config.match_policy,
        "config_resolved"
    );
    Ok(config)
}

// ============================================================================
// Command Handlers
// ============================================================================

fn handle_no_command() -> Result<()> {
    println!("nbcheck {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Static checks for the predefined speaker list of a podcast notebook.");
    println!();
    println!("Run `nbcheck --help` for usage information.");
    Ok(())
}
