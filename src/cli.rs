//! CLI argument parsing for nbcheck
//!
//! Global flags: --config, --format, --quiet, --verbose, --log-level, --log-json

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use nbcheck_core::format::OutputFormat;

/// nbcheck - validate the predefined speaker list embedded in a notebook
#[derive(Parser, Debug)]
#[command(name = "nbcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: ./nbcheck.toml, then the user config directory)
    #[arg(long, global = true, env = "NBCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (human, json, records)
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log filter, e.g. `debug` or `nbcheck_core=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the notebook defines a valid predefined speaker list
    Check(TargetArgs),

    /// Print the predefined speaker list
    Speakers(TargetArgs),
}

/// Which notebook to inspect and how to find the speaker cell
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Notebook path (overrides the configured notebook)
    pub notebook: Option<PathBuf>,

    /// Only match a cell that really assigns the variable at top level
    #[arg(long)]
    pub strict: bool,

    /// Variable holding the speaker list
    #[arg(long)]
    pub variable: Option<String>,
}
