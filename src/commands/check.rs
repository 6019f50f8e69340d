//! `nbcheck check` command - validate the predefined speaker list

use crate::cli::{Cli, OutputFormat};
use crate::commands::format::{records_header, speaker_record};
use nbcheck_core::check::run_check;
use nbcheck_core::config::CheckConfig;
use nbcheck_core::error::Result;

/// Execute the check command
pub fn execute(cli: &Cli, config: &CheckConfig) -> Result<()> {
    let report = run_check(config)?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!(
                    "ok: {} speaker(s) in cell {} of {}",
                    report.speakers.len(),
                    report.cell_index,
                    report.notebook.display()
                );
            }
        }
        OutputFormat::Records => {
            println!(
                "{}",
                records_header(
                    "check",
                    &report.notebook.display().to_string(),
                    &[
                        ("cells", report.cells_scanned.to_string()),
                        ("cell", report.cell_index.to_string()),
                        ("speakers", report.speakers.len().to_string()),
                    ],
                )
            );
            for (i, speaker) in report.speakers.iter().enumerate() {
                println!("{}", speaker_record(i, speaker, &config.required_keys));
            }
        }
    }

    Ok(())
}
