//! `nbcheck speakers` command - print the validated speaker list

use crate::cli::{Cli, OutputFormat};
use crate::commands::format::{records_header, speaker_record};
use nbcheck_core::check::run_check;
use nbcheck_core::config::CheckConfig;
use nbcheck_core::error::Result;
use nbcheck_core::schema::SpeakerConfig;

/// Execute the speakers command
pub fn execute(cli: &Cli, config: &CheckConfig) -> Result<()> {
    let report = run_check(config)?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.speakers)?);
        }
        OutputFormat::Human => {
            for line in table(&report.speakers, &config.required_keys) {
                println!("{}", line);
            }
            if !cli.quiet {
                println!();
                println!("{} speaker(s)", report.speakers.len());
            }
        }
        OutputFormat::Records => {
            println!(
                "{}",
                records_header(
                    "speakers",
                    &report.notebook.display().to_string(),
                    &[("speakers", report.speakers.len().to_string())],
                )
            );
            for (i, speaker) in report.speakers.iter().enumerate() {
                println!("{}", speaker_record(i, speaker, &config.required_keys));
            }
        }
    }

    Ok(())
}

/// Render speakers as aligned columns, one column per required key
fn table(speakers: &[SpeakerConfig], keys: &[String]) -> Vec<String> {
    let rows: Vec<Vec<String>> = speakers
        .iter()
        .map(|s| keys.iter().map(|k| s.field_text(k)).collect())
        .collect();

    let widths: Vec<usize> = keys
        .iter()
        .enumerate()
        .map(|(col, key)| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(key.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(keys.iter().map(String::as_str).collect())];
    for row in &rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines
}
