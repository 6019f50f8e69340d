//! The notebook check pipeline: load, locate, extract and validate

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use crate::config::CheckConfig;
use crate::error::Result;
use crate::literal;
use crate::locate::{locate_cell, MatchPolicy};
use crate::notebook::Notebook;
use crate::schema::{validate_speakers, SpeakerConfig};
use crate::trace_time;

/// Outcome of a successful check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub notebook: PathBuf,
    pub variable: String,
    pub match_policy: MatchPolicy,
    /// Number of cells in the notebook
    pub cells_scanned: usize,
    /// Index of the cell the list was read from
    pub cell_index: usize,
    pub speakers: Vec<SpeakerConfig>,
}

/// Run the check described by `config`
#[tracing::instrument(skip(config), fields(notebook = %config.notebook.display(), variable = %config.variable))]
pub fn run_check(config: &CheckConfig) -> Result<CheckReport> {
    let start = Instant::now();

    let notebook = Notebook::load(&config.notebook)?;
    trace_time!(start, "load_notebook", cells = notebook.cells.len());

    check_notebook(&notebook, config).map(|(cell_index, speakers)| {
        trace_time!(start, "check_complete", speakers = speakers.len());
        CheckReport {
            notebook: config.notebook.clone(),
            variable: config.variable.clone(),
            match_policy: config.match_policy,
            cells_scanned: notebook.cells.len(),
            cell_index,
            speakers,
        }
    })
}

/// Locate, extract and validate against an already-loaded notebook.
///
/// Returns the matched cell index and the validated speakers.
pub fn check_notebook(
    notebook: &Notebook,
    config: &CheckConfig,
) -> Result<(usize, Vec<SpeakerConfig>)> {
    let cell = locate_cell(
        notebook,
        &config.variable,
        &config.marker(),
        config.match_policy,
    )?;

    let value = literal::extract_assignment(&cell.text, &config.variable)?;
    tracing::debug!(
        cell = cell.index,
        found = value.is_some(),
        "assignment_extracted"
    );

    let speakers = validate_speakers(value, &config.variable, &config.required_keys)?;
    tracing::debug!(count = speakers.len(), "speakers_validated");
    Ok((cell.index, speakers))
}
