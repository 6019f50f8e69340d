//! Locating the configuration cell inside a notebook

use serde::{Deserialize, Serialize};

use crate::error::{NbError, Result};
use crate::literal;
use crate::notebook::Notebook;

/// How a code cell is recognised as the configuration cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The cell text contains the marker substring anywhere
    #[default]
    Substring,
    /// The marker matches and the cell also holds a real top-level assignment
    Assignment,
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchPolicy::Substring => write!(f, "substring"),
            MatchPolicy::Assignment => write!(f, "assignment"),
        }
    }
}

/// The first matching code cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedCell {
    /// Position of the cell in the notebook, counting every cell type
    pub index: usize,
    pub text: String,
}

/// Find the first code cell whose text contains `marker`.
///
/// Cells without a type, with a type other than `code`, or without source
/// are skipped. With [`MatchPolicy::Assignment`], a cell only matches when it
/// also assigns `variable` at the top level.
pub fn locate_cell(
    notebook: &Notebook,
    variable: &str,
    marker: &str,
    policy: MatchPolicy,
) -> Result<LocatedCell> {
    for (index, cell) in notebook.code_cells() {
        let Some(text) = cell.text() else {
            tracing::trace!(index, "cell_without_source");
            continue;
        };
        if !text.contains(marker) {
            continue;
        }
        if policy == MatchPolicy::Assignment && !literal::has_assignment(&text, variable)? {
            tracing::debug!(index, "marker_without_assignment");
            continue;
        }

        tracing::debug!(index, %policy, "cell_located");
        return Ok(LocatedCell { index, text });
    }

    Err(NbError::MarkerNotFound {
        variable: variable.to_string(),
    })
}
