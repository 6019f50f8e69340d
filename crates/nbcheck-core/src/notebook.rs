//! Notebook document model
//!
//! Only the parts of the nbformat document the check needs are modelled.
//! Cell fields are optional and loosely typed; an absent or oddly typed
//! field makes a cell non-matching rather than invalid. The one exception is
//! a code cell whose source is not text, which cannot be scanned.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{NbError, Result};

/// Cell type that holds executable source
pub const CODE_CELL: &str = "code";

/// A parsed notebook
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// One notebook cell
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub cell_type: Option<Value>,
    #[serde(default)]
    pub source: Option<CellSource>,
}

/// Cell source: nbformat allows either a list of lines or a single string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Lines(Vec<String>),
    Text(String),
    /// Any other JSON value
    Malformed(Value),
}

impl CellSource {
    /// Concatenate the source fragments into the cell text
    pub fn text(&self) -> Option<String> {
        match self {
            CellSource::Lines(lines) => Some(lines.concat()),
            CellSource::Text(text) => Some(text.clone()),
            CellSource::Malformed(_) => None,
        }
    }
}

impl Cell {
    /// True if the cell is tagged as a code cell
    pub fn is_code(&self) -> bool {
        self.cell_type.as_ref().and_then(Value::as_str) == Some(CODE_CELL)
    }

    /// Full cell text, or `None` when the cell has no source
    pub fn text(&self) -> Option<String> {
        self.source.as_ref().and_then(CellSource::text)
    }
}

impl Notebook {
    /// Parse a notebook from JSON text
    pub fn parse(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let notebook: Notebook = serde_json::from_str(content)?;
        let malformed = notebook
            .code_cells()
            .find(|(_, cell)| matches!(cell.source, Some(CellSource::Malformed(_))));
        if let Some((index, _)) = malformed {
            return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "source of code cell {} is neither text nor a list of text",
                index
            )));
        }
        Ok(notebook)
    }

    /// Read and parse a notebook file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| NbError::NotebookRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let notebook = Self::parse(&content).map_err(|e| NbError::InvalidNotebook {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), cells = notebook.cells.len(), "notebook_loaded");
        Ok(notebook)
    }

    /// Iterate over code cells with their document index
    pub fn code_cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate().filter(|(_, cell)| cell.is_code())
    }
}
