//! Error types and exit codes for nbcheck
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args, invalid config)
//! - 3: Data error (notebook structure, missing cell, unsafe literal, schema violation)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the nbcheck binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - the notebook does not satisfy the check (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur while checking a notebook
#[derive(Error, Debug)]
pub enum NbError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human, json, or records)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid config {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    // Structural errors (exit code 3)
    #[error("failed to read notebook {path:?}: {reason}")]
    NotebookRead { path: PathBuf, reason: String },

    #[error("invalid notebook {path:?}: {reason}")]
    InvalidNotebook { path: PathBuf, reason: String },

    // Locator errors (exit code 3)
    #[error("Could not find {variable} cell")]
    MarkerNotFound { variable: String },

    // Source and literal errors (exit code 3)
    #[error("syntax error at line {line}, column {column}: {reason}")]
    SourceSyntax {
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("malformed literal at line {line}, column {column}: {reason}")]
    UnsafeLiteral {
        line: usize,
        column: usize,
        reason: String,
    },

    // Schema violations (exit code 3)
    #[error("no top-level assignment to {variable} found")]
    AssignmentNotFound { variable: String },

    #[error("{variable} must be a list, found {found}")]
    NotAList { variable: String, found: String },

    #[error("{variable} list is empty")]
    EmptyList { variable: String },

    #[error("{variable}[{index}] must be a dict, found {found}")]
    NotAMapping {
        variable: String,
        index: usize,
        found: String,
    },

    #[error("{variable}[{index}] is missing required key {key:?}")]
    MissingKey {
        variable: String,
        index: usize,
        key: String,
    },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl NbError {
    /// Create a syntax error at a source position
    pub fn syntax(line: usize, column: usize, reason: impl Into<String>) -> Self {
        NbError::SourceSyntax {
            line,
            column,
            reason: reason.into(),
        }
    }

    /// Create an error for an expression that is not a pure literal
    pub fn unsafe_literal(line: usize, column: usize, reason: impl Into<String>) -> Self {
        NbError::UnsafeLiteral {
            line,
            column,
            reason: reason.into(),
        }
    }

    /// Create an error for an invalid config value
    pub fn invalid_config(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        NbError::InvalidConfig {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            // Usage errors
            NbError::UnknownFormat(_) | NbError::UsageError(_) | NbError::InvalidConfig { .. } => {
                ExitCode::Usage
            }

            // Data errors
            NbError::NotebookRead { .. }
            | NbError::InvalidNotebook { .. }
            | NbError::MarkerNotFound { .. }
            | NbError::SourceSyntax { .. }
            | NbError::UnsafeLiteral { .. }
            | NbError::AssignmentNotFound { .. }
            | NbError::NotAList { .. }
            | NbError::EmptyList { .. }
            | NbError::NotAMapping { .. }
            | NbError::MissingKey { .. } => ExitCode::Data,

            // Generic failures
            NbError::Io(_) | NbError::Json(_) | NbError::Toml(_) | NbError::Other(_) => {
                ExitCode::Failure
            }
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            NbError::UnknownFormat(_) => "unknown_format",
            NbError::UsageError(_) => "usage_error",
            NbError::InvalidConfig { .. } => "invalid_config",
            NbError::NotebookRead { .. } => "notebook_read",
            NbError::InvalidNotebook { .. } => "invalid_notebook",
            NbError::MarkerNotFound { .. } => "marker_not_found",
            NbError::SourceSyntax { .. } => "source_syntax",
            NbError::UnsafeLiteral { .. } => "unsafe_literal",
            NbError::AssignmentNotFound { .. } => "assignment_not_found",
            NbError::NotAList { .. } => "not_a_list",
            NbError::EmptyList { .. } => "empty_list",
            NbError::NotAMapping { .. } => "not_a_mapping",
            NbError::MissingKey { .. } => "missing_key",
            NbError::Io(_) => "io_error",
            NbError::Json(_) => "json_error",
            NbError::Toml(_) => "toml_error",
            NbError::Other(_) => "other",
        }
    }

    /// True for the shape checks run against the evaluated speaker list
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            NbError::AssignmentNotFound { .. }
                | NbError::NotAList { .. }
                | NbError::EmptyList { .. }
                | NbError::NotAMapping { .. }
                | NbError::MissingKey { .. }
        )
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for nbcheck operations
pub type Result<T> = std::result::Result<T, NbError>;
