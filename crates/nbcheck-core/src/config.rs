//! Check configuration for nbcheck
//!
//! Configuration is read from `nbcheck.toml` in the working directory, or from
//! `~/.config/nbcheck/config.toml`. Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NbError, Result};
use crate::locate::MatchPolicy;

/// Notebook checked when no path is configured
pub const DEFAULT_NOTEBOOK: &str = "podcasts_with_gpt4o.ipynb";

/// Variable holding the speaker list
pub const DEFAULT_VARIABLE: &str = "predefined_speakers";

/// Keys every speaker entry must carry, in check order
pub const REQUIRED_KEYS: [&str; 4] = ["speaker", "personality", "accent", "voice"];

const LOCAL_CONFIG_FILE: &str = "nbcheck.toml";
const CONFIG_DIR: &str = "nbcheck";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "NBCHECK_CONFIG_DIR";

/// Settings for a single notebook check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Notebook to inspect
    #[serde(default = "default_notebook")]
    pub notebook: PathBuf,

    /// Name of the assigned variable
    #[serde(default = "default_variable")]
    pub variable: String,

    /// Keys each list entry must contain
    #[serde(default = "default_required_keys")]
    pub required_keys: Vec<String>,

    /// How candidate cells are matched
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

fn default_notebook() -> PathBuf {
    PathBuf::from(DEFAULT_NOTEBOOK)
}

fn default_variable() -> String {
    DEFAULT_VARIABLE.to_string()
}

fn default_required_keys() -> Vec<String> {
    REQUIRED_KEYS.iter().map(|k| k.to_string()).collect()
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            notebook: default_notebook(),
            variable: default_variable(),
            required_keys: default_required_keys(),
            match_policy: MatchPolicy::default(),
        }
    }
}

impl CheckConfig {
    /// Config for a specific notebook with every other setting at its default
    pub fn for_notebook(path: impl Into<PathBuf>) -> Self {
        Self {
            notebook: path.into(),
            ..Self::default()
        }
    }

    /// Substring that marks the candidate cell, e.g. `predefined_speakers = [`
    pub fn marker(&self) -> String {
        format!("{} = [", self.variable)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CheckConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// A relative `notebook` path is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| NbError::invalid_config(path, format!("failed to read: {}", e)))?;
        let mut config = Self::from_toml(&content)
            .map_err(|e| NbError::invalid_config(path, e))?;

        if config.notebook.is_relative() {
            if let Some(dir) = path.parent() {
                config.notebook = dir.join(&config.notebook);
            }
        }

        config
            .validate()
            .map_err(|e| NbError::invalid_config(path, e))?;
        Ok(config)
    }

    /// Resolve configuration: explicit path, then `nbcheck.toml` in `cwd`,
    /// then the user config directory, then defaults.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "config_explicit");
            return Self::load(path);
        }

        let local = cwd.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "config_local");
            return Self::load(&local);
        }

        if let Some(global) = global_config_path() {
            if global.is_file() {
                tracing::debug!(path = %global.display(), "config_global");
                return Self::load(&global);
            }
        }

        tracing::debug!("config_default");
        Ok(Self::default())
    }

    /// Reject settings that cannot describe a check
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !is_identifier(&self.variable) {
            return Err(format!(
                "variable must be a plain identifier, got {:?}",
                self.variable
            ));
        }
        if self.required_keys.is_empty() {
            return Err("required_keys must not be empty".to_string());
        }
        Ok(())
    }
}

fn global_config_path() -> Option<PathBuf> {
    // Allow environment variable override for testing
    let config_dir = match std::env::var(CONFIG_DIR_ENV_VAR) {
        Ok(env_dir) => PathBuf::from(env_dir),
        Err(_) => dirs::config_dir()?.join(CONFIG_DIR),
    };
    Some(config_dir.join(CONFIG_FILE))
}

/// True if `name` would lex as a single Python name
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}
