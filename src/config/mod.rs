//! Configuration file loading
//!
//! Reads the API key and system id from a small JSON file:
//!
//! ```json
//! {
//!     "apikey": "aaaaaabbbbbbccccccddddddeeeeeeffffffgggg",
//!     "systemid": 12345
//! }
//! ```
//!
//! Lookup order: an explicitly given path, then
//! `~/.config/pvoutput.json`, then `config/pvoutput.json` relative to
//! the working directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

/// Name of the configuration file at the fallback locations
pub const CONFIG_FILE_NAME: &str = "pvoutput.json";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration file found")]
    NotFound,
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Credentials and account flags loaded from a configuration file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub apikey: String,
    pub systemid: u32,
    #[serde(default)]
    pub donation_made: bool,
}

impl Config {
    /// Load the configuration from the first location that exists
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::locate(explicit).ok_or(ConfigError::NotFound)?;
        debug!("loading configuration from {}", path.display());
        Self::from_file(&path)
    }

    /// Load and parse a specific configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }
        if let Ok(home) = std::env::var("HOME") {
            let path = Path::new(&home).join(".config").join(CONFIG_FILE_NAME);
            if path.exists() {
                return Some(path);
            }
        }
        let path = Path::new("config").join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
        None
    }
}
