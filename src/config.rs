//! Runtime configuration for the data layer.
//!
//! Loaded from TOML; every field has a default so an empty file (or no file
//! at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Data-layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the epidata API.
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// Directory for cached season payloads.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Reporting lags to fetch alongside the latest issue.
    #[serde(default)]
    pub lags: Vec<u32>,
}

fn default_api_root() -> String {
    "https://delphi.midas.cs.cmu.edu/epidata/api.php".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".flucast-cache")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_root: default_api_root(),
            cache_dir: default_cache_dir(),
            lags: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}
