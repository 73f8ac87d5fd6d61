//! Runtime configuration.
//!
//! Settings are resolved from three layers, highest priority first:
//! 1. Command line flags and environment (`GENOVISTA_API_BASE`)
//! 2. An optional TOML file given with `--config`
//! 3. Built-in defaults
//!
//! ```toml
//! api_base = "http://localhost:8000"
//! timeout_secs = 30
//! tick_ms = 50
//! log_file = "/tmp/genovista.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TICK_MS: u64 = 50;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("API base must start with http:// or https:// (got {0:?})")]
    InvalidBase(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Values read from a config file; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
    pub tick_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Effective settings after all layers are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub timeout: Duration,
    pub tick_rate: Duration,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Merges command line values over file values over defaults.
    pub fn resolve(cli: FileConfig, file: Option<FileConfig>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let api_base = cli
            .api_base
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = api_base.trim().to_string();
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidBase(api_base));
        }

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Zero("timeout_secs"));
        }
        let tick_ms = cli.tick_ms.or(file.tick_ms).unwrap_or(DEFAULT_TICK_MS);
        if tick_ms == 0 {
            return Err(ConfigError::Zero("tick_ms"));
        }

        Ok(Self {
            api_base,
            timeout: Duration::from_secs(timeout_secs),
            tick_rate: Duration::from_millis(tick_ms),
            log_file: cli.log_file.or(file.log_file),
        })
    }
}
