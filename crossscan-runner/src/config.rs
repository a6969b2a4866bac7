//! Scan configuration loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid config. CLI flags
//! are applied on top of the parsed file by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crossscan_core::data::RetryPolicy;
use crossscan_core::{ParamError, ScanParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scan parameters: {0}")]
    Params(#[from] ParamError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Symbols kept per segment after market-cap ranking; 0 keeps all.
    pub top_n: usize,
    /// Worker threads; 0 uses the available parallelism.
    pub concurrency: usize,
    /// Run deadline in seconds; 0 disables it.
    pub timeout_secs: u64,
    /// Ignore bars dated after this day.
    pub as_of: Option<NaiveDate>,
    pub data_dir: PathBuf,
    pub universe: PathBuf,
    pub output_dir: PathBuf,
    pub params: ScanParams,
    pub retry: RetryPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            top_n: 500,
            concurrency: 0,
            timeout_secs: 0,
            as_of: None,
            data_dir: PathBuf::from("data"),
            universe: PathBuf::from("universe.toml"),
            output_dir: PathBuf::from("results"),
            params: ScanParams::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
