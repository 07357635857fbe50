//! Serializable run configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is a valid
//! config. Command-line flags are applied on top by the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of instruments processed per run.
pub const DEFAULT_MAX_SYMBOLS: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where the instrument list comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Yahoo's crypto screener.
    #[default]
    Yahoo,

    /// A universe TOML file.
    File { universe_path: PathBuf },

    /// An explicit list.
    List { symbols: Vec<String> },
}

/// Which price history provider to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    /// Deterministic offline random walk.
    Synthetic,
}

/// Everything needed to reproduce a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// First day requested (inclusive).
    pub start_date: NaiveDate,

    /// Last day requested (inclusive).
    pub end_date: NaiveDate,

    /// Only the first `max_symbols` discovered instruments are processed.
    pub max_symbols: usize,

    /// Directory the CSV files are written to.
    pub output_dir: PathBuf,

    /// Run per-symbol pipelines on a rayon pool.
    pub parallel: bool,

    /// Pool size when `parallel` is set; rayon's default when absent.
    pub workers: Option<usize>,

    pub provider: ProviderKind,

    pub source: SourceConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            end_date: chrono::Local::now().date_naive(),
            max_symbols: DEFAULT_MAX_SYMBOLS,
            output_dir: PathBuf::from("."),
            parallel: false,
            workers: None,
            provider: ProviderKind::default(),
            source: SourceConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::Invalid(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.max_symbols == 0 {
            return Err(ConfigError::Invalid("max_symbols must be at least 1".into()));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if let SourceConfig::List { symbols } = &self.source {
            if symbols.iter().all(|s| s.trim().is_empty()) {
                return Err(ConfigError::Invalid("symbol list is empty".into()));
            }
        }
        Ok(())
    }
}
