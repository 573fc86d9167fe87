//! Configuration structures for the pricewatch system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Observation source configuration.
    pub source: SourceConfig,
    /// Row validation configuration.
    pub validation: ValidationConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Check the configuration for values the loader cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.source.date_format.trim().is_empty() {
            return Err(Error::config("source.date_format must not be empty"));
        }
        self.source.delimiter_byte()?;
        Ok(())
    }
}

/// Observation source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Path to the observation CSV.
    pub path: PathBuf,
    /// Field delimiter.
    pub delimiter: char,
    /// `chrono` format string for `price_date`.
    pub date_format: String,
}

impl SourceConfig {
    /// Delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(Error::config(format!(
                "source.delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("modified.csv"),
            delimiter: ',',
            date_format: "%m/%d/%Y".to_string(),
        }
    }
}

/// What to do with a row that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Abort the whole load on the first bad row.
    #[default]
    Fail,
    /// Drop the row, log a warning, and record the issue.
    Skip,
}

/// Row validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Policy for rows with malformed dates, prices, or missing values.
    pub malformed_row_policy: RowPolicy,
    /// Accept zero prices (negative prices are always rejected).
    pub allow_zero_price: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            malformed_row_policy: RowPolicy::Fail,
            allow_zero_price: true,
        }
    }
}
