//! Scan configuration
//!
//! Serde-backed configuration for the pair scan, loadable from a JSON file
//! or assembled from CLI flags. Defaults mirror the standard universe and
//! thresholds used by the legacy analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use std::path::Path;

/// Default ticker universe (NSE large caps)
pub const DEFAULT_TICKERS: &[&str] = &[
    "HDFCBANK.NS",
    "ICICIBANK.NS",
    "INFY.NS",
    "RELIANCE.NS",
    "TCS.NS",
    "WIPRO.NS",
];

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for a pair scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Ticker universe to scan
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Significance level for the cointegration test, in (0, 1)
    #[serde(default = "default_significance")]
    pub significance: f64,

    /// Maximum number of ranked pairs to return
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// First date of the analysis window (inclusive)
    #[serde(default = "default_start")]
    pub start: NaiveDate,

    /// Last date of the analysis window (inclusive)
    #[serde(default = "default_end")]
    pub end: NaiveDate,
}

fn default_tickers() -> Vec<String> {
    DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect()
}
fn default_significance() -> f64 {
    0.05
}
fn default_top_n() -> usize {
    5
}
fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}
fn default_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            significance: default_significance(),
            top_n: default_top_n(),
            start: default_start(),
            end: default_end(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.tickers.len() < 2 {
            return Err(format!(
                "need at least 2 tickers to form pairs, got {}",
                self.tickers.len()
            ));
        }
        if !(0.0..1.0).contains(&self.significance) || self.significance == 0.0 {
            return Err(format!(
                "significance must be in (0, 1), got {}",
                self.significance
            ));
        }
        if self.start > self.end {
            return Err(format!(
                "start date {} is after end date {}",
                self.start, self.end
            ));
        }
        Ok(())
    }
}
