//! Error types for the pair scanner

use crate::types::TableError;
use thiserror::Error;

/// Errors that abort a scan. Per-pair problems (short or degenerate series)
/// are skipped inside the scan instead of surfacing here.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Too few symbols to form any pair
    #[error("insufficient data: need at least {expected} symbols, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Invalid scan parameters
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Price table access error
    #[error(transparent)]
    Table(#[from] TableError),
}
