//! Error types for price providers

use crate::types::TableError;
use thiserror::Error;

/// Errors raised while fetching a price table.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// None of the requested symbols resolved, or the range holds no rows
    #[error("no price data available for requested symbols {0:?}")]
    DataUnavailable(Vec<String>),

    /// The source is missing its date column
    #[error("price file is missing the '{0}' column")]
    MissingDateColumn(String),

    /// Date parsing error
    #[error("date parsing error: {0}")]
    DateParse(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/frame error
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    /// Table construction error
    #[error(transparent)]
    Table(#[from] TableError),
}
