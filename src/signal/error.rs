//! Error types for the signal and backtest engine

use thiserror::Error;

/// Errors raised by [`compute_signal`](crate::signal::compute_signal) and the
/// signal-table export. Numeric degeneracy (zero-variance windows, zero
/// volatility) is never an error — it degrades to null cells instead.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Input series disagree on length or date index
    #[error("misaligned input: {left} rows on one side, {right} on the other")]
    MisalignedInput { left: usize, right: usize },

    /// Invalid window or threshold parameters
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Date parsing error while reading a signal table back
    #[error("date parsing error: {0}")]
    DateParse(String),

    /// Underlying series/frame error
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    /// Price table access error
    #[error(transparent)]
    Table(#[from] crate::types::TableError),
}
