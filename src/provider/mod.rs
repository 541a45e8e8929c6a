//! Price Provider
//!
//! The data-source seam of the system: given a set of symbols and a date
//! range, a provider returns a [`PriceTable`] of adjusted close prices
//! aligned on a common date index. The core never performs I/O itself —
//! callers fetch a table here first, then hand it to the scanner or the
//! signal engine.

pub mod csv;
pub mod error;

pub use csv::CsvProvider;
pub use error::ProviderError;

use crate::types::PriceTable;
use chrono::NaiveDate;

/// Source of aligned adjusted-close price series.
///
/// The fetch is synchronous; any timeout or retry policy belongs to the
/// implementation, not to the callers.
pub trait PriceProvider {
    /// Fetch prices for `symbols` over `[start, end]` inclusive.
    ///
    /// Symbols the source cannot resolve are skipped; if none resolve, or
    /// the range holds no observations, the fetch fails with
    /// [`ProviderError::DataUnavailable`].
    fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ProviderError>;
}
