//! Core data model shared by the scanner and the signal engine.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while constructing or accessing a [`PriceTable`].
#[derive(Error, Debug)]
pub enum TableError {
    /// Underlying column error (missing symbol, wrong dtype)
    #[error("price table error: {0}")]
    Polars(#[from] PolarsError),

    /// Date index and price columns disagree on row count
    #[error("date index has {dates} entries but table has {rows} rows")]
    IndexMismatch { dates: usize, rows: usize },

    /// Date index must be strictly increasing
    #[error("date index is not strictly increasing at row {row}")]
    UnsortedDates { row: usize },
}

/// A rectangular table of aligned adjusted-close price series.
///
/// One `f64` column per symbol, row-aligned with a strictly increasing date
/// index. Missing-data policy: rows containing a null in any symbol column
/// are dropped at construction (complete-case alignment), so every surviving
/// row carries an observation for every symbol. Columns are stored in lexical
/// symbol order, which fixes the pair-enumeration order downstream.
#[derive(Debug, Clone)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    frame: DataFrame,
}

impl PriceTable {
    /// Build a table from a date index and a frame of price columns.
    ///
    /// Rows with any null cell are dropped together with their dates.
    pub fn new(dates: Vec<NaiveDate>, frame: DataFrame) -> Result<Self, TableError> {
        let height = frame.height();
        if dates.len() != height {
            return Err(TableError::IndexMismatch {
                dates: dates.len(),
                rows: height,
            });
        }
        if let Some(row) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(TableError::UnsortedDates { row: row + 1 });
        }

        // Lexical column order so pair enumeration is deterministic.
        let mut symbols: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        symbols.sort();
        let frame = frame.select(symbols)?;

        // Complete-case alignment: keep only rows observed for every symbol.
        let mut keep = vec![true; height];
        for column in frame.get_columns() {
            let ca = column.f64()?;
            for (i, slot) in keep.iter_mut().enumerate() {
                if ca.get(i).is_none() {
                    *slot = false;
                }
            }
        }

        if keep.iter().all(|k| *k) {
            return Ok(Self { dates, frame });
        }

        let mask = BooleanChunked::from_slice("keep", &keep);
        let frame = frame.filter(&mask)?;
        let dates = dates
            .into_iter()
            .zip(keep)
            .filter_map(|(d, k)| k.then_some(d))
            .collect();

        Ok(Self { dates, frame })
    }

    /// Symbols in lexical order.
    pub fn symbols(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Number of aligned observations.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// The shared date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Price series for one symbol.
    pub fn series(&self, symbol: &str) -> Result<&Float64Chunked, TableError> {
        Ok(self.frame.column(symbol)?.f64()?)
    }

    /// Price series for one symbol as a plain vector.
    ///
    /// Safe because construction drops incomplete rows.
    pub fn values(&self, symbol: &str) -> Result<Vec<f64>, TableError> {
        Ok(self.series(symbol)?.into_no_null_iter().collect())
    }
}

/// Outcome of one Engle-Granger cointegration test for an unordered pair.
///
/// `symbol_a < symbol_b` lexically; each unordered pair appears exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct CointegrationResult {
    /// First symbol of the pair
    pub symbol_a: String,
    /// Second symbol of the pair
    pub symbol_b: String,
    /// ADF t-statistic on the cointegrating residuals (more negative = stronger)
    pub statistic: f64,
    /// Approximate p-value under the no-cointegration null, in [0, 1]
    pub p_value: f64,
    /// Critical values at the 1% / 5% / 10% levels
    pub critical_values: [f64; 3],
}

/// Market position held on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Long the spread (long A, short B)
    Long,
    /// Short the spread (short A, long B)
    Short,
    /// No position
    Flat,
}

impl Position {
    /// Signed position multiplier used by the return computation.
    pub fn value(self) -> i8 {
        match self {
            Position::Long => 1,
            Position::Short => -1,
            Position::Flat => 0,
        }
    }

    /// Label used in the exported signal table.
    ///
    /// Flat renders as "Exit" for compatibility with the legacy signal-table
    /// format; this is distinct from the exit-band count in the metrics.
    pub fn label(self) -> &'static str {
        match self {
            Position::Long => "Long",
            Position::Short => "Short",
            Position::Flat => "Exit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| date("2023-01-01") + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_columns_sorted_lexically() {
        let df = df!(
            "ZZ" => &[1.0, 2.0],
            "AA" => &[3.0, 4.0],
        )
        .unwrap();
        let table = PriceTable::new(dates(2), df).unwrap();
        assert_eq!(table.symbols(), vec!["AA".to_string(), "ZZ".to_string()]);
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let df = df!(
            "A" => &[Some(1.0), None, Some(3.0)],
            "B" => &[Some(10.0), Some(20.0), Some(30.0)],
        )
        .unwrap();
        let table = PriceTable::new(dates(3), df).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.values("A").unwrap(), vec![1.0, 3.0]);
        assert_eq!(table.values("B").unwrap(), vec![10.0, 30.0]);
        assert_eq!(table.dates().len(), 2);
        assert_eq!(table.dates()[1], date("2023-01-03"));
    }

    #[test]
    fn test_index_mismatch_rejected() {
        let df = df!("A" => &[1.0, 2.0]).unwrap();
        let err = PriceTable::new(dates(3), df).unwrap_err();
        assert!(matches!(err, TableError::IndexMismatch { dates: 3, rows: 2 }));
    }

    #[test]
    fn test_unsorted_dates_rejected() {
        let df = df!("A" => &[1.0, 2.0]).unwrap();
        let idx = vec![date("2023-01-02"), date("2023-01-01")];
        let err = PriceTable::new(idx, df).unwrap_err();
        assert!(matches!(err, TableError::UnsortedDates { row: 1 }));
    }

    #[test]
    fn test_position_values_and_labels() {
        assert_eq!(Position::Long.value(), 1);
        assert_eq!(Position::Short.value(), -1);
        assert_eq!(Position::Flat.value(), 0);
        assert_eq!(Position::Long.label(), "Long");
        assert_eq!(Position::Short.label(), "Short");
        assert_eq!(Position::Flat.label(), "Exit");
    }

    #[test]
    fn test_missing_symbol_errors() {
        let df = df!("A" => &[1.0, 2.0]).unwrap();
        let table = PriceTable::new(dates(2), df).unwrap();
        assert!(table.series("B").is_err());
    }
}
