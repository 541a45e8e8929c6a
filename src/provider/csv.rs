//! CSV-file price provider
//!
//! Reads a local CSV price file shaped like a saved market-data download:
//! a `Date` column (ISO dates, ascending) plus one adjusted-close column per
//! symbol.

use super::error::ProviderError;
use super::PriceProvider;
use crate::types::PriceTable;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, warn};

/// Name of the date column expected in the price file
const DATE_COLUMN: &str = "Date";

/// Price provider backed by a single CSV file.
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceProvider for CsvProvider {
    fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ProviderError> {
        let file = File::open(&self.path)?;
        let frame = CsvReader::new(file).finish()?;

        let available: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        if !available.iter().any(|name| name == DATE_COLUMN) {
            return Err(ProviderError::MissingDateColumn(DATE_COLUMN.to_string()));
        }

        let date_col = frame.column(DATE_COLUMN)?.str()?.clone();
        let mut dates = Vec::with_capacity(frame.height());
        for i in 0..frame.height() {
            let raw = date_col
                .get(i)
                .ok_or_else(|| ProviderError::DateParse(format!("missing date at row {i}")))?;
            let date: NaiveDate = raw
                .parse()
                .map_err(|_| ProviderError::DateParse(format!("unparseable date '{raw}'")))?;
            dates.push(date);
        }

        // Resolve the requested symbols against the available columns;
        // unknown symbols are skipped, not fatal.
        let mut resolved = Vec::new();
        for symbol in symbols {
            if available.iter().any(|name| name == symbol) {
                resolved.push(symbol.clone());
            } else {
                warn!(symbol = %symbol, "Symbol not present in price file, skipping");
            }
        }
        if resolved.is_empty() {
            return Err(ProviderError::DataUnavailable(symbols.to_vec()));
        }

        let keep: Vec<bool> = dates.iter().map(|d| *d >= start && *d <= end).collect();
        let mask = BooleanChunked::from_slice("range", &keep);
        let frame = frame.select(resolved.iter().map(|s| s.as_str()))?.filter(&mask)?;
        let dates: Vec<NaiveDate> = dates
            .into_iter()
            .zip(keep)
            .filter_map(|(d, k)| k.then_some(d))
            .collect();

        if frame.height() == 0 {
            return Err(ProviderError::DataUnavailable(symbols.to_vec()));
        }

        let table = PriceTable::new(dates, frame)?;
        info!(
            symbols = resolved.len(),
            observations = table.len(),
            start = %start,
            end = %end,
            "Price table loaded"
        );
        Ok(table)
    }
}
