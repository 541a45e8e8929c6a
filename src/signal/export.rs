//! Signal-table CSV export
//!
//! Writes the per-date signal table as UTF-8 CSV with a header row:
//! `Date,Z-score,Signal`. Null z-scores render as empty cells; the Signal
//! column carries the position labels `Long` / `Short` / `Exit` (`Exit`
//! being the flat-position label, kept verbatim for compatibility with the
//! legacy table format).

use super::error::SignalError;
use super::PairSignal;
use chrono::NaiveDate;
use polars::io::mmap::MmapBytesReader;
use polars::prelude::*;
use std::io::Write;

/// Write the signal table for one computed pair signal.
pub fn write_signal_table<W: Write>(signal: &PairSignal, writer: W) -> Result<(), SignalError> {
    let dates: Vec<String> = signal.dates.iter().map(|d| d.to_string()).collect();
    let labels: Vec<&str> = signal.positions.iter().map(|p| p.label()).collect();

    let mut zscore = signal.zscore.clone();
    zscore.rename("Z-score");

    let mut frame = DataFrame::new(vec![
        Series::new("Date", dates),
        zscore.into_series(),
        Series::new("Signal", labels),
    ])?;

    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(())
}

/// Read a signal table back into `(date, z-score, signal)` rows.
///
/// Inverse of [`write_signal_table`] up to floating-point formatting.
pub fn read_signal_table<R: MmapBytesReader>(
    reader: R,
) -> Result<Vec<(NaiveDate, Option<f64>, String)>, SignalError> {
    let frame = CsvReader::new(reader).finish()?;

    let date_col = frame.column("Date")?.str()?.clone();
    let signal_col = frame.column("Signal")?.str()?.clone();
    // An all-null column infers as string; treat it as all-null f64.
    let zscore_col = frame.column("Z-score")?.f64().ok().cloned();

    let mut rows = Vec::with_capacity(frame.height());
    for i in 0..frame.height() {
        let raw_date = date_col
            .get(i)
            .ok_or_else(|| SignalError::DateParse(format!("missing date at row {i}")))?;
        let date: NaiveDate = raw_date
            .parse()
            .map_err(|_| SignalError::DateParse(format!("unparseable date '{raw_date}'")))?;
        let zscore = zscore_col.as_ref().and_then(|ca| ca.get(i));
        let signal = signal_col.get(i).unwrap_or_default().to_string();
        rows.push((date, zscore, signal));
    }

    Ok(rows)
}
