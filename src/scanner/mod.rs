//! Pair Scanner
//!
//! Tests every unordered pair of a ticker universe for cointegration and
//! ranks the survivors by statistical significance.
//!
//! # Example
//!
//! ```ignore
//! use pairscan::scanner::scan;
//!
//! let ranked = scan(&prices, 0.05, 5)?;
//! for pair in &ranked {
//!     println!("{} & {} - p-value: {:.4}", pair.symbol_a, pair.symbol_b, pair.p_value);
//! }
//! ```

pub mod coint;
pub mod error;

pub use coint::{engle_granger, CointTest, CRITICAL_VALUES, MIN_OBSERVATIONS};
pub use error::ScanError;

use crate::types::{CointegrationResult, PriceTable};
use std::cmp::Ordering;
use tracing::{info, warn};

/// Scan all unordered symbol pairs for cointegration.
///
/// Every pair `(i, j)` with `i < j` under the table's lexical symbol order is
/// tested exactly once; no self-pairs, no duplicates. Pairs with a p-value
/// below `significance` are kept, sorted ascending by p-value (ties broken by
/// symbol order so output is deterministic) and truncated to `top_n`.
///
/// An empty result is a valid outcome — it means no pair qualified, which is
/// distinct from the error cases.
///
/// # Errors
///
/// - [`ScanError::InsufficientData`] if the table has fewer than 2 symbols.
/// - [`ScanError::InvalidConfig`] if `significance` is outside (0, 1).
///
/// Pairs whose series are too short or numerically degenerate are skipped
/// with a warning; the scan continues with the remaining pairs.
pub fn scan(
    prices: &PriceTable,
    significance: f64,
    top_n: usize,
) -> Result<Vec<CointegrationResult>, ScanError> {
    if !(0.0..1.0).contains(&significance) || significance == 0.0 {
        return Err(ScanError::InvalidConfig(format!(
            "significance must be in (0, 1), got {significance}"
        )));
    }

    let symbols = prices.symbols();
    if symbols.len() < 2 {
        return Err(ScanError::InsufficientData {
            expected: 2,
            actual: symbols.len(),
        });
    }

    info!(
        symbols = symbols.len(),
        observations = prices.len(),
        significance,
        top_n,
        "Scanning pairs for cointegration"
    );

    let mut results = Vec::new();
    let mut skipped = 0u32;

    for i in 0..symbols.len() {
        for j in (i + 1)..symbols.len() {
            let sym_a = &symbols[i];
            let sym_b = &symbols[j];

            let series_a = prices.values(sym_a)?;
            let series_b = prices.values(sym_b)?;

            let Some(test) = engle_granger(&series_a, &series_b) else {
                warn!(
                    pair = format!("{}-{}", sym_a, sym_b),
                    len = series_a.len(),
                    "Pair skipped (too short or degenerate)"
                );
                skipped += 1;
                continue;
            };

            if test.p_value < significance {
                results.push(CointegrationResult {
                    symbol_a: sym_a.clone(),
                    symbol_b: sym_b.clone(),
                    statistic: test.statistic,
                    p_value: test.p_value,
                    critical_values: test.critical_values,
                });
            }
        }
    }

    // Ascending by p-value; lexical pair order breaks ties deterministically.
    results.sort_by(|a, b| {
        a.p_value
            .partial_cmp(&b.p_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                (a.symbol_a.as_str(), a.symbol_b.as_str())
                    .cmp(&(b.symbol_a.as_str(), b.symbol_b.as_str()))
            })
    });
    results.truncate(top_n);

    info!(
        qualifying = results.len(),
        skipped,
        "Scan complete"
    );

    Ok(results)
}
