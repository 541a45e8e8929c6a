//! Signal & Backtest Engine
//!
//! Turns two aligned price series into a rolling z-score of their spread, a
//! long/flat/short position series, vectorized strategy returns, and a
//! summary of performance metrics.
//!
//! The whole computation is a pure function of its inputs: no I/O, no clock,
//! no shared state, so it is safe to re-run on every parameter change.

pub mod error;
pub mod export;

pub use error::SignalError;
pub use export::{read_signal_table, write_signal_table};

use crate::types::{Position, PriceTable};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Full output of one signal/backtest computation.
///
/// All series share the date index; undefined cells (window warmup, zero
/// variance, missing prior position) are nulls, never NaN.
#[derive(Debug, Clone)]
pub struct PairSignal {
    /// Shared date index
    pub dates: Vec<NaiveDate>,
    /// Rolling z-score of the spread (nullable)
    pub zscore: Float64Chunked,
    /// Position held on each date
    pub positions: Vec<Position>,
    /// Per-period strategy return (nullable)
    pub returns: Float64Chunked,
    /// Running sum of the returns (nullable)
    pub cumulative: Float64Chunked,
    /// Summary performance metrics
    pub metrics: Metrics,
}

/// Trading days per year for Sharpe annualization
pub const ANNUALIZATION_FACTOR: f64 = 252.0;

/// Parameters for the z-score signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalParams {
    /// Rolling window size for the spread mean/std (in observations)
    #[serde(default = "default_window")]
    pub window: usize,
    /// Z-score magnitude beyond which a position is entered
    #[serde(default = "default_entry")]
    pub entry_threshold: f64,
    /// Z-score magnitude below which a date counts as an exit signal
    #[serde(default = "default_exit")]
    pub exit_threshold: f64,
}

fn default_window() -> usize {
    30
}
fn default_entry() -> f64 {
    2.0
}
fn default_exit() -> f64 {
    0.5
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            window: default_window(),
            entry_threshold: default_entry(),
            exit_threshold: default_exit(),
        }
    }
}

impl SignalParams {
    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.window < 2 {
            return Err(format!("window must be at least 2, got {}", self.window));
        }
        if !self.entry_threshold.is_finite() || !self.exit_threshold.is_finite() {
            return Err("thresholds must be finite".to_string());
        }
        if self.exit_threshold < 0.0 {
            return Err(format!(
                "exit_threshold must be non-negative, got {}",
                self.exit_threshold
            ));
        }
        if self.entry_threshold <= self.exit_threshold {
            return Err(format!(
                "entry_threshold ({}) must exceed exit_threshold ({})",
                self.entry_threshold, self.exit_threshold
            ));
        }
        Ok(())
    }
}

/// Summary performance metrics for a backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Final cumulative return, in percent
    pub total_return_pct: f64,
    /// Mean per-period return, in percent
    pub avg_daily_return_pct: f64,
    /// Annualized Sharpe ratio; `None` when volatility is zero or undefined
    pub sharpe_ratio: Option<f64>,
    /// Dates with z-score below the negative entry threshold
    pub long_signals: u32,
    /// Dates with z-score above the entry threshold
    pub short_signals: u32,
    /// Dates with |z-score| inside the exit band (reporting-only sub-case,
    /// counted independently of the position held)
    pub exit_signals: u32,
}

/// Compute the pair signal for two symbols of a price table.
pub fn compute_signal(
    prices: &PriceTable,
    symbol_a: &str,
    symbol_b: &str,
    params: &SignalParams,
) -> Result<PairSignal, SignalError> {
    let series_a = prices.series(symbol_a)?;
    let series_b = prices.series(symbol_b)?;
    compute_signal_series(prices.dates(), series_a, series_b, params)
}

/// Compute the pair signal from raw aligned series.
///
/// # Algorithm
///
/// 1. `spread[t] = a[t] - b[t]`
/// 2. Trailing rolling mean/std of the spread over `window` observations
///    (sample standard deviation; the first `window - 1` cells are null).
/// 3. `z[t] = (spread[t] - mean[t]) / std[t]`, null where the std is null
///    or zero.
/// 4. Memoryless per-date classification: `z < -entry` is Long, `z > entry`
///    is Short, anything else (null included) is Flat. The exit band
///    `|z| < exit` is a reporting-only sub-case of Flat; it never overrides
///    the position.
/// 5. `return[t] = (pct_a[t] - pct_b[t]) * position[t-1]` — the signal at
///    `t` is acted on one period later; the first date has no prior position
///    and yields a null return.
/// 6. Cumulative return is the running sum of non-null returns.
///
/// A window longer than the series yields an all-null z-score, not an error.
pub fn compute_signal_series(
    dates: &[NaiveDate],
    series_a: &Float64Chunked,
    series_b: &Float64Chunked,
    params: &SignalParams,
) -> Result<PairSignal, SignalError> {
    params.validate().map_err(SignalError::InvalidParams)?;

    if series_a.len() != series_b.len() {
        return Err(SignalError::MisalignedInput {
            left: series_a.len(),
            right: series_b.len(),
        });
    }
    if dates.len() != series_a.len() {
        return Err(SignalError::MisalignedInput {
            left: dates.len(),
            right: series_a.len(),
        });
    }

    let len = series_a.len();
    let spread: Float64Chunked = series_a - series_b;

    let (mean_ca, std_ca) = rolling_stats(&spread, params.window)?;

    // Null z-score where the window is unfilled or the spread is constant
    // over the window; division by zero must degrade, never crash.
    let zscore = Float64Chunked::from_iter_options(
        "zscore",
        (0..len).map(|i| match (spread.get(i), mean_ca.get(i), std_ca.get(i)) {
            (Some(s), Some(m), Some(sd)) if sd > 0.0 => Some((s - m) / sd),
            _ => None,
        }),
    );

    let positions: Vec<Position> = (0..len)
        .map(|i| classify(zscore.get(i), params.entry_threshold))
        .collect();

    let pct_a = pct_change(series_a);
    let pct_b = pct_change(series_b);

    // Position lagged by one period; the first date has no prior position.
    let returns = Float64Chunked::from_iter_options(
        "returns",
        (0..len).map(|i| {
            if i == 0 {
                return None;
            }
            match (pct_a.get(i), pct_b.get(i)) {
                (Some(ra), Some(rb)) => Some((ra - rb) * f64::from(positions[i - 1].value())),
                _ => None,
            }
        }),
    );

    // Running sum that carries across null cells but leaves them null.
    let mut running = 0.0;
    let cumulative = Float64Chunked::from_iter_options(
        "cumulative",
        (0..len).map(|i| {
            returns.get(i).map(|r| {
                running += r;
                running
            })
        }),
    );

    let metrics = compute_metrics(&zscore, &returns, &cumulative, params);

    info!(
        observations = len,
        window = params.window,
        total_return_pct = format!("{:.2}", metrics.total_return_pct),
        long = metrics.long_signals,
        short = metrics.short_signals,
        "Signal computed"
    );

    Ok(PairSignal {
        dates: dates.to_vec(),
        zscore,
        positions,
        returns,
        cumulative,
        metrics,
    })
}

/// Trailing rolling mean and sample standard deviation with
/// `min_periods == window`.
fn rolling_stats(
    spread: &Float64Chunked,
    window: usize,
) -> Result<(Float64Chunked, Float64Chunked), SignalError> {
    if spread.len() < window {
        // Window longer than the series: every cell is undefined.
        let nulls = Float64Chunked::full_null("rolling", spread.len());
        return Ok((nulls.clone(), nulls));
    }

    let opts = RollingOptionsFixedWindow {
        window_size: window,
        min_periods: window,
        weights: None,
        center: false,
        fn_params: None,
    };

    let spread_series = spread.clone().into_series();
    let mean = spread_series.rolling_mean(opts.clone())?.f64()?.clone();
    let std = spread_series.rolling_std(opts)?.f64()?.clone();
    Ok((mean, std))
}

/// Per-date position from the z-score alone — no hysteresis, no memory.
fn classify(zscore: Option<f64>, entry_threshold: f64) -> Position {
    match zscore {
        Some(z) if z < -entry_threshold => Position::Long,
        Some(z) if z > entry_threshold => Position::Short,
        _ => Position::Flat,
    }
}

/// One-period percentage change; the first cell and cells next to missing
/// or zero prices are null.
fn pct_change(series: &Float64Chunked) -> Float64Chunked {
    Float64Chunked::from_iter_options(
        "pct_change",
        (0..series.len()).map(|i| {
            if i == 0 {
                return None;
            }
            match (series.get(i - 1), series.get(i)) {
                (Some(prev), Some(cur)) if prev != 0.0 => Some(cur / prev - 1.0),
                _ => None,
            }
        }),
    )
}

fn compute_metrics(
    zscore: &Float64Chunked,
    returns: &Float64Chunked,
    cumulative: &Float64Chunked,
    params: &SignalParams,
) -> Metrics {
    let mut long_signals = 0u32;
    let mut short_signals = 0u32;
    let mut exit_signals = 0u32;
    for i in 0..zscore.len() {
        if let Some(z) = zscore.get(i) {
            if z < -params.entry_threshold {
                long_signals += 1;
            } else if z > params.entry_threshold {
                short_signals += 1;
            }
            if z.abs() < params.exit_threshold {
                exit_signals += 1;
            }
        }
    }

    let realized: Vec<f64> = (0..returns.len()).filter_map(|i| returns.get(i)).collect();
    let n = realized.len() as f64;
    let mean = if realized.is_empty() {
        0.0
    } else {
        realized.iter().sum::<f64>() / n
    };

    // Sample standard deviation (n - 1), matching the rolling convention.
    let sharpe_ratio = if realized.len() < 2 {
        None
    } else {
        let variance =
            realized.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();
        if std_dev.abs() < f64::EPSILON {
            None
        } else {
            Some(mean / std_dev * ANNUALIZATION_FACTOR.sqrt())
        }
    };

    let total_return_pct = (0..cumulative.len())
        .rev()
        .find_map(|i| cumulative.get(i))
        .unwrap_or(0.0)
        * 100.0;

    Metrics {
        total_return_pct,
        avg_daily_return_pct: mean * 100.0,
        sharpe_ratio,
        long_signals,
        short_signals,
        exit_signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start: NaiveDate = "2023-01-01".parse().unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    fn ca(name: &str, values: &[f64]) -> Float64Chunked {
        Float64Chunked::from_slice(name, values)
    }

    fn default_params(window: usize) -> SignalParams {
        SignalParams {
            window,
            ..SignalParams::default()
        }
    }

    #[test]
    fn test_reference_scenario_zscores() {
        // Reference rolling mean/std computation, sample stddev:
        // spread = [50, 50.8, 49.2, 48.5, 51.5]
        let a = ca("a", &[100.0, 101.0, 99.0, 98.0, 102.0]);
        let b = ca("b", &[50.0, 50.2, 49.8, 49.5, 50.5]);
        let signal =
            compute_signal_series(&dates(5), &a, &b, &default_params(3)).unwrap();

        assert!(signal.zscore.get(0).is_none());
        assert!(signal.zscore.get(1).is_none());
        assert!((signal.zscore.get(2).unwrap() - (-1.0)).abs() < 1e-6);
        assert!((signal.zscore.get(3).unwrap() - (-0.84819)).abs() < 1e-4);
        assert!((signal.zscore.get(4).unwrap() - 1.12562).abs() < 1e-4);

        // Entry threshold 2.0: nothing fires in this scenario.
        assert!(signal.positions.iter().all(|p| *p == Position::Flat));
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(classify(Some(2.5), 2.0), Position::Short);
        assert_eq!(classify(Some(-2.1), 2.0), Position::Long);
        assert_eq!(classify(Some(0.3), 2.0), Position::Flat);
        assert_eq!(classify(Some(1.0), 2.0), Position::Flat);
        assert_eq!(classify(None, 2.0), Position::Flat);
    }

    #[test]
    fn test_exit_band_counted_independently() {
        // z in the open (exit, entry) band is Flat but NOT an exit signal;
        // z inside the exit band is Flat AND an exit signal.
        let zscore = Float64Chunked::from_iter_options(
            "zscore",
            [None, Some(0.3), Some(1.0), Some(2.5), Some(-2.1)].into_iter(),
        );
        let returns = Float64Chunked::full_null("returns", 5);
        let cumulative = Float64Chunked::full_null("cumulative", 5);
        let metrics = compute_metrics(&zscore, &returns, &cumulative, &SignalParams::default());

        assert_eq!(metrics.exit_signals, 1);
        assert_eq!(metrics.short_signals, 1);
        assert_eq!(metrics.long_signals, 1);
    }

    #[test]
    fn test_zero_variance_window_yields_null() {
        // Constant spread: rolling std is 0 everywhere, so every z-score
        // cell must be null rather than raising a division error.
        let a = ca("a", &[10.0; 8]);
        let b = ca("b", &[4.0; 8]);
        let signal =
            compute_signal_series(&dates(8), &a, &b, &default_params(3)).unwrap();

        for i in 0..8 {
            assert!(signal.zscore.get(i).is_none(), "index {i} should be null");
        }
        assert_eq!(signal.metrics.sharpe_ratio, None);
    }

    #[test]
    fn test_window_longer_than_series_not_fatal() {
        let a = ca("a", &[1.0, 2.0, 3.0]);
        let b = ca("b", &[1.0, 1.0, 1.0]);
        let signal =
            compute_signal_series(&dates(3), &a, &b, &default_params(30)).unwrap();
        assert!((0..3).all(|i| signal.zscore.get(i).is_none()));
    }

    #[test]
    fn test_misaligned_input_rejected() {
        let a = ca("a", &[1.0, 2.0, 3.0]);
        let b = ca("b", &[1.0, 2.0]);
        let err = compute_signal_series(&dates(3), &a, &b, &default_params(2)).unwrap_err();
        assert!(matches!(err, SignalError::MisalignedInput { left: 3, right: 2 }));

        let b = ca("b", &[1.0, 2.0, 3.0]);
        let err = compute_signal_series(&dates(4), &a, &b, &default_params(2)).unwrap_err();
        assert!(matches!(err, SignalError::MisalignedInput { .. }));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let a = ca("a", &[1.0, 2.0, 3.0]);
        let b = ca("b", &[1.0, 1.0, 1.0]);

        let bad_window = SignalParams {
            window: 1,
            ..SignalParams::default()
        };
        assert!(matches!(
            compute_signal_series(&dates(3), &a, &b, &bad_window),
            Err(SignalError::InvalidParams(_))
        ));

        let inverted = SignalParams {
            window: 2,
            entry_threshold: 0.5,
            exit_threshold: 2.0,
        };
        assert!(matches!(
            compute_signal_series(&dates(3), &a, &b, &inverted),
            Err(SignalError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_position_lag_and_cumulative_prefix_sum() {
        // Craft prices whose spread z-score goes strongly negative at
        // index 3, so a Long position is held from index 3 and the
        // return at index 4 is (pct_a - pct_b) * +1.
        let a = ca("a", &[10.0, 11.0, 10.0, 2.0, 4.0]);
        let b = ca("b", &[5.0, 5.0, 5.0, 5.0, 5.0]);
        let params = SignalParams {
            window: 3,
            entry_threshold: 1.0,
            exit_threshold: 0.5,
        };
        let signal = compute_signal_series(&dates(5), &a, &b, &params).unwrap();

        assert_eq!(signal.positions[3], Position::Long);
        // First return is null: no prior position exists.
        assert!(signal.returns.get(0).is_none());
        // Position at t=2 is Flat, so return at t=3 is zero even though
        // prices moved.
        assert_eq!(signal.returns.get(3), Some(0.0));
        // Return at t=4 uses the position from t=3.
        let expected = (4.0 / 2.0 - 1.0) - 0.0;
        assert!((signal.returns.get(4).unwrap() - expected).abs() < 1e-12);

        // Cumulative is the prefix sum of the non-null returns.
        let mut running = 0.0;
        for i in 0..5 {
            match signal.returns.get(i) {
                Some(r) => {
                    running += r;
                    assert!((signal.cumulative.get(i).unwrap() - running).abs() < 1e-12);
                }
                None => assert!(signal.cumulative.get(i).is_none()),
            }
        }
        assert!(
            (signal.metrics.total_return_pct - running * 100.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_deterministic() {
        let a = ca("a", &[100.0, 101.0, 99.0, 98.0, 102.0, 103.0, 97.0]);
        let b = ca("b", &[50.0, 50.2, 49.8, 49.5, 50.5, 51.0, 48.0]);
        let params = default_params(3);
        let first = compute_signal_series(&dates(7), &a, &b, &params).unwrap();
        let second = compute_signal_series(&dates(7), &a, &b, &params).unwrap();

        assert_eq!(first.positions, second.positions);
        assert_eq!(first.metrics, second.metrics);
        for i in 0..7 {
            assert_eq!(first.zscore.get(i), second.zscore.get(i));
            assert_eq!(first.returns.get(i), second.returns.get(i));
        }
    }

    #[test]
    fn test_default_params_validate() {
        assert!(SignalParams::default().validate().is_ok());
    }
}
