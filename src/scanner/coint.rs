//! Engle-Granger two-step cointegration test
//!
//! Step one fits the cointegrating regression `a = α + β·b + ε` by ordinary
//! least squares; step two runs an ADF-style unit-root test on the residuals.
//! A strongly negative t-statistic rejects the no-cointegration null.

use tracing::debug;

/// Minimum usable observations for a reliable test
pub const MIN_OBSERVATIONS: usize = 20;

/// Engle-Granger critical values for the two-variable, constant case
/// at the 1% / 5% / 10% significance levels (asymptotic).
///
/// These are lower than plain ADF critical values because the cointegrating
/// vector is estimated in step one.
pub const CRITICAL_VALUES: [f64; 3] = [-3.90, -3.34, -3.05];

/// Significance levels matching [`CRITICAL_VALUES`]
const SIGNIFICANCE_LEVELS: [f64; 3] = [0.01, 0.05, 0.10];

/// Result of a single cointegration test
#[derive(Debug, Clone, Copy)]
pub struct CointTest {
    /// ADF t-statistic on the cointegrating residuals
    pub statistic: f64,
    /// Approximate p-value in [0, 1]
    pub p_value: f64,
    /// Critical values at 1% / 5% / 10%
    pub critical_values: [f64; 3],
}

/// Run the Engle-Granger test on two aligned price series.
///
/// Returns `None` when the series are too short, misaligned, or numerically
/// degenerate (zero-variance regressor or residuals); callers skip such
/// pairs rather than failing the whole scan.
pub fn engle_granger(a: &[f64], b: &[f64]) -> Option<CointTest> {
    if a.len() != b.len() || a.len() < MIN_OBSERVATIONS {
        return None;
    }

    let residuals = ols_residuals(a, b)?;
    let statistic = adf_statistic(&residuals)?;
    let p_value = p_value_from_statistic(statistic);

    debug!(
        stat = format!("{:.3}", statistic),
        p = format!("{:.4}", p_value),
        "Engle-Granger test complete"
    );

    Some(CointTest {
        statistic,
        p_value,
        critical_values: CRITICAL_VALUES,
    })
}

/// Residuals of the closed-form simple regression `a = α + β·b + ε`.
fn ols_residuals(a: &[f64], b: &[f64]) -> Option<Vec<f64>> {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_b = 0.0;
    for (x, y) in b.iter().zip(a.iter()) {
        let dx = x - mean_b;
        covariance += dx * (y - mean_a);
        var_b += dx * dx;
    }

    if var_b.abs() < f64::EPSILON {
        return None; // constant regressor, no cointegrating relation to fit
    }

    let beta = covariance / var_b;
    let alpha = mean_a - beta * mean_b;

    let residuals: Vec<f64> = a
        .iter()
        .zip(b.iter())
        .map(|(y, x)| y - alpha - beta * x)
        .collect();

    if residuals.iter().all(|r| r.is_finite()) {
        Some(residuals)
    } else {
        None
    }
}

/// ADF t-statistic for a unit root in `series`.
///
/// Regresses the first differences on the demeaned lagged level:
/// `Δy[t] = γ·y[t-1] + ε`, and returns the t-statistic of γ. Under the
/// unit-root null γ = 0; stationary series drive γ (and the statistic)
/// negative.
fn adf_statistic(series: &[f64]) -> Option<f64> {
    if series.len() < MIN_OBSERVATIONS {
        return None;
    }

    let n = series.len() - 1; // number of differences
    let n_f64 = n as f64;

    let mut delta_y: Vec<f64> = Vec::with_capacity(n);
    let mut y_lag: Vec<f64> = Vec::with_capacity(n);
    for i in 1..series.len() {
        delta_y.push(series[i] - series[i - 1]);
        y_lag.push(series[i - 1]);
    }

    // Demean for numerical stability
    let y_lag_mean = y_lag.iter().sum::<f64>() / n_f64;
    let delta_y_mean = delta_y.iter().sum::<f64>() / n_f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let y_centered = y_lag[i] - y_lag_mean;
        numerator += y_centered * (delta_y[i] - delta_y_mean);
        denominator += y_centered * y_centered;
    }

    if denominator.abs() < f64::EPSILON {
        return None;
    }

    let gamma = numerator / denominator;

    let mut sse = 0.0;
    for i in 0..n {
        let predicted = gamma * (y_lag[i] - y_lag_mean) + delta_y_mean;
        let residual = delta_y[i] - predicted;
        sse += residual * residual;
    }

    let mse = sse / (n_f64 - 1.0);
    let se_gamma = (mse / denominator).sqrt();

    if se_gamma.abs() < f64::EPSILON || !se_gamma.is_finite() {
        return None;
    }

    let t_statistic = gamma / se_gamma;
    t_statistic.is_finite().then_some(t_statistic)
}

/// Approximate p-value for an Engle-Granger statistic.
///
/// Piecewise-monotone interpolation across the tabulated critical values,
/// with exponential tails outside them. Coarser than the full MacKinnon
/// response surface but ordinally consistent with it, which is what the
/// ranking needs.
pub fn p_value_from_statistic(statistic: f64) -> f64 {
    let [cv_1, cv_5, cv_10] = CRITICAL_VALUES;
    let [p_1, p_5, p_10] = SIGNIFICANCE_LEVELS;

    let p = if statistic < cv_1 {
        p_1 * (statistic - cv_1).exp()
    } else if statistic < cv_5 {
        p_1 + (p_5 - p_1) * (statistic - cv_1) / (cv_5 - cv_1)
    } else if statistic < cv_10 {
        p_5 + (p_10 - p_5) * (statistic - cv_5) / (cv_10 - cv_5)
    } else {
        p_10 + (1.0 - p_10) * (1.0 - (-0.5 * (statistic - cv_10)).exp())
    };

    p.clamp(0.0, 1.0)
}
