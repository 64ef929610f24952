//! statistical_tests::decomposition — classical additive decomposition.
//!
//! `y_t = T_t + S_t + R_t` with a centred moving-average trend (a `2×P`
//! average for even `P`), a seasonal component built from the phase means
//! of the detrended values and recentred to zero mean, and the remainder.
//! The first and last `⌊P/2⌋` positions have no trend value and are `None`
//! in `trend` and `residual`.
use serde::Serialize;

use crate::{
    errors::{AnalysisError, AnalysisResult},
    statistical_tests::validation::validate_series,
    utils::population_variance,
};

const CONTEXT: &str = "decomposition";

/// SeasonalDecomposition — aligned trend / seasonal / residual components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalDecomposition {
    pub period: usize,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
    /// `max(0, 1 − Var(R)/Var(S + R))` over positions with a trend value.
    pub strength: f64,
}

/// Decompose `data` additively with seasonal period `period`.
///
/// Errors
/// ------
/// - `InsufficientData` unless `period ≥ 2` and `n ≥ 2·period`.
/// - `DegenerateSeries` for non-finite input.
pub fn decompose(data: &[f64], period: usize) -> AnalysisResult<SeasonalDecomposition> {
    if period < 2 {
        return Err(AnalysisError::degenerate(CONTEXT, format!("period {period} is below 2")));
    }
    validate_series(data, 2 * period, CONTEXT)?;
    let n = data.len();

    let trend = centred_moving_average(data, period);

    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (t, tr) in trend.iter().enumerate() {
        if let Some(tr) = tr {
            sums[t % period] += data[t] - tr;
            counts[t % period] += 1;
        }
    }
    let phase: Vec<f64> = sums.iter().zip(&counts).map(|(s, c)| s / (*c).max(1) as f64).collect();
    let centre = phase.iter().sum::<f64>() / period as f64;
    let seasonal: Vec<f64> = (0..n).map(|t| phase[t % period] - centre).collect();

    let residual: Vec<Option<f64>> =
        trend.iter().enumerate().map(|(t, tr)| tr.map(|tr| data[t] - tr - seasonal[t])).collect();

    let (r, sr): (Vec<f64>, Vec<f64>) = residual
        .iter()
        .enumerate()
        .filter_map(|(t, r)| r.map(|r| (r, seasonal[t] + r)))
        .unzip();
    let var_sr = population_variance(&sr);
    let strength = if var_sr > 0.0 { (1.0 - population_variance(&r) / var_sr).max(0.0) } else { 0.0 };

    Ok(SeasonalDecomposition { period, trend, seasonal, residual, strength })
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Centred MA of order `period`; `2×period` weighting for even periods.
fn centred_moving_average(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = data.len();
    let half = period / 2;
    let even = period % 2 == 0;
    (0..n)
        .map(|t| {
            if t < half || t + half >= n {
                return None;
            }
            let window = &data[t - half..=t + half];
            let sum: f64 = if even {
                0.5 * (window[0] + window[period]) + window[1..period].iter().sum::<f64>()
            } else {
                window.iter().sum()
            };
            Some(sum / period as f64)
        })
        .collect()
}
