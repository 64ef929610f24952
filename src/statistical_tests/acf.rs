//! statistical_tests::acf — sample autocorrelation with Ljung–Box.
//!
//! Purpose
//! -------
//! Compute the sample autocorrelation function of a series for lags
//! `0..=K`, white-noise confidence bands, the set of lags whose
//! autocorrelation lies outside the band, and the Ljung–Box portmanteau
//! test of "no autocorrelation up to lag K".
//!
//! Key behaviors
//! -------------
//! - Uses the biased (population) estimator
//!   `r_k = Σ_{t=k}^{n−1}(y_t − ȳ)(y_{t−k} − ȳ) / Σ_t (y_t − ȳ)²`,
//!   under which the `±z/√n` band is the correct white-noise band.
//! - `r_0` is exactly `1.0` by construction.
//! - Ljung–Box: `Q = n(n+2) Σ_{k=1}^{K} r_k² / (n − k)`, p-value from the
//!   upper tail of `χ²_K`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lags`, `acf_values` and `confidence_intervals` have identical
//!   lengths and aligned indices; `lags[i] == i`.
//! - `K ≥ n` is clamped to `n − 1` and a warning is recorded; it never
//!   fails.
//! - A zero-variance series fails with `DegenerateSeries`.
//!
//! Conventions
//! -----------
//! - Lag 0 is excluded from `significant_lags` unless
//!   [`CorrelogramOptions::include_lag_zero`] is set.
//! - The same [`CorrelogramOptions`] drive the PACF so both correlograms
//!   share one band convention.
//!
//! Downstream usage
//! ----------------
//! - The orchestrator runs [`autocorrelation`] on the sampled target.
//! - `statistical_tests::pacf` reuses [`sample_acf`] as the input of the
//!   Durbin–Levinson recursion.
//!
//! Testing notes
//! -------------
//! - Unit tests pin `r_0 = 1`, the alternating-series sign pattern, the
//!   Ljung–Box formula, both lag-0 conventions, clamping, and the ~5%
//!   false-positive rate on seeded white noise.
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{
    errors::{AnalysisError, AnalysisResult},
    statistical_tests::validation::{clamp_lags, validate_variance},
};

const CONTEXT: &str = "autocorrelation";

/// CorrelogramOptions — band and significance policy for ACF/PACF.
///
/// Fields
/// ------
/// - `significance_z`: `f64`
///   Normal quantile of the two-sided band (1.96 for 95%).
/// - `include_lag_zero`: `bool`
///   Whether lag 0 may appear in `significant_lags`. Off by default since
///   `r_0 = 1` is significant trivially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelogramOptions {
    pub significance_z: f64,
    pub include_lag_zero: bool,
}

impl CorrelogramOptions {
    pub fn new(significance_z: f64, include_lag_zero: bool) -> Self {
        CorrelogramOptions { significance_z, include_lag_zero }
    }

    /// Half-width `z/√n` of the white-noise band.
    pub fn band(&self, n: usize) -> f64 {
        self.significance_z / (n as f64).sqrt()
    }

    /// Confidence pairs and significant lags for aligned `values`.
    pub(crate) fn bands_and_significance(&self, values: &[f64], n: usize) -> (Vec<[f64; 2]>, Vec<usize>) {
        let band = self.band(n);
        let intervals = values.iter().map(|v| [v - band, v + band]).collect();
        let significant = values
            .iter()
            .enumerate()
            .filter(|(lag, v)| (*lag > 0 || self.include_lag_zero) && v.abs() > band)
            .map(|(lag, _)| lag)
            .collect();
        (intervals, significant)
    }
}

impl Default for CorrelogramOptions {
    fn default() -> Self {
        CorrelogramOptions::new(1.96, false)
    }
}

/// AutocorrelationResult — correlogram plus Ljung–Box summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocorrelationResult {
    pub lags: Vec<usize>,
    pub acf_values: Vec<f64>,
    pub confidence_intervals: Vec<[f64; 2]>,
    pub significant_lags: Vec<usize>,
    pub ljung_box_statistic: Option<f64>,
    pub ljung_box_p_value: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Compute the ACF for lags `0..=max_lags` with Ljung–Box.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
///   Finite series of length `n ≥ 2`.
/// - `max_lags`: `usize`
///   Requested largest lag `K`; clamped to `n − 1` with a warning.
/// - `options`: `&CorrelogramOptions`
///
/// Returns
/// -------
/// `AnalysisResult<AutocorrelationResult>`
///
/// Errors
/// ------
/// - `InsufficientData` if `n < 2`.
/// - `DegenerateSeries` for zero variance or non-finite input.
///
/// Examples
/// --------
/// ```rust
/// use ts_diagnostics::statistical_tests::acf::{autocorrelation, CorrelogramOptions};
///
/// let y: Vec<f64> = (0..40).map(|t| if t % 2 == 0 { 1.0 } else { -1.0 }).collect();
/// let acf = autocorrelation(&y, 3, &CorrelogramOptions::default()).unwrap();
/// assert_eq!(acf.acf_values[0], 1.0);
/// assert!(acf.acf_values[1] < 0.0 && acf.acf_values[2] > 0.0);
/// ```
pub fn autocorrelation(
    data: &[f64], max_lags: usize, options: &CorrelogramOptions,
) -> AnalysisResult<AutocorrelationResult> {
    let n = data.len();
    let mut warnings = Vec::new();
    validate_variance(data, 2, CONTEXT)?;
    let max_lag = clamp_lags(max_lags, n - 1, &format!("exceeds series length {n}"), &mut warnings);

    let acf_values = sample_acf(data, max_lag)?;
    let (confidence_intervals, significant_lags) = options.bands_and_significance(&acf_values, n);
    let (ljung_box_statistic, ljung_box_p_value) = match ljung_box(&acf_values, n)? {
        Some((q, p)) => (Some(q), Some(p)),
        None => (None, None),
    };

    Ok(AutocorrelationResult {
        lags: (0..=max_lag).collect(),
        acf_values,
        confidence_intervals,
        significant_lags,
        ljung_box_statistic,
        ljung_box_p_value,
        warnings,
    })
}

/// Biased sample autocorrelations `r_0..=r_K` of a validated series.
///
/// Errors
/// ------
/// - `DegenerateSeries` if the sum of squared deviations is zero.
pub fn sample_acf(data: &[f64], max_lag: usize) -> AnalysisResult<Vec<f64>> {
    let n = data.len();
    let mean = data.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = data.iter().map(|y| y - mean).collect();
    let c0: f64 = centered.iter().map(|d| d * d).sum();
    if !(c0 > 0.0) {
        return Err(AnalysisError::degenerate(CONTEXT, "zero variance"));
    }
    let mut out = Vec::with_capacity(max_lag + 1);
    out.push(1.0);
    for k in 1..=max_lag.min(n - 1) {
        out.push(calc_autocov_sum(&centered, k) / c0);
    }
    Ok(out)
}

//
// ---------- Private helpers (compact docs) ----------
//

/// `Σ_{t=k}^{n−1} d_t d_{t−k}` for a centred series.
#[inline]
fn calc_autocov_sum(centered: &[f64], k: usize) -> f64 {
    centered[k..].iter().zip(centered).map(|(a, b)| a * b).sum()
}

/// Ljung–Box `(Q, p)` over lags `1..=K`; `None` when `K = 0`.
fn ljung_box(acf: &[f64], n: usize) -> AnalysisResult<Option<(f64, f64)>> {
    let k = acf.len().saturating_sub(1);
    if k == 0 {
        return Ok(None);
    }
    let nf = n as f64;
    let q = nf
        * (nf + 2.0)
        * acf[1..].iter().enumerate().map(|(i, r)| r * r / (nf - (i + 1) as f64)).sum::<f64>();
    let chi2 = ChiSquared::new(k as f64)
        .map_err(|e| AnalysisError::degenerate(CONTEXT, format!("chi-squared({k}): {e}")))?;
    let p = (1.0 - chi2.cdf(q)).clamp(0.0, 1.0);
    Ok(Some((q, p)))
}
