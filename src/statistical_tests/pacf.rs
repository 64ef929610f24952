//! statistical_tests::pacf — partial autocorrelation via Durbin–Levinson.
//!
//! Purpose
//! -------
//! Derive partial autocorrelations `φ_kk` from the sample ACF with the
//! Durbin–Levinson recursion, reporting them with the same band and
//! significance convention as the ACF so the two correlograms are directly
//! comparable.
//!
//! Key behaviors
//! -------------
//! - `φ_00 = 1`, `φ_11 = r_1`, and for `k ≥ 2`
//!   `φ_kk = (r_k − Σ_{j=1}^{k−1} φ_{k−1,j} r_{k−j}) / (1 − Σ_{j=1}^{k−1} φ_{k−1,j} r_j)`.
//! - If the denominator collapses (`≤ SINGULAR_TOL`) or a value becomes
//!   non-finite, the recursion stops: later lags are omitted and a
//!   truncation warning is recorded. NaNs never propagate.
//!
//! Invariants & assumptions
//! ------------------------
//! - `pacf_values[1] == acf_values[1]` whenever `K ≥ 1`.
//! - `lags`, `pacf_values` and `confidence_intervals` are aligned.
use serde::Serialize;

use crate::{
    errors::AnalysisResult,
    statistical_tests::{
        acf::{sample_acf, CorrelogramOptions},
        validation::{clamp_lags, validate_variance},
    },
};

const CONTEXT: &str = "partial_autocorrelation";

/// Denominator threshold below which the recursion is considered singular.
pub const SINGULAR_TOL: f64 = 1e-10;

/// PartialAutocorrelationResult — partial correlogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialAutocorrelationResult {
    pub lags: Vec<usize>,
    pub pacf_values: Vec<f64>,
    pub confidence_intervals: Vec<[f64; 2]>,
    pub significant_lags: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Compute the PACF for lags `0..=max_lags`.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
/// - `max_lags`: `usize`
///   Clamped to `n − 1` with a warning.
/// - `options`: `&CorrelogramOptions`
///   Shared with the ACF.
///
/// Errors
/// ------
/// - `InsufficientData` if `n < 2`.
/// - `DegenerateSeries` for zero variance or non-finite input.
pub fn partial_autocorrelation(
    data: &[f64], max_lags: usize, options: &CorrelogramOptions,
) -> AnalysisResult<PartialAutocorrelationResult> {
    let n = data.len();
    let mut warnings = Vec::new();
    validate_variance(data, 2, CONTEXT)?;
    let max_lag = clamp_lags(max_lags, n - 1, &format!("exceeds series length {n}"), &mut warnings);

    let acf = sample_acf(data, max_lag)?;
    let pacf_values = durbin_levinson(&acf, &mut warnings);
    let (confidence_intervals, significant_lags) = options.bands_and_significance(&pacf_values, n);

    Ok(PartialAutocorrelationResult {
        lags: (0..pacf_values.len()).collect(),
        pacf_values,
        confidence_intervals,
        significant_lags,
        warnings,
    })
}

/// Durbin–Levinson recursion on `acf[0..=K]`; returns `φ_00..=φ_mm`, `m ≤ K`.
pub fn durbin_levinson(acf: &[f64], warnings: &mut Vec<String>) -> Vec<f64> {
    let max_lag = acf.len().saturating_sub(1);
    let mut out = Vec::with_capacity(acf.len());
    out.push(1.0);
    if max_lag == 0 {
        return out;
    }

    let mut phi_prev: Vec<f64> = vec![acf[1]];
    out.push(acf[1]);

    for k in 2..=max_lag {
        let num = acf[k] - (1..k).map(|j| phi_prev[j - 1] * acf[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi_prev[j - 1] * acf[j]).sum::<f64>();
        let phi_kk = num / den;
        if den.abs() <= SINGULAR_TOL || !phi_kk.is_finite() {
            warnings.push(format!(
                "PACF recursion became singular at lag {k}; lags {k}..={max_lag} omitted"
            ));
            break;
        }
        let mut phi_next: Vec<f64> = (1..k).map(|j| phi_prev[j - 1] - phi_kk * phi_prev[k - j - 1]).collect();
        phi_next.push(phi_kk);
        phi_prev = phi_next;
        out.push(phi_kk);
    }
    out
}
