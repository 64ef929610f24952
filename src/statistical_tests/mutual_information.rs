//! statistical_tests::mutual_information — lagged mutual information.
//!
//! Purpose
//! -------
//! Measure nonlinear dependence between a series and its lagged copy for
//! lags `1..=L` and pick an informative lag, complementing the linear view
//! given by the ACF.
//!
//! Key behaviors
//! -------------
//! - Discretizes the series once into `b` equal-width bins over its global
//!   range (Sturges' rule `⌈log₂ n + 1⌉`, clamped to `[2, 32]`, unless a
//!   fixed count is configured).
//! - For each lag `k`, estimates the plug-in mutual information (nats)
//!   between `(x_t, x_{t+k})` from the joint bin histogram.
//! - Uses a fixed G-test threshold: under independence
//!   `2N·MI ~ χ²((b−1)²)`, so `threshold = χ²_{1−α}((b−1)²) / (2N)`
//!   with `α = 0.01` and `N` the pair count at the largest lag.
//! - `optimal_lag` is the largest-MI lag strictly above the threshold, with
//!   ties going to the smaller lag; `first_minimum_lag` is the first local
//!   minimum of the MI curve (the classic embedding-delay heuristic).
//!
//! Invariants & assumptions
//! ------------------------
//! - `lags` and `mi_values` are aligned and every MI value is `≥ 0`.
//! - A constant series yields MI = 0 at every lag rather than an error.
//! - Each lag keeps at least `min_pairs` pairs; the lag range is clamped
//!   with a warning otherwise.
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{
    errors::{AnalysisError, AnalysisResult},
    statistical_tests::validation::{clamp_lags, validate_series},
};

const CONTEXT: &str = "mutual_information";

/// MutualInformationOptions — lag cap, binning and threshold policy.
///
/// Fields
/// ------
/// - `max_lag`: absolute cap on the lag range (30).
/// - `bins`: fixed bin count; `None` uses Sturges' rule.
/// - `significance`: α of the G-test threshold (0.01).
/// - `min_pairs`: minimum `(x_t, x_{t+k})` pairs per lag (10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutualInformationOptions {
    pub max_lag: usize,
    pub bins: Option<usize>,
    pub significance: f64,
    pub min_pairs: usize,
}

impl MutualInformationOptions {
    pub fn new(max_lag: usize, bins: Option<usize>, significance: f64, min_pairs: usize) -> Self {
        MutualInformationOptions { max_lag, bins, significance, min_pairs }
    }

    /// Bin count for a series of length `n`.
    pub fn resolve_bins(&self, n: usize) -> usize {
        self.bins.unwrap_or_else(|| ((n as f64).log2() + 1.0).ceil() as usize).clamp(2, 32)
    }
}

impl Default for MutualInformationOptions {
    fn default() -> Self {
        MutualInformationOptions::new(30, None, 0.01, 10)
    }
}

/// MutualInformationResult — MI curve and selected lag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutualInformationResult {
    pub lags: Vec<usize>,
    pub mi_values: Vec<f64>,
    pub optimal_lag: Option<usize>,
    pub mi_threshold: f64,
    pub first_minimum_lag: Option<usize>,
    pub bins: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Compute lagged mutual information for lags `1..=min(max_lags, cap)`.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
/// - `max_lags`: `usize`
///   Requested lag range from the analysis request.
/// - `options`: `&MutualInformationOptions`
///
/// Errors
/// ------
/// - `InsufficientData` when the series cannot supply `min_pairs` pairs at
///   lag 1 (`n − 1 < min_pairs`).
/// - `DegenerateSeries` for non-finite input.
pub fn mutual_information(
    data: &[f64], max_lags: usize, options: &MutualInformationOptions,
) -> AnalysisResult<MutualInformationResult> {
    let n = data.len();
    let min_pairs = options.min_pairs.max(1);
    validate_series(data, min_pairs + 1, CONTEXT)?;

    let mut warnings = Vec::new();
    let capped = max_lags.min(options.max_lag).max(1);
    let max_lag = clamp_lags(
        capped,
        n - min_pairs,
        &format!("leaves fewer than {min_pairs} pairs in a series of length {n}"),
        &mut warnings,
    );

    let bins = options.resolve_bins(n);
    let codes = discretize(data, bins);
    let mi_values: Vec<f64> = (1..=max_lag).map(|k| lagged_mi(&codes, k, bins)).collect();

    let pairs = (n - max_lag) as f64;
    let df = ((bins - 1) * (bins - 1)) as f64;
    let chi2 = ChiSquared::new(df)
        .map_err(|e| AnalysisError::degenerate(CONTEXT, format!("chi-squared({df}): {e}")))?;
    let mi_threshold = chi2.inverse_cdf(1.0 - options.significance) / (2.0 * pairs);

    Ok(MutualInformationResult {
        lags: (1..=max_lag).collect(),
        optimal_lag: select_optimal(&mi_values, mi_threshold),
        first_minimum_lag: first_local_minimum(&mi_values),
        mi_values,
        mi_threshold,
        bins,
        warnings,
    })
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Equal-width bin index per value; a constant series maps to bin 0.
fn discretize(data: &[f64], bins: usize) -> Vec<usize> {
    let lo = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = (hi - lo) / bins as f64;
    if !(width > 0.0) {
        return vec![0; data.len()];
    }
    data.iter().map(|x| (((x - lo) / width).floor() as usize).min(bins - 1)).collect()
}

/// Plug-in MI (nats) between `codes[t]` and `codes[t + k]`.
fn lagged_mi(codes: &[usize], k: usize, bins: usize) -> f64 {
    let m = codes.len() - k;
    let mut joint = vec![0usize; bins * bins];
    let mut px = vec![0usize; bins];
    let mut py = vec![0usize; bins];
    for t in 0..m {
        let (a, b) = (codes[t], codes[t + k]);
        joint[a * bins + b] += 1;
        px[a] += 1;
        py[b] += 1;
    }
    let mf = m as f64;
    let mut mi = 0.0;
    for a in 0..bins {
        for b in 0..bins {
            let c = joint[a * bins + b];
            if c == 0 {
                continue;
            }
            let pxy = c as f64 / mf;
            mi += pxy * (pxy * mf * mf / (px[a] as f64 * py[b] as f64)).ln();
        }
    }
    mi.max(0.0)
}

/// Largest MI strictly above `threshold`; earliest lag wins ties.
#[inline]
fn select_optimal(mi: &[f64], threshold: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in mi.iter().enumerate() {
        if v > threshold && best.map_or(true, |(_, b)| v > b) {
            best = Some((i + 1, v));
        }
    }
    best.map(|(lag, _)| lag)
}

#[inline]
fn first_local_minimum(mi: &[f64]) -> Option<usize> {
    (1..mi.len().saturating_sub(1))
        .find(|&i| mi[i] < mi[i - 1] && mi[i] < mi[i + 1])
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact MI on a deterministic two-state series.
    // - Constant series degrading to MI = 0 without error.
    // - Threshold behavior on independent noise vs a deterministic lag.
    // - Lag clamping, tie-breaking and the insufficient-data guard.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A two-state alternating series is fully predictable at every lag.
    //
    // Given
    // -----
    // - 101 values alternating 10/20 (odd lags see balanced pairs).
    //
    // Expect
    // ------
    // - MI(k) ≈ ln 2 for every lag, exactly ln 2 at lags 1 and 3, and
    //   optimal lag 1 (tie → smallest).
    fn mutual_information_alternating_series_is_ln2() {
        let y: Vec<f64> = (0..101).map(|t| if t % 2 == 0 { 10.0 } else { 20.0 }).collect();
        let mi = mutual_information(&y, 5, &MutualInformationOptions::default()).unwrap();
        for v in &mi.mi_values {
            assert_relative_eq!(*v, std::f64::consts::LN_2, epsilon = 1e-3);
        }
        assert_eq!(mi.mi_values[0], mi.mi_values[2]);
        assert_eq!(mi.optimal_lag, Some(1));
        assert_eq!(mi.lags, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    // Purpose
    // -------
    // Constant input degrades gracefully.
    //
    // Given
    // -----
    // - 50 copies of 3.0.
    //
    // Expect
    // ------
    // - All MI values are 0 and no optimal lag.
    fn mutual_information_constant_series_is_zero() {
        let mi = mutual_information(&[3.0; 50], 10, &MutualInformationOptions::default()).unwrap();
        assert!(mi.mi_values.iter().all(|v| *v == 0.0));
        assert_eq!(mi.optimal_lag, None);
    }

    #[test]
    // Purpose
    // -------
    // Independent noise mostly stays below threshold; a lag-3 moving-average
    // dependence is detected.
    //
    // Given
    // -----
    // - 2000 iid uniforms; and x_t = e_t + e_{t−3} built from 2003 uniforms.
    //
    // Expect
    // ------
    // - At most one noise lag above threshold; optimal lag 3 for the MA.
    fn mutual_information_threshold_separates_noise_from_dependence() {
        let mut rng = StdRng::seed_from_u64(17);
        let noise: Vec<f64> = (0..2000).map(|_| rng.gen::<f64>()).collect();
        let opts = MutualInformationOptions::default();
        let mi_noise = mutual_information(&noise, 5, &opts).unwrap();
        let above = mi_noise.mi_values.iter().filter(|v| **v > mi_noise.mi_threshold).count();
        assert!(above <= 1, "values {:?} threshold {}", mi_noise.mi_values, mi_noise.mi_threshold);

        let e: Vec<f64> = (0..2003).map(|_| rng.gen::<f64>()).collect();
        let ma: Vec<f64> = (3..2003).map(|t| e[t] + e[t - 3]).collect();
        let mi_ma = mutual_information(&ma, 5, &opts).unwrap();
        assert_eq!(mi_ma.optimal_lag, Some(3), "values {:?}", mi_ma.mi_values);
    }

    #[test]
    // Purpose
    // -------
    // The lag range honors the absolute cap and the pair minimum.
    //
    // Given
    // -----
    // - n = 200 with max_lags 50 (cap 30); n = 15 with max_lags 10.
    //
    // Expect
    // ------
    // - 30 lags without warning; 5 lags with a warning.
    fn mutual_information_lag_range_is_capped_and_clamped() {
        let y: Vec<f64> = (0..200).map(|t| (t as f64 * 0.37).sin()).collect();
        let mi = mutual_information(&y, 50, &MutualInformationOptions::default()).unwrap();
        assert_eq!(mi.lags.len(), 30);
        assert!(mi.warnings.is_empty());

        let short: Vec<f64> = (0..15).map(|t| (t as f64).sqrt()).collect();
        let mi = mutual_information(&short, 10, &MutualInformationOptions::default()).unwrap();
        assert_eq!(mi.lags.len(), 5);
        assert_eq!(mi.warnings.len(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Too-short series fail with required vs observed counts.
    //
    // Given
    // -----
    // - 8 values with min_pairs 10.
    //
    // Expect
    // ------
    // - `InsufficientData { required: 11, observed: 8 }`.
    fn mutual_information_short_series_is_insufficient() {
        let err = mutual_information(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 5, &MutualInformationOptions::default())
            .unwrap_err();
        assert_eq!(err, AnalysisError::insufficient(CONTEXT, 11, 8));
    }

    #[test]
    // Purpose
    // -------
    // Selection helpers break ties toward smaller lags.
    //
    // Given
    // -----
    // - MI curve [0.2, 0.5, 0.5, 0.1, 0.3] with threshold 0.25.
    //
    // Expect
    // ------
    // - optimal lag 2; first local minimum at lag 4.
    fn selection_helpers_tie_break_and_local_minimum() {
        let mi = [0.2, 0.5, 0.5, 0.1, 0.3];
        assert_eq!(select_optimal(&mi, 0.25), Some(2));
        assert_eq!(first_local_minimum(&mi), Some(4));
        assert_eq!(select_optimal(&mi, 0.9), None);
    }
}
