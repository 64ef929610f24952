//! stationarity::adf — augmented Dickey–Fuller test with AIC lag selection.
//!
//! Purpose
//! -------
//! Test the unit-root null `γ = 0` in
//! `Δy_t = α + γ y_{t−1} + Σ_{i=1}^{p} β_i Δy_{t−i} + ε_t`.
//!
//! Key behaviors
//! -------------
//! - The maximum augmentation is the Schwert rule `⌊12 (n/100)^{1/4}⌋`,
//!   capped at `n/2 − 2` so every candidate keeps residual degrees of
//!   freedom.
//! - Every `p ∈ 0..=maxlag` is fitted on the common sample of the largest
//!   lag and scored by AIC; rank-deficient candidates are skipped. The
//!   winner is refitted on its own full sample.
//! - The SSR is floored at `ε·TSS(Δy)` so exact fits give a very large
//!   (finite) statistic instead of a division by zero.
//!
//! Conventions
//! -----------
//! Rows are indexed by the position `i` of `Δy_i = y_{i+1} − y_i`; the
//! regression for lag `p` uses `i ∈ start..n−1` with `start ≥ p`.
use std::collections::BTreeMap;

use ndarray::Array2;

use crate::{
    errors::{AnalysisError, AnalysisResult},
    inference::{kernel::schwert_bandwidth, ols::ols_fit, ols::OlsFit},
    statistical_tests::{
        stationarity::mackinnon::{mackinnon_critical_values, mackinnon_p_value},
        validation::validate_variance,
    },
};

const CONTEXT: &str = "adf";

/// Minimum series length for the smallest (p = 0) regression.
pub const ADF_MIN_OBS: usize = 6;

/// AdfOutcome — statistic, inference and the selected augmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub critical_values: BTreeMap<String, f64>,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Run the ADF test with a constant and AIC-selected augmentation.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
/// - `max_lag`: `Option<usize>`
///   Upper bound for the lag search; `None` uses the Schwert rule. Always
///   capped at `n/2 − 2`.
///
/// Errors
/// ------
/// - `InsufficientData` when `n < ADF_MIN_OBS`.
/// - `DegenerateSeries` for a constant series or when no candidate
///   regression is full rank.
pub fn adf_test(data: &[f64], max_lag: Option<usize>) -> AnalysisResult<AdfOutcome> {
    validate_variance(data, ADF_MIN_OBS, CONTEXT)?;
    let n = data.len();
    let dy: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let max_lag = max_lag.unwrap_or_else(|| schwert_bandwidth(n)).min(n / 2 - 2);

    let mut best: Option<(usize, f64)> = None;
    for p in 0..=max_lag {
        let fit = match adf_regression(data, &dy, p, max_lag) {
            Ok(fit) => fit,
            Err(AnalysisError::DegenerateSeries { .. }) => continue,
            Err(e) => return Err(e),
        };
        let aic = fit.aic();
        if best.map_or(true, |(_, b)| aic < b) {
            best = Some((p, aic));
        }
    }
    let (used_lag, _) =
        best.ok_or_else(|| AnalysisError::degenerate(CONTEXT, "no full-rank ADF regression"))?;

    let fit = adf_regression(data, &dy, used_lag, used_lag)?;
    let statistic = fit.t_stat(1, 0.0);
    Ok(AdfOutcome {
        statistic,
        p_value: mackinnon_p_value(statistic),
        critical_values: mackinnon_critical_values(fit.nobs),
        used_lag,
        nobs: fit.nobs,
    })
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Fit the ADF regression with `p` lagged differences on rows `start..`.
fn adf_regression(y: &[f64], dy: &[f64], p: usize, start: usize) -> AnalysisResult<OlsFit> {
    let rows = dy.len() - start;
    let design = Array2::from_shape_fn((rows, 2 + p), |(r, c)| {
        let i = start + r;
        match c {
            0 => 1.0,
            1 => y[i],
            _ => dy[i - (c - 1)],
        }
    });
    let response = &dy[start..];
    let floor = f64::EPSILON * total_sum_of_squares(response);
    ols_fit(&design, response, floor)
}

#[inline]
fn total_sum_of_squares(v: &[f64]) -> f64 {
    let m = v.iter().sum::<f64>() / v.len() as f64;
    v.iter().map(|x| (x - m).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Rejection on a stationary AR(1) and non-rejection on random walks.
    // - Finite extreme statistics on an exactly periodic series.
    // - Lag bookkeeping and short-series failure.
    // -------------------------------------------------------------------------

    fn ar1(n: usize, phi: f64, rng: &mut StdRng) -> Vec<f64> {
        let mut y = vec![0.0; n];
        for t in 1..n {
            y[t] = phi * y[t - 1] + (rng.gen::<f64>() - 0.5);
        }
        y
    }

    #[test]
    // Purpose
    // -------
    // A strongly mean-reverting AR(1) is declared stationary.
    //
    // Given
    // -----
    // - 500 samples with φ = 0.5.
    //
    // Expect
    // ------
    // - statistic below the 5% value and p < 0.05, whatever augmentation
    //   AIC selects.
    fn adf_rejects_unit_root_on_ar1() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = adf_test(&ar1(500, 0.5, &mut rng), None).unwrap();
        assert!(out.statistic < out.critical_values["5%"], "stat {}", out.statistic);
        assert!(out.p_value < 0.05, "p {} at lag {}", out.p_value, out.used_lag);
        assert_eq!(out.nobs, 500 - 1 - out.used_lag);
    }

    #[test]
    // Purpose
    // -------
    // Pinning the augmentation at zero gives the plain Dickey–Fuller
    // regression, which rejects decisively on a mean-reverting AR(1).
    //
    // Given
    // -----
    // - The same AR(1) sample with `max_lag = Some(0)`.
    //
    // Expect
    // ------
    // - used_lag 0, nobs n − 1, statistic below the 1% value, p < 1e-6.
    fn adf_without_augmentation_rejects_strongly() {
        let mut rng = StdRng::seed_from_u64(3);
        let out = adf_test(&ar1(500, 0.5, &mut rng), Some(0)).unwrap();
        assert_eq!(out.used_lag, 0);
        assert_eq!(out.nobs, 499);
        assert!(out.statistic < out.critical_values["1%"], "stat {}", out.statistic);
        assert!(out.p_value < 1e-6, "p {}", out.p_value);
    }

    #[test]
    // Purpose
    // -------
    // Random walks mostly fail to reject.
    //
    // Given
    // -----
    // - 20 seeded random walks of length 300.
    //
    // Expect
    // ------
    // - At least 15 of 20 have p ≥ 0.05 (nominal rejection is 5%).
    fn adf_mostly_fails_to_reject_on_random_walks() {
        let mut rng = StdRng::seed_from_u64(11);
        let not_rejected = (0..20)
            .filter(|_| {
                let walk = ar1(300, 1.0, &mut rng);
                adf_test(&walk, None).unwrap().p_value >= 0.05
            })
            .count();
        assert!(not_rejected >= 15, "only {not_rejected}/20 not rejected");
    }

    #[test]
    // Purpose
    // -------
    // An exactly alternating series is an exact fit without augmentation.
    //
    // Given
    // -----
    // - 100 values alternating 10/20.
    //
    // Expect
    // ------
    // - Finite, extremely negative statistic; p = 0; lag 0 chosen because
    //   augmented designs are collinear.
    fn adf_alternating_series_gives_extreme_statistic() {
        let y: Vec<f64> = (0..100).map(|t| if t % 2 == 0 { 10.0 } else { 20.0 }).collect();
        let out = adf_test(&y, None).unwrap();
        assert!(out.statistic.is_finite() && out.statistic < -100.0, "stat {}", out.statistic);
        assert_eq!(out.p_value, 0.0);
        assert_eq!(out.used_lag, 0);
    }

    #[test]
    // Purpose
    // -------
    // Series below the minimum length fail cleanly.
    //
    // Given
    // -----
    // - 4 values.
    //
    // Expect
    // ------
    // - `InsufficientData { required: 6, observed: 4 }`.
    fn adf_short_series_is_insufficient() {
        assert_eq!(
            adf_test(&[1.0, 3.0, 2.0, 4.0], None),
            Err(AnalysisError::insufficient(CONTEXT, ADF_MIN_OBS, 4))
        );
    }
}
