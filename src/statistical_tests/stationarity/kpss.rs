//! stationarity::kpss — KPSS level-stationarity test.
//!
//! Null hypothesis: the series is stationary around a constant level. The
//! statistic is `η / λ̂²` with `η = Σ S_t² / n²` over the partial sums of
//! the demeaned series and `λ̂²` its kernel long-run variance. Critical
//! values come from Kwiatkowski et al. (1992), Table 1; p-values are
//! linearly interpolated in that table and therefore clamped to
//! `[0.01, 0.10]`.
use std::collections::BTreeMap;

use crate::{
    errors::AnalysisResult,
    inference::kernel::{long_run_variance, LongRunVarianceOptions},
    statistical_tests::validation::validate_variance,
    utils::demean,
};

const CONTEXT: &str = "kpss";

/// `(label, p, critical value)` in increasing critical-value order.
const KPSS_TABLE: [(&str, f64, f64); 4] =
    [("10%", 0.10, 0.347), ("5%", 0.05, 0.463), ("2.5%", 0.025, 0.574), ("1%", 0.01, 0.739)];

/// KpssOutcome — statistic, interpolated p-value and bandwidth used.
#[derive(Debug, Clone, PartialEq)]
pub struct KpssOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub critical_values: BTreeMap<String, f64>,
    pub lags: usize,
}

/// Run the level KPSS test.
///
/// Errors
/// ------
/// - `InsufficientData` for fewer than 3 observations.
/// - `DegenerateSeries` for a constant series or a non-positive long-run
///   variance.
pub fn kpss_test(data: &[f64], lrv: &LongRunVarianceOptions) -> AnalysisResult<KpssOutcome> {
    validate_variance(data, 3, CONTEXT)?;
    let n = data.len() as f64;
    let resid = demean(data);

    let mut partial = 0.0;
    let eta = resid
        .iter()
        .map(|e| {
            partial += e;
            partial * partial
        })
        .sum::<f64>()
        / (n * n);
    let (lambda2, lags) = long_run_variance(&resid, lrv)?;
    let statistic = eta / lambda2;

    Ok(KpssOutcome {
        statistic,
        p_value: kpss_p_value(statistic),
        critical_values: kpss_critical_values(),
        lags,
    })
}

pub fn kpss_critical_values() -> BTreeMap<String, f64> {
    KPSS_TABLE.iter().map(|(label, _, cv)| (label.to_string(), *cv)).collect()
}

/// Interpolated p-value, clamped to the table's `[0.01, 0.10]` range.
pub fn kpss_p_value(stat: f64) -> f64 {
    let (first, last) = (KPSS_TABLE[0], KPSS_TABLE[KPSS_TABLE.len() - 1]);
    if stat <= first.2 {
        return first.1;
    }
    if stat >= last.2 {
        return last.1;
    }
    KPSS_TABLE
        .windows(2)
        .find(|w| stat <= w[1].2)
        .map(|w| {
            let frac = (stat - w[0].2) / (w[1].2 - w[0].2);
            w[0].1 + frac * (w[1].1 - w[0].1)
        })
        .unwrap_or(last.1)
}
