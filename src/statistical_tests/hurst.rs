//! statistical_tests::hurst — rescaled-range (R/S) Hurst exponent.
//!
//! Purpose
//! -------
//! Estimate long-range dependence by regressing the average rescaled range
//! of non-overlapping windows on the window size, in log-log space.
//!
//! Key behaviors
//! -------------
//! - Window sizes are powers of two starting at `min_scale` and not
//!   exceeding `n/4`, so every scale has at least four windows.
//! - Per window: demean, cumulate, `R = max − min` of the cumulative path,
//!   `S` = population standard deviation. Windows with `S = 0` are skipped;
//!   a scale with no usable window is dropped.
//! - `H` is the OLS slope of `log10(R/S)` on `log10(scale)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `scales` and `rs_values` are aligned and strictly increasing in scale.
//! - `hurst_exponent == regression_slope`; `0 ≤ r_squared ≤ 1`.
//! - R/S is applied to the series as given. For a random walk this means
//!   the increments should be passed to obtain `H ≈ 0.5`; levels give
//!   `H ≈ 1`.
//!
//! Testing notes
//! -------------
//! Small-sample R/S is biased upward (Anis–Lloyd), so iid-noise tests use
//! a tolerant band rather than `0.5 ± ε`.
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AnalysisError, AnalysisResult},
    statistical_tests::validation::validate_variance,
    utils::simple_regression,
};

const CONTEXT: &str = "hurst";

/// Qualitative reading of the Hurst exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpretation {
    RandomWalk,
    Trending,
    MeanReverting,
}

impl Interpretation {
    /// Classify `h` with a symmetric band of half-width `band` around 0.5.
    pub fn classify(h: f64, band: f64) -> Self {
        if (h - 0.5).abs() <= band {
            Interpretation::RandomWalk
        } else if h > 0.5 {
            Interpretation::Trending
        } else {
            Interpretation::MeanReverting
        }
    }
}

/// HurstOptions — scale grid and interpretation band.
///
/// Fields
/// ------
/// - `min_scale`: smallest window size (4).
/// - `min_scales`: minimum number of usable scales for the regression (4).
/// - `random_walk_band`: `|H − 0.5|` below which the series reads as a
///   random walk (0.05).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HurstOptions {
    pub min_scale: usize,
    pub min_scales: usize,
    pub random_walk_band: f64,
}

impl HurstOptions {
    pub fn new(min_scale: usize, min_scales: usize, random_walk_band: f64) -> Self {
        HurstOptions { min_scale, min_scales, random_walk_band }
    }

    /// Powers-of-two window sizes for a series of length `n`.
    pub fn scales(&self, n: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut s = self.min_scale.max(2);
        while s <= n / 4 {
            out.push(s);
            s *= 2;
        }
        out
    }
}

impl Default for HurstOptions {
    fn default() -> Self {
        HurstOptions::new(4, 4, 0.05)
    }
}

/// HurstResult — R/S curve and fitted exponent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HurstResult {
    pub hurst_exponent: f64,
    pub scales: Vec<usize>,
    pub rs_values: Vec<f64>,
    pub regression_slope: f64,
    pub regression_intercept: f64,
    pub r_squared: f64,
    pub interpretation: Interpretation,
}

/// Estimate the Hurst exponent with rescaled-range analysis.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
///   Series to analyse (increments for a random-walk reading).
/// - `options`: `&HurstOptions`
///
/// Returns
/// -------
/// `AnalysisResult<HurstResult>`
///
/// Errors
/// ------
/// - `DegenerateSeries` for a constant or non-finite series.
/// - `InsufficientData` when fewer than `min_scales` scales survive
///   (`observed` is the number of usable scales).
pub fn hurst_exponent(data: &[f64], options: &HurstOptions) -> AnalysisResult<HurstResult> {
    validate_variance(data, 2, CONTEXT)?;

    let mut scales = Vec::new();
    let mut rs_values = Vec::new();
    for scale in options.scales(data.len()) {
        if let Some(rs) = mean_rescaled_range(data, scale) {
            scales.push(scale);
            rs_values.push(rs);
        }
    }
    if scales.len() < options.min_scales {
        return Err(AnalysisError::insufficient(CONTEXT, options.min_scales, scales.len()));
    }

    let log_s: Vec<f64> = scales.iter().map(|&s| (s as f64).log10()).collect();
    let log_rs: Vec<f64> = rs_values.iter().map(|rs| rs.log10()).collect();
    let fit = simple_regression(&log_s, &log_rs)
        .ok_or_else(|| AnalysisError::degenerate(CONTEXT, "log-scale regression undefined"))?;

    Ok(HurstResult {
        hurst_exponent: fit.slope,
        scales,
        rs_values,
        regression_slope: fit.slope,
        regression_intercept: fit.intercept,
        r_squared: fit.r_squared,
        interpretation: Interpretation::classify(fit.slope, options.random_walk_band),
    })
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Average R/S over the non-overlapping windows of size `scale`; `None` if
/// every window is flat.
fn mean_rescaled_range(data: &[f64], scale: usize) -> Option<f64> {
    let (sum, count) = data
        .chunks_exact(scale)
        .filter_map(window_rescaled_range)
        .fold((0.0, 0usize), |(s, c), rs| (s + rs, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// R/S of one window, `None` when its standard deviation is zero.
#[inline]
fn window_rescaled_range(window: &[f64]) -> Option<f64> {
    let m = window.iter().sum::<f64>() / window.len() as f64;
    let (mut cum, mut lo, mut hi, mut ss) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    for x in window {
        let d = x - m;
        cum += d;
        lo = lo.min(cum);
        hi = hi.max(cum);
        ss += d * d;
    }
    let s = (ss / window.len() as f64).sqrt();
    (s > 0.0).then(|| (hi - lo) / s)
}
