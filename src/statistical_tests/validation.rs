//! statistical_tests::validation — shared input guards for the routines.
//!
//! Purpose
//! -------
//! Centralize the basic checks every statistical routine performs before
//! touching its input: minimum length, finiteness, non-zero variance, and
//! lag clamping. This keeps error semantics identical across ACF, PACF,
//! MI, Hurst, stationarity and seasonality.
//!
//! Key behaviors
//! -------------
//! - [`validate_series`] enforces length and finiteness.
//! - [`validate_variance`] additionally rejects constant series and
//!   returns the population variance for reuse.
//! - [`clamp_lags`] bounds a requested lag count by the series length and
//!   records a warning instead of failing.
//!
//! Conventions
//! -----------
//! - `context` is the routine name and is embedded in the error so callers
//!   can tell which section failed.
//! - Non-finite values are reported as `DegenerateSeries`; the sampler
//!   already removes them, so hitting this branch means a caller bypassed
//!   the sampler.

use crate::{
    errors::{AnalysisError, AnalysisResult},
    utils::population_variance,
};

/// Relative variance floor below which a series is treated as constant.
pub const VARIANCE_TOL: f64 = 1e-12;

/// Validate length and finiteness of a series.
///
/// Errors
/// ------
/// - `InsufficientData { context, required: min_len, observed }` when the
///   series is too short.
/// - `DegenerateSeries` when any value is NaN or ±∞.
pub fn validate_series(data: &[f64], min_len: usize, context: &'static str) -> AnalysisResult<()> {
    if data.len() < min_len {
        return Err(AnalysisError::insufficient(context, min_len, data.len()));
    }
    if let Some((i, v)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(AnalysisError::degenerate(context, format!("non-finite value {v} at index {i}")));
    }
    Ok(())
}

/// Validate a series and return its population variance.
///
/// Errors
/// ------
/// - Everything [`validate_series`] returns.
/// - `DegenerateSeries` when the variance is zero relative to the data
///   scale (`var ≤ VARIANCE_TOL · max(1, mean²)`).
pub fn validate_variance(data: &[f64], min_len: usize, context: &'static str) -> AnalysisResult<f64> {
    validate_series(data, min_len, context)?;
    let var = population_variance(data);
    let mean = crate::utils::mean(data);
    if !(var > VARIANCE_TOL * mean.powi(2).max(1.0)) {
        return Err(AnalysisError::degenerate(context, "zero variance"));
    }
    Ok(var)
}

/// Clamp a requested lag count to `limit`, recording a warning.
///
/// Returns `min(requested, limit)`; pushes a message onto `warnings` when
/// clamping occurred.
pub fn clamp_lags(requested: usize, limit: usize, reason: &str, warnings: &mut Vec<String>) -> usize {
    if requested > limit {
        warnings.push(format!("max_lags {requested} {reason}; clamped to {limit}"));
        limit
    } else {
        requested
    }
}
