//! Kernel taps, bandwidth rules and long-run variance for stationarity tests.
//!
//! This module provides:
//! - A `KernelType` enum with common HAC tapers (IID, Bartlett/Newey–West, Parzen, QS).
//! - Per-lag weights `w(x)` where `x = k/(L+1)`.
//! - The Schwert rule-of-thumb bandwidth `⌊12 (n/100)^{1/4}⌋` used by KPSS and
//!   Phillips–Perron.
//! - `long_run_variance`, the scalar analogue of a HAC covariance:
//!   `λ² = γ₀ + 2 Σ_{k=1}^{L} w_k γ_k`.
//!
//! Conventions:
//! - Input residuals are expected to be mean-zero already (KPSS demeans, the
//!   PP regression residuals are mean-zero by construction). No centering is
//!   applied here.
//! - `γ_k` uses `1/n` scaling unless `small_sample_correction` is set, in which
//!   case `1/(n − k)` is used.
use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, AnalysisResult};

/// HAC taper family.
///
/// - `IID`: no serial correlation; only `k=0` contributes (weight=1 at 0, else 0).
/// - `Bartlett`: triangular (Newey–West) kernel, compact support on |x|≤1.
///   Guarantees a non-negative long-run variance.
/// - `Parzen`: smoother compact-support kernel with heavier down-weighting at high lags.
/// - `QuadraticSpectral`: infinite-support taper with high large-sample efficiency.
///
/// The taper argument is taken as `x = k/(L+1)` to avoid divide-by-zero at `k=L`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelType {
    IID,
    Bartlett,
    Parzen,
    QuadraticSpectral,
}

impl KernelType {
    /// Evaluate the kernel weight at the given taper argument.
    ///
    /// # Arguments
    /// - `input`: real number, typically `x = k/(L+1)` where `k` is the lag and `L` the bandwidth.
    ///
    /// # Returns
    /// Kernel value `w(x)`. For `IID`, returns 1.0 at `x=0` and 0.0 otherwise.
    pub fn weight(&self, input: f64) -> f64 {
        let abs_input = input.abs();
        match self {
            KernelType::IID => {
                if input == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            KernelType::Bartlett => (1.0 - abs_input).max(0.0),
            KernelType::Parzen => {
                if abs_input <= 0.5 {
                    let sq = abs_input * abs_input;
                    1.0 - 6.0 * sq + 6.0 * abs_input * sq
                } else if abs_input <= 1.0 {
                    2.0 * (1.0 - abs_input).powi(3)
                } else {
                    0.0
                }
            }
            KernelType::QuadraticSpectral => {
                if input == 0.0 {
                    return 1.0;
                }
                let pi_x = std::f64::consts::PI * input;
                let arg = 6.0 * pi_x / 5.0;
                (25.0 / (12.0 * pi_x * pi_x)) * (arg.sin() / arg - arg.cos())
            }
        }
    }

    /// Whether the kernel has compact support on `|x| ≤ 1`.
    ///
    /// Compact kernels only need lags `1..=L`; the QS taper is truncated at
    /// `n − 1` instead.
    pub fn is_truncated(&self) -> bool {
        !matches!(self, KernelType::QuadraticSpectral)
    }
}

/// LongRunVarianceOptions — kernel and bandwidth policy for `λ̂²`.
///
/// Fields
/// ------
/// - `kernel`: [`KernelType`]
///   Taper family used for the lag weights. Defaults to `Bartlett`, the
///   textbook choice for KPSS and Phillips–Perron.
/// - `bandwidth`: `Option<usize>`
///   Fixed bandwidth `L`. `None` selects [`schwert_bandwidth`] at compute
///   time. Always truncated to `n − 1`.
/// - `small_sample_correction`: `bool`
///   Use `1/(n − k)` instead of `1/n` for each autocovariance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongRunVarianceOptions {
    pub kernel: KernelType,
    pub bandwidth: Option<usize>,
    pub small_sample_correction: bool,
}

impl LongRunVarianceOptions {
    pub fn new(kernel: KernelType, bandwidth: Option<usize>, small_sample_correction: bool) -> Self {
        LongRunVarianceOptions { kernel, bandwidth, small_sample_correction }
    }

    /// Resolve the effective bandwidth for a sample of length `n`.
    pub fn resolve_bandwidth(&self, n: usize) -> usize {
        let lag = match self.kernel {
            KernelType::IID => 0,
            _ => self.bandwidth.unwrap_or_else(|| schwert_bandwidth(n)),
        };
        lag.min(n.saturating_sub(1))
    }
}

impl Default for LongRunVarianceOptions {
    fn default() -> Self {
        LongRunVarianceOptions::new(KernelType::Bartlett, None, false)
    }
}

/// Schwert (1989) rule-of-thumb lag length `⌊12 (n/100)^{1/4}⌋`.
///
/// Shared by the KPSS bandwidth and the ADF maximum lag search.
pub fn schwert_bandwidth(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

/// Scalar long-run variance `λ̂² = γ̂₀ + 2 Σ_{k=1}^{L} w(k/(L+1)) γ̂_k`.
///
/// Parameters
/// ----------
/// - `residuals`: `&[f64]`
///   Mean-zero series (KPSS residuals or PP regression residuals).
/// - `options`: `&LongRunVarianceOptions`
///   Kernel and bandwidth policy.
///
/// Returns
/// -------
/// `AnalysisResult<(f64, usize)>`
///   The long-run variance and the bandwidth actually used.
///
/// Errors
/// ------
/// - `InsufficientData` when `residuals` has fewer than 2 elements.
/// - `DegenerateSeries` when the estimate is not strictly positive and
///   finite (e.g., all-zero residuals or a non-Bartlett kernel driving the
///   sum negative).
pub fn long_run_variance(
    residuals: &[f64], options: &LongRunVarianceOptions,
) -> AnalysisResult<(f64, usize)> {
    let n = residuals.len();
    if n < 2 {
        return Err(AnalysisError::insufficient("long_run_variance", 2, n));
    }
    let bandwidth = options.resolve_bandwidth(n);
    let max_lag = if options.kernel.is_truncated() { bandwidth } else { n - 1 };

    let mut lrv = autocovariance(residuals, 0, false);
    if bandwidth > 0 {
        for k in 1..=max_lag {
            let w = options.kernel.weight(k as f64 / (bandwidth as f64 + 1.0));
            if w == 0.0 {
                continue;
            }
            lrv += 2.0 * w * autocovariance(residuals, k, options.small_sample_correction);
        }
    }

    if !lrv.is_finite() || lrv <= 0.0 {
        return Err(AnalysisError::degenerate(
            "long_run_variance",
            format!("non-positive long-run variance {lrv:e}"),
        ));
    }
    Ok((lrv, bandwidth))
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Lag-`k` autocovariance of a mean-zero series, `1/n` or `1/(n − k)` scaled.
#[inline]
fn autocovariance(data: &[f64], k: usize, small_sample: bool) -> f64 {
    let n = data.len();
    let sum: f64 = data[k..].iter().zip(data).map(|(a, b)| a * b).sum();
    let denom = if small_sample { n - k } else { n };
    sum / denom as f64
}
