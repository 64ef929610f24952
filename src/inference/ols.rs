//! inference::ols — SVD least squares for the unit-root regressions.
//!
//! Purpose
//! -------
//! Fit the small auxiliary regressions behind the ADF and Phillips–Perron
//! statistics, returning coefficients, classical standard errors and the
//! residual sum of squares. Designs are assembled as `ndarray::Array2`
//! (rows = time, cols = regressors) and bridged into `nalgebra` for the
//! decomposition.
//!
//! Key behaviors
//! -------------
//! - Solve `y = Xβ + ε` through the thin SVD `X = U Σ Vᵀ`:
//!   `β̂ = V Σ⁻¹ Uᵀ y`, `Var(β̂_j) = σ̂² Σ_i (V_{ji}/s_i)²`.
//! - Reject numerically rank-deficient designs (condition ratio
//!   `s_min/s_max < RANK_TOL`) with `DegenerateSeries` rather than
//!   returning arbitrary coefficients.
//! - Floor the SSR at a caller-supplied value so that perfect fits keep a
//!   finite, strictly positive σ̂².
//!
//! Invariants & assumptions
//! ------------------------
//! - `design.nrows() == response.len()` and `nrows > ncols`; violations are
//!   reported as `InsufficientData`.
//! - Inputs are finite; callers validate the series beforehand.
//!
//! Downstream usage
//! ----------------
//! - `statistical_tests::stationarity::adf` fits every candidate lag order
//!   with [`ols_fit`] and compares them by AIC.
//! - `statistical_tests::stationarity::phillips_perron` uses the residuals
//!   for its long-run variance correction.
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;

use crate::errors::{AnalysisError, AnalysisResult};

/// Condition-ratio threshold below which a design is treated as singular.
pub const RANK_TOL: f64 = 1e-10;

/// OlsFit — coefficients and residual diagnostics of one regression.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Residual sum of squares after flooring.
    pub ssr: f64,
    /// `ssr / (nobs − k)`.
    pub sigma2: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `j` against `null`.
    pub fn t_stat(&self, j: usize, null: f64) -> f64 {
        (self.coefficients[j] - null) / self.std_errors[j]
    }

    /// Gaussian AIC, `n·ln(SSR/n) + 2k` (constants dropped).
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        n * (self.ssr / n).ln() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit ordinary least squares via a thin SVD.
///
/// Parameters
/// ----------
/// - `design`: `&Array2<f64>`
///   `n×k` regressor matrix.
/// - `response`: `&[f64]`
///   Length-`n` response.
/// - `ssr_floor`: `f64`
///   Lower bound applied to the residual sum of squares. Pass `0.0` for no
///   floor beyond `f64::MIN_POSITIVE`.
///
/// Returns
/// -------
/// `AnalysisResult<OlsFit>`
///
/// Errors
/// ------
/// - `InsufficientData` if `n ≤ k` or the shapes disagree.
/// - `DegenerateSeries` if the design is rank-deficient or the SVD factors
///   are unavailable.
pub fn ols_fit(design: &Array2<f64>, response: &[f64], ssr_floor: f64) -> AnalysisResult<OlsFit> {
    let (n, k) = design.dim();
    if n != response.len() || n <= k || k == 0 {
        return Err(AnalysisError::insufficient("ols", k + 1, n.min(response.len())));
    }

    let x = to_dmatrix(design);
    let y = DVector::from_column_slice(response);
    let svd = x.clone().svd(true, true);
    let s = &svd.singular_values;

    let s_max = s.iter().cloned().fold(0.0_f64, f64::max);
    let s_min = s.iter().cloned().fold(f64::INFINITY, f64::min);
    if !(s_max > 0.0) || s_min / s_max < RANK_TOL {
        return Err(AnalysisError::degenerate("ols", "rank-deficient design matrix"));
    }
    let (u, v_t) = match (&svd.u, &svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(AnalysisError::degenerate("ols", "SVD factors unavailable")),
    };

    let mut scaled = u.transpose() * &y;
    for i in 0..k {
        scaled[i] /= s[i];
    }
    let beta = v_t.transpose() * scaled;

    let fitted = &x * &beta;
    let residuals: Vec<f64> = (0..n).map(|t| y[t] - fitted[t]).collect();
    let raw_ssr: f64 = residuals.iter().map(|e| e * e).sum();
    let ssr = raw_ssr.max(ssr_floor).max(f64::MIN_POSITIVE);
    let sigma2 = ssr / (n - k) as f64;

    let std_errors = (0..k)
        .map(|j| {
            let var: f64 = (0..k).map(|i| (v_t[(i, j)] / s[i]).powi(2)).sum();
            (sigma2 * var).sqrt()
        })
        .collect();

    Ok(OlsFit { coefficients: beta.iter().cloned().collect(), std_errors, residuals, ssr, sigma2, nobs: n })
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Copy an `ndarray` matrix into a column-major `nalgebra` matrix.
#[inline]
fn to_dmatrix(design: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(design.nrows(), design.ncols(), |i, j| design[[i, j]])
}
