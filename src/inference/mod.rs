//! inference — regression and long-run variance primitives.
//!
//! Purpose
//! -------
//! Provide the estimation building blocks shared by the stationarity
//! battery: ordinary least squares with standard errors, and kernel-based
//! long-run variance estimation.
//!
//! Key behaviors
//! -------------
//! - [`ols_fit`] solves least squares through a thin SVD (nalgebra),
//!   rejects rank-deficient designs, and reports coefficients, standard
//!   errors, residuals and an AIC.
//! - [`long_run_variance`] computes `λ̂² = γ̂₀ + 2 Σ w(k/(L+1)) γ̂_k` for the
//!   [`KernelType`] families, with the Schwert rule-of-thumb bandwidth as
//!   the default.
//!
//! Invariants & assumptions
//! ------------------------
//! - Design matrices are `n × k` `ndarray::Array2<f64>` in row-major
//!   observation order; responses are plain slices.
//! - Long-run variance inputs are mean-zero residual series.
//! - Failures surface as `AnalysisError::DegenerateSeries` or
//!   `InsufficientData`; nothing here panics on bad input.
//!
//! Downstream usage
//! ----------------
//! - `statistical_tests::stationarity::{adf, phillips_perron}` call
//!   [`ols_fit`]; KPSS and PP call [`long_run_variance`].

pub mod kernel;
pub mod ols;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::kernel::{long_run_variance, schwert_bandwidth, KernelType, LongRunVarianceOptions};
pub use self::ols::{ols_fit, OlsFit};
