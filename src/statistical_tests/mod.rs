//! statistical_tests — correlograms, dependence, stationarity and seasonality.
//!
//! Purpose
//! -------
//! Host the numerical routines that turn a sampled target series into the
//! analysis sections of a report. Each routine is a pure function of
//! `(&[f64], options)` returning `AnalysisResult<...Result>`.
//!
//! Key behaviors
//! -------------
//! - [`acf`] / [`pacf`]: sample autocorrelation with Ljung–Box and
//!   Durbin–Levinson partial autocorrelation, sharing the `±z/√n` band.
//! - [`mutual_information`]: lagged plug-in MI with a G-test threshold.
//! - [`hurst`]: rescaled-range Hurst exponent.
//! - [`stationarity`]: ADF, KPSS and Phillips–Perron with independent
//!   verdicts.
//! - [`seasonality`] / [`decomposition`]: periodogram peaks and classical
//!   additive decomposition.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; every routine re-validates through [`validation`]
//!   and reports `InsufficientData` / `DegenerateSeries` instead of
//!   returning NaN-filled results.
//! - Routines never log. Recoverable oddities (lag clamping, truncated
//!   recursions, skipped mirror tests) are returned as `warnings` inside
//!   the result.
//!
//! Conventions
//! -----------
//! - Options structs implement `Default` with the documented constants and
//!   deserialize with `#[serde(default)]`, so a partial JSON config only
//!   overrides what it names.
//! - Aligned output vectors (`lags`/`values`/`confidence_intervals`,
//!   `scales`/`rs_values`, `seasonal_periods`/`seasonal_strengths`) always
//!   have equal length.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each routine and use seeded `StdRng` series.
//! - End-to-end behavior is exercised in
//!   `tests/integration_analysis_pipeline.rs`.

pub mod acf;
pub mod decomposition;
pub mod hurst;
pub mod mutual_information;
pub mod pacf;
pub mod seasonality;
pub mod stationarity;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::acf::{autocorrelation, AutocorrelationResult, CorrelogramOptions};
pub use self::decomposition::{decompose, SeasonalDecomposition};
pub use self::hurst::{hurst_exponent, HurstOptions, HurstResult, Interpretation};
pub use self::mutual_information::{mutual_information, MutualInformationOptions, MutualInformationResult};
pub use self::pacf::{partial_autocorrelation, PartialAutocorrelationResult};
pub use self::seasonality::{detect_seasonality, FourierPeak, SeasonalityOptions, SeasonalityResult};
pub use self::stationarity::{
    run_stationarity_tests, SignificanceLevel, StationarityOptions, StationarityResult,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use ts_diagnostics::statistical_tests::prelude::*;
//
// to import the routines and their result types in a single line.

pub mod prelude {
    pub use super::acf::{autocorrelation, AutocorrelationResult, CorrelogramOptions};
    pub use super::hurst::{hurst_exponent, HurstOptions, HurstResult};
    pub use super::mutual_information::{mutual_information, MutualInformationOptions, MutualInformationResult};
    pub use super::pacf::{partial_autocorrelation, PartialAutocorrelationResult};
    pub use super::seasonality::{detect_seasonality, SeasonalityOptions, SeasonalityResult};
    pub use super::stationarity::{run_stationarity_tests, StationarityOptions, StationarityResult};
}
