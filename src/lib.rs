//! ts_diagnostics — statistical diagnostics for univariate time series.
//!
//! Purpose
//! -------
//! Take a tabular dataset and a request naming one numeric target column
//! and produce a single [`engine::CompleteAnalysisReport`]: data quality,
//! descriptive statistics, ACF/PACF correlograms, lagged mutual
//! information, the Hurst exponent, ADF/KPSS/Phillips–Perron stationarity
//! tests and FFT-based seasonality detection.
//!
//! Key behaviors
//! -------------
//! - [`data`] holds the dataset model, the request and the sampler that
//!   turns a column into a clean `f64` series.
//! - [`profiling`] scores column quality and summarizes the dataset.
//! - [`statistical_tests`] hosts the pure, deterministic analysis kernels.
//! - [`inference`] supplies the shared OLS and long-run variance machinery
//!   used by the unit-root tests.
//! - [`engine`] sequences everything, applies deadlines and cancellation,
//!   and optionally runs requests on a bounded worker pool.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every public routine returns [`errors::AnalysisResult`]; library code
//!   does not panic on bad input.
//! - Given identical inputs and configuration, every report field except
//!   the timestamp and the wall-time measurement is identical.
//!
//! Conventions
//! -----------
//! - Lags are 1-based in results; index `k − 1` holds lag `k`.
//! - Diagnostics are emitted through `tracing`; installing a subscriber is
//!   the caller's choice.
//!
//! Downstream usage
//! ----------------
//! - Most callers need [`engine::run_analysis`] (or [`engine::AnalysisPool`]
//!   for concurrent workloads) plus the types in [`prelude`].
//! - The individual kernels in [`statistical_tests`] are usable on plain
//!   `&[f64]` slices without building a dataset.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each kernel; `tests/` exercises the full
//!   pipeline and the worker pool.

pub mod data;
pub mod engine;
pub mod errors;
pub mod inference;
pub mod profiling;
pub mod statistical_tests;
pub mod utils;

/// Types needed for the common "build a dataset, run a report" path.
pub mod prelude {
    pub use crate::data::{AnalysisRequest, Cell, Column, Dataset, SamplingOptions, SamplingStrategy};
    pub use crate::engine::{
        run_analysis, AnalysisConfig, AnalysisPool, CancelToken, CompleteAnalysisReport, JobHandle,
        PoolConfig, ReportCache, SectionOutcome,
    };
    pub use crate::errors::{AnalysisError, AnalysisResult};
}
