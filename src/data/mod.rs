//! data — input model, analysis request and the sampler/loader stage.
//!
//! Purpose
//! -------
//! Hold everything that happens before any statistics are computed: the
//! loosely typed [`Dataset`] supplied by the caller, the
//! [`AnalysisRequest`] naming what to analyze, and [`load_series`], which
//! resolves the request into a clean, deterministically sampled
//! [`SampledSeries`].
//!
//! Conventions
//! -----------
//! - Failures here are request-level: the orchestrator aborts the whole
//!   run when [`load_series`] or [`AnalysisRequest::validate`] fails.
//! - Row order is preserved end to end.

pub mod dataset;
pub mod request;
pub mod sampler;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::dataset::{Cell, Column, Dataset};
pub use self::request::AnalysisRequest;
pub use self::sampler::{load_series, SampledSeries, SamplingOptions, SamplingStrategy};
