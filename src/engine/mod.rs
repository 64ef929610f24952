//! engine — orchestration, configuration, cancellation and concurrency.
//!
//! Purpose
//! -------
//! Turn a `(Dataset, AnalysisRequest, AnalysisConfig)` triple into a
//! [`CompleteAnalysisReport`], either inline through [`run_analysis`] or on
//! a bounded worker pool through [`AnalysisPool`].
//!
//! Key behaviors
//! -------------
//! - [`config`]: serde-backed [`AnalysisConfig`] / [`PoolConfig`] with
//!   validation.
//! - [`cancel`]: [`CancelToken`] (shared flag + deadline) and the
//!   [`Stage`] enumeration checked between pipeline stages.
//! - [`orchestrator`]: stage sequencing and the partial-failure policy.
//! - [`report`]: the report and per-section [`SectionOutcome`].
//! - [`pool`]: load-shedding worker pool and [`JobHandle`].
//! - [`cache`]: optional content-addressed [`ReportCache`].
//!
//! Downstream usage
//! ----------------
//! - Single-threaded callers use [`run_analysis`] with
//!   `CancelToken::unbounded()` or `CancelToken::with_timeout(..)`.
//! - Services construct one [`AnalysisPool`] and share datasets through
//!   `Arc` across submissions.

pub mod cache;
pub mod cancel;
pub mod config;
pub mod orchestrator;
pub mod pool;
pub mod report;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::cache::{CacheKey, ReportCache};
pub use self::cancel::{CancelToken, Stage};
pub use self::config::{AnalysisConfig, PoolConfig};
pub use self::orchestrator::run_analysis;
pub use self::pool::{AnalysisPool, JobHandle};
pub use self::report::{CompleteAnalysisReport, SectionOutcome, SeriesSummary};
