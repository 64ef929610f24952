//! profiling — data-quality profiler and descriptive statistics.
//!
//! Purpose
//! -------
//! Inspect every column of the input dataset before any time-series
//! statistics run: infer a type tag per column, count missing values,
//! outliers and duplicates, score overall quality, and summarize each
//! column for the report's `statistics` section.
//!
//! Key behaviors
//! -------------
//! - [`profile_dataset`] produces the [`DataQualityReport`] and the
//!   per-column [`ColumnProfile`]s.
//! - [`describe_dataset`] reuses those profiles to build
//!   [`DatasetStatistics`] (summaries plus a Pearson correlation matrix).
//!
//! Invariants & assumptions
//! ------------------------
//! - The profiler never fails on quality problems; it reports them. The
//!   only error is an empty dataset (zero rows or zero columns).
//! - All thresholds come from an explicit [`ProfilingOptions`] value.

pub mod quality;
pub mod statistics;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::quality::{profile_dataset, DataQualityReport, ProfilingOptions};
pub use self::statistics::{describe_dataset, ColumnStatistics, CorrelationMatrix, DatasetStatistics};
pub use self::types::{ColumnProfile, DataType};
