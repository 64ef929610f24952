//! errors — crate-wide error taxonomy for the analysis engine.
//!
//! Purpose
//! -------
//! Provide a single error enum and result alias shared by the sampler,
//! profiler, statistical routines, orchestrator and worker pool. Each
//! variant carries the structured detail a caller needs to explain the
//! failure (offending column, required vs observed counts, stage that ran
//! out of time) without re-deriving it.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisError`] implements `Display` and `std::error::Error` so it
//!   composes with `?`.
//! - [`AnalysisError::kind`] maps every variant onto the flat
//!   [`ErrorKind`] taxonomy reported to consumers.
//! - [`AnalysisError::is_request_level`] separates failures that reject
//!   the whole request from failures that only invalidate one section.
//! - Serializes as an internally tagged object (`{"kind": "...", ...}`)
//!   so partial reports can embed per-section failures.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of domain constraints ("need at least
//!   10 observations, got 7") rather than low-level details.
//! - `context` fields name the routine that raised the error, e.g.
//!   `"hurst"` or `"mutual_information"`.

use serde::Serialize;

use crate::engine::cancel::Stage;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// AnalysisError — failure conditions raised anywhere in the engine.
///
/// Variants
/// --------
/// - `InvalidColumn { column, reason }`
///   Requested column missing, not coercible to numeric, or the dataset
///   itself is malformed around that column (ragged, duplicated name).
/// - `InsufficientData { context, required, observed }`
///   Fewer valid samples, scales, pairs or rows than the routine needs.
/// - `DegenerateSeries { context, reason }`
///   Zero variance or another mathematically undefined input.
/// - `ComputationTimeout { stage, elapsed_ms, budget_ms }`
///   Deadline expired or the job was cancelled; `stage` is the stage that
///   was about to start when the check fired.
/// - `Sampling { requested, available, reason }`
///   Requested sample size invalid for the available rows.
/// - `InvalidConfig { field, reason }`
///   A configuration value is out of range.
/// - `Overloaded { queue_depth }` / `PoolClosed`
///   Worker-pool admission failures.
/// - `Internal { reason }`
///   An analysis panicked on a pool worker; the worker survives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    //------ Request-level errors ------
    InvalidColumn { column: String, reason: String },
    Sampling { requested: usize, available: usize, reason: String },
    InvalidConfig { field: &'static str, reason: String },

    //------ Section-level errors ------
    InsufficientData { context: &'static str, required: usize, observed: usize },
    DegenerateSeries { context: &'static str, reason: String },

    //------ Execution errors ------
    ComputationTimeout { stage: Option<Stage>, elapsed_ms: u64, budget_ms: u64 },
    Overloaded { queue_depth: usize },
    PoolClosed,
    Internal { reason: String },
}

/// Flat taxonomy of [`AnalysisError`] variants, as reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidColumnError,
    InsufficientDataError,
    DegenerateSeriesError,
    ComputationTimeoutError,
    SamplingError,
    ConfigurationError,
    OverloadedError,
    PoolClosedError,
    InternalError,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidColumn { .. } => ErrorKind::InvalidColumnError,
            AnalysisError::Sampling { .. } => ErrorKind::SamplingError,
            AnalysisError::InvalidConfig { .. } => ErrorKind::ConfigurationError,
            AnalysisError::InsufficientData { .. } => ErrorKind::InsufficientDataError,
            AnalysisError::DegenerateSeries { .. } => ErrorKind::DegenerateSeriesError,
            AnalysisError::ComputationTimeout { .. } => ErrorKind::ComputationTimeoutError,
            AnalysisError::Overloaded { .. } => ErrorKind::OverloadedError,
            AnalysisError::PoolClosed => ErrorKind::PoolClosedError,
            AnalysisError::Internal { .. } => ErrorKind::InternalError,
        }
    }

    /// `true` when the error rejects the whole request rather than one
    /// report section.
    pub fn is_request_level(&self) -> bool {
        !matches!(
            self,
            AnalysisError::InsufficientData { .. } | AnalysisError::DegenerateSeries { .. }
        )
    }

    pub(crate) fn insufficient(context: &'static str, required: usize, observed: usize) -> Self {
        AnalysisError::InsufficientData { context, required, observed }
    }

    pub(crate) fn degenerate(context: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::DegenerateSeries { context, reason: reason.into() }
    }
}

impl std::error::Error for AnalysisError {}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::InvalidColumn { column, reason } => {
                write!(f, "Invalid column '{column}': {reason}")
            }
            AnalysisError::Sampling { requested, available, reason } => {
                write!(
                    f,
                    "Invalid sample size {requested} for {available} available rows: {reason}"
                )
            }
            AnalysisError::InvalidConfig { field, reason } => {
                write!(f, "Invalid configuration value for '{field}': {reason}")
            }
            AnalysisError::InsufficientData { context, required, observed } => {
                write!(f, "{context}: need at least {required} observations, got {observed}")
            }
            AnalysisError::DegenerateSeries { context, reason } => {
                write!(f, "{context}: degenerate series ({reason})")
            }
            AnalysisError::ComputationTimeout { stage, elapsed_ms, budget_ms } => match stage {
                Some(stage) => write!(
                    f,
                    "Computation exceeded its {budget_ms} ms budget before stage {stage:?} \
                     (elapsed {elapsed_ms} ms)"
                ),
                None => write!(
                    f,
                    "Computation exceeded its {budget_ms} ms budget (elapsed {elapsed_ms} ms)"
                ),
            },
            AnalysisError::Overloaded { queue_depth } => {
                write!(f, "Analysis queue is full (depth {queue_depth}); request rejected")
            }
            AnalysisError::PoolClosed => write!(f, "Analysis pool has been shut down"),
            AnalysisError::Internal { reason } => write!(f, "Analysis aborted unexpectedly: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `Display` payload embedding for the structured variants.
    // - The request-level vs section-level split.
    // - The serde tag layout used inside partial reports.
    //
    // They intentionally DO NOT cover:
    // - Propagation through the orchestrator (see engine tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `InsufficientData` reports both required and observed
    // counts.
    //
    // Given
    // -----
    // - An `InsufficientData` error with required = 10, observed = 7.
    //
    // Expect
    // ------
    // - The message contains "10" and "7".
    fn insufficient_data_display_includes_counts() {
        // Arrange
        let err = AnalysisError::insufficient("sampler", 10, 7);

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("10") && msg.contains("7"), "Got: {msg}");
        assert_eq!(err.kind(), ErrorKind::InsufficientDataError);
    }

    #[test]
    // Purpose
    // -------
    // Ensure only data-shape failures are treated as section-level.
    //
    // Given
    // -----
    // - One error of each family.
    //
    // Expect
    // ------
    // - InvalidColumn, Sampling and ComputationTimeout are request-level;
    //   InsufficientData and DegenerateSeries are not.
    fn request_level_split_matches_failure_policy() {
        // Arrange
        let column = AnalysisError::InvalidColumn { column: "y".into(), reason: "missing".into() };
        let sampling =
            AnalysisError::Sampling { requested: 0, available: 5, reason: "zero".into() };
        let timeout =
            AnalysisError::ComputationTimeout { stage: None, elapsed_ms: 10, budget_ms: 5 };
        let short = AnalysisError::insufficient("hurst", 4, 2);
        let flat = AnalysisError::degenerate("acf", "zero variance");

        // Act / Assert
        assert!(column.is_request_level());
        assert!(sampling.is_request_level());
        assert!(timeout.is_request_level());
        assert!(!short.is_request_level());
        assert!(!flat.is_request_level());
    }

    #[test]
    // Purpose
    // -------
    // Check the serialized layout embedded in partial reports.
    //
    // Given
    // -----
    // - A `DegenerateSeries` error.
    //
    // Expect
    // ------
    // - JSON carries `"kind":"degenerate_series"` and the context.
    fn degenerate_series_serializes_with_kind_tag() {
        // Arrange
        let err = AnalysisError::degenerate("autocorrelation", "zero variance");

        // Act
        let json = serde_json::to_string(&err).unwrap();

        // Assert
        assert!(json.contains("\"kind\":\"degenerate_series\""), "Got: {json}");
        assert!(json.contains("autocorrelation"), "Got: {json}");
    }
}
