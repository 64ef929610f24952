//! engine::report — the complete analysis report and per-section outcomes.
//!
//! Purpose
//! -------
//! Define the serializable output of one analysis run. Statistical sections
//! are wrapped in [`SectionOutcome`] so a failing section (too short for
//! Hurst, constant for seasonality, ...) is reported in place instead of
//! discarding the rest of the report.
//!
//! Conventions
//! -----------
//! - Sections serialize adjacently tagged:
//!   `{"status": "computed", "result": {...}}` or
//!   `{"status": "failed", "result": {"error": {"kind": ..., ...}}}`.
//! - `analysis_timestamp` is RFC 3339 UTC; `computation_time_seconds` is
//!   wall time measured by the orchestrator. Everything else is a
//!   deterministic function of the inputs.
use serde::Serialize;

use crate::{
    errors::{AnalysisError, AnalysisResult},
    profiling::{DataQualityReport, DatasetStatistics},
    statistical_tests::{
        AutocorrelationResult, HurstResult, MutualInformationResult, PartialAutocorrelationResult,
        SeasonalityResult, StationarityResult,
    },
};

/// Outcome of one statistical section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum SectionOutcome<T> {
    Computed(T),
    Failed { error: AnalysisError },
}

impl<T> SectionOutcome<T> {
    pub fn is_computed(&self) -> bool {
        matches!(self, SectionOutcome::Computed(_))
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            SectionOutcome::Computed(v) => Some(v),
            SectionOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            SectionOutcome::Computed(_) => None,
            SectionOutcome::Failed { error } => Some(error),
        }
    }
}

impl<T> From<AnalysisResult<T>> for SectionOutcome<T> {
    fn from(result: AnalysisResult<T>) -> Self {
        match result {
            Ok(v) => SectionOutcome::Computed(v),
            Err(error) => SectionOutcome::Failed { error },
        }
    }
}

/// How the target series was obtained from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub dropped_rows: usize,
    pub analyzed_rows: usize,
    pub sampled: bool,
}

/// CompleteAnalysisReport — everything computed for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteAnalysisReport {
    pub dataset_id: String,
    pub target_column: String,
    pub date_column: Option<String>,
    pub series: SeriesSummary,
    pub data_quality: DataQualityReport,
    pub statistics: DatasetStatistics,
    pub autocorrelation: SectionOutcome<AutocorrelationResult>,
    pub partial_autocorrelation: SectionOutcome<PartialAutocorrelationResult>,
    pub mutual_information: SectionOutcome<MutualInformationResult>,
    pub hurst_exponent: SectionOutcome<HurstResult>,
    pub stationarity_tests: SectionOutcome<StationarityResult>,
    pub seasonality_analysis: SectionOutcome<SeasonalityResult>,
    pub warnings: Vec<String>,
    pub analysis_timestamp: String,
    pub computation_time_seconds: f64,
}

impl CompleteAnalysisReport {
    /// Number of sections that failed.
    pub fn failed_sections(&self) -> usize {
        [
            self.autocorrelation.is_computed(),
            self.partial_autocorrelation.is_computed(),
            self.mutual_information.is_computed(),
            self.hurst_exponent.is_computed(),
            self.stationarity_tests.is_computed(),
            self.seasonality_analysis.is_computed(),
        ]
        .iter()
        .filter(|ok| !**ok)
        .count()
    }
}
