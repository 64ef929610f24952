//! data::request — the logical analysis request.
use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, AnalysisResult};

/// Largest `max_lags` accepted by [`AnalysisRequest::validate`].
pub const MAX_LAGS_LIMIT: usize = 200;

/// Upper bound of the length-dependent default lag count.
pub const DEFAULT_MAX_LAGS: usize = 50;

/// AnalysisRequest — what to analyze and how much of it.
///
/// Fields
/// ------
/// - `target_column`: numeric column to analyze.
/// - `date_column`: optional timestamp column aligned with the target.
/// - `max_lags`: largest lag for ACF/PACF (MI applies its own cap). `None`
///   resolves to `min(50, n/2)` once the series length `n` is known; explicit
///   values at or above `n` are clamped downstream with a warning.
/// - `sample_size`: optional row cap; `None` analyzes every valid row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub target_column: String,
    #[serde(default)]
    pub date_column: Option<String>,
    #[serde(default)]
    pub max_lags: Option<usize>,
    #[serde(default)]
    pub sample_size: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(target_column: impl Into<String>) -> Self {
        AnalysisRequest {
            target_column: target_column.into(),
            date_column: None,
            max_lags: None,
            sample_size: None,
        }
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    pub fn with_max_lags(mut self, max_lags: usize) -> Self {
        self.max_lags = Some(max_lags);
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Shape checks that do not need the dataset.
    ///
    /// Errors
    /// ------
    /// - `InvalidColumn` for an empty target name.
    /// - `InvalidConfig` when an explicit `max_lags` is outside
    ///   `1..=MAX_LAGS_LIMIT`.
    /// - `Sampling` when `sample_size == Some(0)`.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.target_column.trim().is_empty() {
            return Err(AnalysisError::InvalidColumn {
                column: self.target_column.clone(),
                reason: "target column name is empty".to_string(),
            });
        }
        if let Some(lags) = self.max_lags.filter(|&k| k == 0 || k > MAX_LAGS_LIMIT) {
            return Err(AnalysisError::InvalidConfig {
                field: "max_lags",
                reason: format!("{lags} is outside 1..={MAX_LAGS_LIMIT}"),
            });
        }
        if self.sample_size == Some(0) {
            return Err(AnalysisError::Sampling {
                requested: 0,
                available: 0,
                reason: "sample size must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Lag count for a series of `n` analyzed values.
    ///
    /// An explicit `max_lags` is returned as-is; the default is
    /// `min(DEFAULT_MAX_LAGS, n/2)`, at least 1.
    pub fn resolved_max_lags(&self, n: usize) -> usize {
        self.max_lags.unwrap_or_else(|| DEFAULT_MAX_LAGS.min(n / 2).max(1))
    }
}
