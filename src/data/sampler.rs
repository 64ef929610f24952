//! data::sampler — target extraction, coercion and deterministic sampling.
//!
//! Purpose
//! -------
//! Turn a raw [`Dataset`] column into the clean `f64` series every
//! statistical routine consumes, together with the bookkeeping needed to
//! explain what happened to the rows that did not make it.
//!
//! Key behaviors
//! -------------
//! - Resolve the target (and optional date) column by name.
//! - Coerce cells to `f64`; rows that fail coercion (or, when a date
//!   column is requested, whose timestamp fails to parse) are dropped and
//!   counted, never silently discarded.
//! - Reject duplicate timestamps.
//! - Apply a row cap with a deterministic, order-preserving strategy.
//!
//! Invariants & assumptions
//! ------------------------
//! - Original row order is preserved by every strategy; time order is
//!   significant and is never re-sorted.
//! - `dropped_rows = total_rows − valid_rows` always holds.
//! - Identical inputs produce identical samples (seeded RNG).
//!
//! Downstream usage
//! ----------------
//! - The orchestrator calls [`load_series`] as its first stage; a failure
//!   here rejects the whole request.
use std::collections::HashSet;

use chrono::NaiveDateTime;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    data::{dataset::Dataset, request::AnalysisRequest},
    errors::{AnalysisError, AnalysisResult},
};

/// Row-selection policy applied when the cap is below the valid row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum SamplingStrategy {
    /// First `N` valid rows.
    Head,
    /// Evenly spaced rows `⌊i·n/N⌋`.
    Systematic,
    /// `N` rows drawn without replacement by a seeded RNG, then re-sorted
    /// into original order.
    SeededRandom { seed: u64 },
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        SamplingStrategy::SeededRandom { seed: 42 }
    }
}

/// SamplingOptions — how the sampler applies the request's row cap.
///
/// Fields
/// ------
/// - `strategy`: [`SamplingStrategy`], seeded random (seed 42) by default.
/// - `strict_cap`: when `true`, a cap larger than the number of valid rows
///   is a `Sampling` error instead of "take everything".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SamplingOptions {
    pub strategy: SamplingStrategy,
    pub strict_cap: bool,
}

impl SamplingOptions {
    pub fn new(strategy: SamplingStrategy, strict_cap: bool) -> Self {
        SamplingOptions { strategy, strict_cap }
    }
}

/// SampledSeries — the resolved numeric series plus row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSeries {
    pub values: Vec<f64>,
    pub timestamps: Option<Vec<NaiveDateTime>>,
    /// Rows in the source dataset.
    pub total_rows: usize,
    /// Rows that survived coercion (before sampling).
    pub valid_rows: usize,
    /// Rows dropped by coercion: `total_rows − valid_rows`.
    pub dropped_rows: usize,
    /// Whether the cap actually removed rows.
    pub sampled: bool,
}

impl SampledSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Extract, coerce and sample the request's target column.
///
/// Parameters
/// ----------
/// - `dataset`: `&Dataset`
/// - `request`: `&AnalysisRequest`
///   Supplies the column names and the optional `sample_size` cap.
/// - `options`: `&SamplingOptions`
/// - `min_observations`: `usize`
///   Minimum number of values the final series must hold.
///
/// Returns
/// -------
/// `AnalysisResult<SampledSeries>`
///
/// Errors
/// ------
/// - `InvalidColumn` if the target or date column is absent, if no target
///   cell coerces to a number, or if timestamps repeat.
/// - `Sampling` if the cap is zero, or exceeds the valid rows under
///   `strict_cap`.
/// - `InsufficientData` if fewer than `min_observations` values remain
///   after coercion or after sampling.
pub fn load_series(
    dataset: &Dataset, request: &AnalysisRequest, options: &SamplingOptions, min_observations: usize,
) -> AnalysisResult<SampledSeries> {
    let target = dataset.column(&request.target_column).ok_or_else(|| AnalysisError::InvalidColumn {
        column: request.target_column.clone(),
        reason: "column not found in dataset".to_string(),
    })?;
    let dates = match &request.date_column {
        Some(name) => Some(dataset.column(name).ok_or_else(|| AnalysisError::InvalidColumn {
            column: name.clone(),
            reason: "date column not found in dataset".to_string(),
        })?),
        None => None,
    };

    let total_rows = target.len();
    let mut values = Vec::with_capacity(total_rows);
    let mut stamps = dates.map(|_| Vec::with_capacity(total_rows));
    let mut numeric_seen = 0usize;

    for (row, cell) in target.values.iter().enumerate() {
        let Some(x) = cell.as_f64() else { continue };
        numeric_seen += 1;
        match (dates, stamps.as_mut()) {
            (Some(col), Some(out)) => {
                if let Some(ts) = col.values[row].as_datetime() {
                    out.push(ts);
                    values.push(x);
                }
            }
            _ => values.push(x),
        }
    }

    if numeric_seen == 0 && total_rows > 0 {
        return Err(AnalysisError::InvalidColumn {
            column: request.target_column.clone(),
            reason: "no values could be coerced to numbers".to_string(),
        });
    }
    if let Some(ts) = &stamps {
        validate_unique_timestamps(ts, request.date_column.as_deref().unwrap_or_default())?;
    }

    let valid_rows = values.len();
    if valid_rows < min_observations {
        return Err(AnalysisError::insufficient("sampler", min_observations, valid_rows));
    }

    let indices = match request.sample_size {
        None => None,
        Some(cap) => select_indices(cap, valid_rows, options)?,
    };

    let (values, timestamps, sampled) = match indices {
        None => (values, stamps, false),
        Some(idx) => {
            let v = idx.iter().map(|&i| values[i]).collect::<Vec<_>>();
            let t = stamps.map(|s| idx.iter().map(|&i| s[i]).collect());
            (v, t, true)
        }
    };

    if values.len() < min_observations {
        return Err(AnalysisError::insufficient("sampler", min_observations, values.len()));
    }

    Ok(SampledSeries {
        values,
        timestamps,
        total_rows,
        valid_rows,
        dropped_rows: total_rows - valid_rows,
        sampled,
    })
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Row indices to keep, ascending; `None` keeps every row.
fn select_indices(
    cap: usize, available: usize, options: &SamplingOptions,
) -> AnalysisResult<Option<Vec<usize>>> {
    if cap == 0 {
        return Err(AnalysisError::Sampling {
            requested: cap,
            available,
            reason: "sample size must be positive".to_string(),
        });
    }
    if cap > available && options.strict_cap {
        return Err(AnalysisError::Sampling {
            requested: cap,
            available,
            reason: "sample size exceeds the number of valid rows".to_string(),
        });
    }
    if cap >= available {
        return Ok(None);
    }

    let indices = match options.strategy {
        SamplingStrategy::Head => (0..cap).collect(),
        SamplingStrategy::Systematic => (0..cap).map(|i| i * available / cap).collect(),
        SamplingStrategy::SeededRandom { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut idx = rand::seq::index::sample(&mut rng, available, cap).into_vec();
            idx.sort_unstable();
            idx
        }
    };
    Ok(Some(indices))
}

#[inline]
fn validate_unique_timestamps(ts: &[NaiveDateTime], column: &str) -> AnalysisResult<()> {
    let mut seen = HashSet::with_capacity(ts.len());
    for t in ts {
        if !seen.insert(*t) {
            return Err(AnalysisError::InvalidColumn {
                column: column.to_string(),
                reason: format!("duplicate timestamp {t}"),
            });
        }
    }
    Ok(())
}
