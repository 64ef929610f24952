//! profiling::quality — dataset-wide data-quality report.
//!
//! Purpose
//! -------
//! Profile every column of a [`Dataset`] (not only the analysis target)
//! and condense the result into a [`DataQualityReport`]: per-column type
//! tags, missing and outlier counts, duplicate rows, and three aggregate
//! scores with human-readable issues and recommendations.
//!
//! Key behaviors
//! -------------
//! - Completeness is `(cells − missing)/cells · 100`.
//! - Consistency is `100 − 100 · mixed/columns`, where a column is mixed
//!   when type inference disagrees within it (see
//!   [`ColumnProfile::is_mixed`]).
//! - Overall is the weighted combination of the two (0.6 / 0.4 by
//!   default).
//! - Outliers use Tukey fences `[q1 − k·IQR, q3 + k·IQR]` on numeric
//!   columns.
//! - Quality problems are *reported*, never raised: the only failure is an
//!   empty dataset.
//!
//! Invariants & assumptions
//! ------------------------
//! - All scores lie in `[0, 100]`.
//! - Map-valued fields are `BTreeMap`s so serialization order is
//!   deterministic.
//! - Column lists follow dataset column order.
//!
//! Downstream usage
//! ----------------
//! - Called by the orchestrator right after sampling; its failure aborts
//!   the request.
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    data::dataset::{Column, Dataset},
    errors::{AnalysisError, AnalysisResult},
    profiling::types::{profile_column, ColumnProfile, DataType},
    utils::{quantile_sorted, sorted_copy},
};

/// ProfilingOptions — thresholds for type inference, outliers and scoring.
///
/// Fields
/// ------
/// - `numeric_threshold`: share of parseable numbers required for a
///   numeric tag (0.95).
/// - `datetime_threshold`: share of parseable timestamps required for a
///   datetime tag (0.95).
/// - `categorical_ratio` / `categorical_max_unique`: a column is
///   categorical when `unique/non_missing < ratio` and `unique < max`
///   (0.1 / 50).
/// - `mixed_type_bounds`: open interval of numeric share that marks a
///   text-like column as mixed ((0.1, 0.9)).
/// - `iqr_multiplier`: Tukey fence multiplier (1.5).
/// - `completeness_weight` / `consistency_weight`: overall-score weights
///   (0.6 / 0.4).
/// - `missing_issue_pct`, `outlier_issue_pct`: per-column percentages
///   above which an issue is raised (30 / 10).
/// - `min_recommended_rows`: row count below which the dataset is flagged
///   as small (100).
/// - `top_values`: number of most frequent values listed per
///   non-numeric column in the statistics section (5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingOptions {
    pub numeric_threshold: f64,
    pub datetime_threshold: f64,
    pub categorical_ratio: f64,
    pub categorical_max_unique: usize,
    pub mixed_type_bounds: (f64, f64),
    pub iqr_multiplier: f64,
    pub completeness_weight: f64,
    pub consistency_weight: f64,
    pub missing_issue_pct: f64,
    pub outlier_issue_pct: f64,
    pub min_recommended_rows: usize,
    pub top_values: usize,
}

impl Default for ProfilingOptions {
    fn default() -> Self {
        ProfilingOptions {
            numeric_threshold: 0.95,
            datetime_threshold: 0.95,
            categorical_ratio: 0.1,
            categorical_max_unique: 50,
            mixed_type_bounds: (0.1, 0.9),
            iqr_multiplier: 1.5,
            completeness_weight: 0.6,
            consistency_weight: 0.4,
            missing_issue_pct: 30.0,
            outlier_issue_pct: 10.0,
            min_recommended_rows: 100,
            top_values: 5,
        }
    }
}

/// DataQualityReport — immutable quality summary of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub missing_values: BTreeMap<String, usize>,
    pub missing_percentages: BTreeMap<String, f64>,
    pub duplicate_rows: usize,
    pub data_types: BTreeMap<String, DataType>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub outliers_count: BTreeMap<String, usize>,
    pub unique_counts: BTreeMap<String, usize>,
    pub memory_usage_bytes: usize,
    pub completeness_score: f64,
    pub consistency_score: f64,
    pub overall_quality_score: f64,
    pub recommendations: Vec<String>,
    pub issues: Vec<String>,
}

/// Profile every column of `dataset`.
///
/// Parameters
/// ----------
/// - `dataset`: `&Dataset`
/// - `options`: `&ProfilingOptions`
///
/// Returns
/// -------
/// `AnalysisResult<(DataQualityReport, Vec<ColumnProfile>)>`
///   The report plus the per-column profiles (reused by the statistics
///   section so inference runs once).
///
/// Errors
/// ------
/// - `InsufficientData { context: "profiler", .. }` when the dataset has
///   zero rows or zero columns.
pub fn profile_dataset(
    dataset: &Dataset, options: &ProfilingOptions,
) -> AnalysisResult<(DataQualityReport, Vec<ColumnProfile>)> {
    let rows = dataset.n_rows();
    let cols = dataset.n_columns();
    if cols == 0 {
        return Err(AnalysisError::insufficient("profiler", 1, 0));
    }
    if rows == 0 {
        return Err(AnalysisError::insufficient("profiler", 1, 0));
    }

    let profiles: Vec<ColumnProfile> = dataset.columns().iter().map(|c| profile_column(c, options)).collect();

    let mut report = DataQualityReport {
        total_rows: rows,
        total_columns: cols,
        missing_values: BTreeMap::new(),
        missing_percentages: BTreeMap::new(),
        duplicate_rows: count_duplicate_rows(dataset),
        data_types: BTreeMap::new(),
        numeric_columns: Vec::new(),
        categorical_columns: Vec::new(),
        date_columns: Vec::new(),
        outliers_count: BTreeMap::new(),
        unique_counts: BTreeMap::new(),
        memory_usage_bytes: dataset.memory_usage_bytes(),
        completeness_score: 0.0,
        consistency_score: 0.0,
        overall_quality_score: 0.0,
        recommendations: Vec::new(),
        issues: Vec::new(),
    };

    let mut missing_cells = 0usize;
    let mut mixed_columns = 0usize;
    for (column, profile) in dataset.columns().iter().zip(&profiles) {
        let name = &column.name;
        let pct = 100.0 * profile.missing as f64 / rows as f64;
        missing_cells += profile.missing;
        report.missing_values.insert(name.clone(), profile.missing);
        report.missing_percentages.insert(name.clone(), pct);
        report.data_types.insert(name.clone(), profile.data_type);
        report.unique_counts.insert(name.clone(), profile.unique);

        if profile.data_type.is_numeric() {
            report.numeric_columns.push(name.clone());
            let outliers = count_outliers(column, options.iqr_multiplier);
            report.outliers_count.insert(name.clone(), outliers);
            let outlier_pct = 100.0 * outliers as f64 / rows as f64;
            if outlier_pct > options.outlier_issue_pct {
                report.issues.push(format!(
                    "Column '{name}' has {outliers} outliers ({outlier_pct:.1}% of rows)"
                ));
                report.recommendations.push(format!(
                    "Investigate outliers in column '{name}'; consider capping or robust transforms"
                ));
            }
        } else if profile.data_type.is_categorical() {
            report.categorical_columns.push(name.clone());
        } else if profile.data_type == DataType::Datetime {
            report.date_columns.push(name.clone());
        }

        if pct > options.missing_issue_pct {
            report.issues.push(format!("Column '{name}' has {pct:.1}% missing values"));
            report
                .recommendations
                .push(format!("Consider imputing or dropping column '{name}' before modeling"));
        }
        if profile.is_mixed(options) {
            mixed_columns += 1;
            report.issues.push(format!("Column '{name}' mixes numeric and non-numeric values"));
            report.recommendations.push(format!("Normalize the value format of column '{name}'"));
        }
    }

    if report.duplicate_rows > 0 {
        report.issues.push(format!("Found {} duplicate rows", report.duplicate_rows));
        report.recommendations.push("Remove duplicate rows before analysis".to_string());
    }
    if rows < options.min_recommended_rows {
        report.issues.push(format!("Dataset has only {rows} rows"));
        report.recommendations.push(format!(
            "Collect more data; at least {} rows are recommended for reliable time-series analysis",
            options.min_recommended_rows
        ));
    }
    if report.numeric_columns.is_empty() {
        report.issues.push("No numeric columns detected".to_string());
        report
            .recommendations
            .push("Time-series analysis requires at least one numeric column".to_string());
    }

    let cells = (rows * cols) as f64;
    report.completeness_score = 100.0 * (cells - missing_cells as f64) / cells;
    report.consistency_score = (100.0 - 100.0 * mixed_columns as f64 / cols as f64).clamp(0.0, 100.0);
    let weights = options.completeness_weight + options.consistency_weight;
    report.overall_quality_score = if weights > 0.0 {
        ((options.completeness_weight * report.completeness_score
            + options.consistency_weight * report.consistency_score)
            / weights)
            .clamp(0.0, 100.0)
    } else {
        0.0
    };

    Ok((report, profiles))
}

/// Count values outside the Tukey fences of a column's numeric cells.
pub fn count_outliers(column: &Column, multiplier: f64) -> usize {
    let values: Vec<f64> = column.values.iter().filter_map(|c| c.as_f64()).collect();
    count_outliers_in(&sorted_copy(&values), multiplier)
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Tukey-fence outlier count on sorted values.
pub(crate) fn count_outliers_in(sorted: &[f64], multiplier: f64) -> usize {
    if sorted.len() < 4 {
        return 0;
    }
    let q1 = quantile_sorted(sorted, 0.25);
    let q3 = quantile_sorted(sorted, 0.75);
    let iqr = q3 - q1;
    let (lo, hi) = (q1 - multiplier * iqr, q3 + multiplier * iqr);
    sorted.iter().filter(|&&x| x < lo || x > hi).count()
}

/// Rows identical (cell by cell) to an earlier row.
fn count_duplicate_rows(dataset: &Dataset) -> usize {
    let mut seen = HashSet::with_capacity(dataset.n_rows());
    let mut dups = 0;
    for row in 0..dataset.n_rows() {
        let key: Vec<String> = dataset.columns().iter().map(|c| c.values[row].key()).collect();
        if !seen.insert(key) {
            dups += 1;
        }
    }
    dups
}
