//! profiling::statistics — descriptive statistics and correlations.
//!
//! Purpose
//! -------
//! Build the `statistics` section of the complete report: a descriptive
//! summary for every column and a Pearson correlation matrix over the
//! numeric columns.
//!
//! Key behaviors
//! -------------
//! - Numeric columns report count, mean, median, sample std, min/max,
//!   quartiles, bias-adjusted skewness and excess kurtosis, and Tukey
//!   outliers.
//! - Non-numeric columns report count, unique count, mode and the most
//!   frequent values (ties broken by first appearance).
//! - Correlations use pairwise-complete rows; undefined entries (fewer than
//!   two shared rows, zero variance) are `None`.
//!
//! Conventions
//! -----------
//! - Skewness and kurtosis follow the adjusted Fisher–Pearson estimators
//!   (`G1`, `G2`) and are `None` below 3 and 4 observations respectively.
//! - Quartiles use linear interpolation.
use std::collections::{BTreeMap, HashMap};

use ndarray::Array2;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::{
    data::dataset::Dataset,
    profiling::{
        quality::{count_outliers_in, ProfilingOptions},
        types::ColumnProfile,
    },
    utils::{quantile_sorted, sorted_copy},
};

/// Summary of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub outliers: usize,
}

/// One `(value, count)` entry in a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Summary of a non-numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub mode: Option<String>,
    pub most_frequent_values: Vec<ValueCount>,
}

/// Per-column summary, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "summary", rename_all = "snake_case")]
pub enum ColumnStatistics {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Pearson correlation matrix with explicit column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns, if defined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// DatasetStatistics — the report's `statistics` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStatistics {
    pub total_rows: usize,
    pub total_columns: usize,
    pub memory_usage_mb: f64,
    pub columns_statistics: BTreeMap<String, ColumnStatistics>,
    pub correlations: Option<CorrelationMatrix>,
}

/// Describe every column and correlate the numeric ones.
///
/// `profiles` must come from `profile_dataset` on the same dataset, in
/// column order.
pub fn describe_dataset(
    dataset: &Dataset, profiles: &[ColumnProfile], options: &ProfilingOptions,
) -> DatasetStatistics {
    let mut columns_statistics = BTreeMap::new();
    let mut numeric: Vec<(String, Vec<Option<f64>>)> = Vec::new();

    for (column, profile) in dataset.columns().iter().zip(profiles) {
        let stats = if profile.data_type.is_numeric() {
            let raw: Vec<Option<f64>> = column.values.iter().map(|c| c.as_f64()).collect();
            let values: Vec<f64> = raw.iter().flatten().copied().collect();
            numeric.push((column.name.clone(), raw));
            ColumnStatistics::Numeric(summarize_numeric(&values, options.iqr_multiplier))
        } else {
            let keys: Vec<String> =
                column.values.iter().filter(|c| !c.is_missing()).map(|c| c.key()).collect();
            ColumnStatistics::Categorical(summarize_categorical(&keys, options.top_values))
        };
        columns_statistics.insert(column.name.clone(), stats);
    }

    let correlations = if numeric.len() >= 2 { Some(pearson_matrix(&numeric)) } else { None };

    DatasetStatistics {
        total_rows: dataset.n_rows(),
        total_columns: dataset.n_columns(),
        memory_usage_mb: dataset.memory_usage_bytes() as f64 / (1024.0 * 1024.0),
        columns_statistics,
        correlations,
    }
}

//
// ---------- Private helpers (compact docs) ----------
//

fn summarize_numeric(values: &[f64], iqr_multiplier: f64) -> NumericSummary {
    let sorted = sorted_copy(values);
    let n = sorted.len();
    let mean = values.iter().mean();
    let std = (n >= 2).then(|| values.iter().std_dev());
    NumericSummary {
        count: n,
        mean,
        median: quantile_sorted(&sorted, 0.5),
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        max: sorted.last().copied().unwrap_or(f64::NAN),
        q25: quantile_sorted(&sorted, 0.25),
        q75: quantile_sorted(&sorted, 0.75),
        skewness: adjusted_skewness(values, mean),
        kurtosis: excess_kurtosis(values, mean),
        outliers: count_outliers_in(&sorted, iqr_multiplier),
    }
}

fn summarize_categorical(keys: &[String], top: usize) -> CategoricalSummary {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, k) in keys.iter().enumerate() {
        counts.entry(k.as_str()).or_insert((0, pos)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts.into_iter().map(|(k, (c, p))| (k, c, p)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    CategoricalSummary {
        count: keys.len(),
        unique: ranked.len(),
        mode: ranked.first().map(|r| r.0.to_string()),
        most_frequent_values: ranked
            .iter()
            .take(top)
            .map(|r| ValueCount { value: r.0.to_string(), count: r.1 })
            .collect(),
    }
}

#[inline]
fn central_moments(values: &[f64], mean: f64) -> (f64, f64, f64) {
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for x in values {
        let d = x - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Adjusted Fisher–Pearson skewness `G1`.
fn adjusted_skewness(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let (m2, m3, _) = central_moments(values, mean);
    if m2 <= 0.0 {
        return None;
    }
    let nf = n as f64;
    Some((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * m3 / m2.powf(1.5))
}

/// Bias-adjusted excess kurtosis `G2`.
fn excess_kurtosis(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let (m2, _, m4) = central_moments(values, mean);
    if m2 <= 0.0 {
        return None;
    }
    let nf = n as f64;
    let g2 = m4 / (m2 * m2) - 3.0;
    Some(((nf + 1.0) * g2 + 6.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0)))
}

/// Pairwise-complete Pearson correlations.
fn pearson_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let p = columns.len();
    let mut corr = Array2::<f64>::from_elem((p, p), f64::NAN);
    for i in 0..p {
        for j in i..p {
            let pairs: Vec<(f64, f64)> = columns[i]
                .1
                .iter()
                .zip(&columns[j].1)
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            let r = pearson(&pairs);
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }
    CorrelationMatrix {
        columns: columns.iter().map(|c| c.0.clone()).collect(),
        values: corr
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&v| v.is_finite().then_some(v)).collect())
            .collect(),
    }
}

#[inline]
fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::dataset::{Cell, Column},
        profiling::quality::profile_dataset,
    };
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Numeric summaries against hand-computed values.
    // - Frequency ranking and mode for text columns.
    // - Correlation matrix symmetry, perfect correlation and undefined cells.
    // -------------------------------------------------------------------------

    fn describe(ds: &Dataset) -> DatasetStatistics {
        let opts = ProfilingOptions::default();
        let (_, profiles) = profile_dataset(ds, &opts).unwrap();
        describe_dataset(ds, &profiles, &opts)
    }

    #[test]
    // Purpose
    // -------
    // Check the numeric summary of 1..=5.
    //
    // Given
    // -----
    // - x = [1, 2, 3, 4, 5].
    //
    // Expect
    // ------
    // - mean = median = 3, std = sqrt(2.5), q25 = 2, q75 = 4, skewness = 0,
    //   excess kurtosis = −1.2.
    fn describe_numeric_column_matches_reference() {
        let ds = Dataset::new("d", vec![Column::numeric("x", [1.0, 2.0, 3.0, 4.0, 5.0])]).unwrap();
        let stats = describe(&ds);
        let ColumnStatistics::Numeric(s) = &stats.columns_statistics["x"] else {
            panic!("expected numeric summary");
        };
        assert_relative_eq!(s.mean, 3.0, epsilon = 1e-12);
        assert_relative_eq!(s.median, 3.0, epsilon = 1e-12);
        assert_relative_eq!(s.std.unwrap(), 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(s.q25, 2.0, epsilon = 1e-12);
        assert_relative_eq!(s.q75, 4.0, epsilon = 1e-12);
        assert_relative_eq!(s.skewness.unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.kurtosis.unwrap(), -1.2, epsilon = 1e-12);
        assert!(stats.correlations.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Most frequent values are ranked by count, ties by first appearance.
    //
    // Given
    // -----
    // - ["b", "a", "b", "c", "a", "b"].
    //
    // Expect
    // ------
    // - mode "b"; order b(3), a(2), c(1).
    fn describe_text_column_ranks_frequencies() {
        let ds = Dataset::new("d", vec![Column::text("t", ["b", "a", "b", "c", "a", "b"])]).unwrap();
        let stats = describe(&ds);
        let ColumnStatistics::Categorical(s) = &stats.columns_statistics["t"] else {
            panic!("expected categorical summary");
        };
        assert_eq!(s.mode.as_deref(), Some("b"));
        let order: Vec<_> = s.most_frequent_values.iter().map(|v| (v.value.as_str(), v.count)).collect();
        assert_eq!(order, vec![("b", 3), ("a", 2), ("c", 1)]);
    }

    #[test]
    // Purpose
    // -------
    // Correlations are symmetric, exact for linear relations, and undefined
    // for constant columns.
    //
    // Given
    // -----
    // - x, y = −2x with one Null, and a constant column.
    //
    // Expect
    // ------
    // - corr(x, y) = −1, diagonal 1, constant column entries `None`.
    fn describe_correlation_matrix_handles_linear_and_constant_columns() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut y: Vec<Cell> = x.iter().map(|v| Cell::Number(-2.0 * v)).collect();
        y[3] = Cell::Null;
        let ds = Dataset::new(
            "d",
            vec![Column::numeric("x", x.clone()), Column::new("y", y), Column::numeric("c", [7.0; 10])],
        )
        .unwrap();

        let corr = describe(&ds).correlations.unwrap();

        assert_relative_eq!(corr.get("x", "y").unwrap(), -1.0, epsilon = 1e-12);
        assert_eq!(corr.get("x", "y"), corr.get("y", "x"));
        assert_relative_eq!(corr.get("x", "x").unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(corr.get("x", "c"), None);
        assert_eq!(corr.get("c", "c"), None);
    }
}
