//! profiling::types — deterministic per-column type inference.
//!
//! Purpose
//! -------
//! Assign every column a single [`DataType`] tag from its non-missing
//! cells, using fixed, configurable thresholds so that the same column
//! always receives the same tag.
//!
//! Key behaviors
//! -------------
//! - Rules are applied in order: empty → numeric (integer/float) →
//!   datetime → boolean → categorical → text.
//! - A column is numeric when at least `numeric_threshold` of its
//!   non-missing cells coerce to finite numbers; it is `integer` when all
//!   of those numbers are whole.
//! - [`ColumnProfile::is_mixed`] flags text-like columns whose numeric
//!   share sits strictly between the configured bounds, which feeds the
//!   consistency score.
use std::collections::HashSet;

use serde::Serialize;

use crate::{
    data::dataset::{Cell, Column},
    profiling::quality::ProfilingOptions,
};

/// Column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Integer,
    Float,
    Datetime,
    Boolean,
    Categorical,
    Text,
    Empty,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, DataType::Categorical | DataType::Boolean)
    }
}

/// ColumnProfile — inferred tag plus the counts it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub data_type: DataType,
    pub missing: usize,
    pub non_missing: usize,
    pub unique: usize,
    /// Share of non-missing cells coercible to numbers.
    pub numeric_fraction: f64,
}

impl ColumnProfile {
    /// Text-like column whose numeric share lies in `(low, high)`.
    pub fn is_mixed(&self, options: &ProfilingOptions) -> bool {
        matches!(self.data_type, DataType::Text | DataType::Categorical)
            && self.numeric_fraction > options.mixed_type_bounds.0
            && self.numeric_fraction < options.mixed_type_bounds.1
    }
}

/// Infer the type tag and basic counts for one column.
pub fn profile_column(column: &Column, options: &ProfilingOptions) -> ColumnProfile {
    let present: Vec<_> = column.values.iter().filter(|c| !c.is_missing()).collect();
    let non_missing = present.len();
    let missing = column.len() - non_missing;
    let unique = present.iter().map(|c| c.key()).collect::<HashSet<_>>().len();

    let numbers: Vec<f64> = present.iter().filter_map(|c| c.as_f64()).collect();
    let numeric_fraction = if non_missing == 0 { 0.0 } else { numbers.len() as f64 / non_missing as f64 };

    let data_type = if non_missing == 0 {
        DataType::Empty
    } else if numeric_fraction >= options.numeric_threshold {
        if numbers.iter().all(|x| x.fract() == 0.0) {
            DataType::Integer
        } else {
            DataType::Float
        }
    } else if share(&present, |c| matches!(c, Cell::Text(_)) && c.as_datetime().is_some())
        >= options.datetime_threshold
    {
        DataType::Datetime
    } else if present.iter().all(|c| c.as_bool().is_some()) {
        DataType::Boolean
    } else if (unique as f64 / non_missing as f64) < options.categorical_ratio
        && unique < options.categorical_max_unique
    {
        DataType::Categorical
    } else {
        DataType::Text
    };

    ColumnProfile { name: column.name.clone(), data_type, missing, non_missing, unique, numeric_fraction }
}

#[inline]
fn share<T>(items: &[T], pred: impl Fn(&T) -> bool) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().filter(|c| pred(*c)).count() as f64 / items.len() as f64
}
