//! data::dataset — in-memory tabular input model.
//!
//! Purpose
//! -------
//! Represent the dataset handed to the engine by its caller: a list of
//! named, equally long columns of loosely typed cells. The engine never
//! mutates a dataset; the sampler and profiler only read from it.
//!
//! Key behaviors
//! -------------
//! - [`Cell`] models the four shapes a raw value can take (missing,
//!   number, text, boolean) and knows how to coerce itself to `f64` or to
//!   a timestamp.
//! - [`Dataset::new`] validates that columns are non-ragged and uniquely
//!   named, so downstream code can index rows freely.
//!
//! Conventions
//! -----------
//! - Numeric coercion accepts finite numbers and text that parses as a
//!   finite `f64` after trimming. NaN and ±∞ count as missing.
//! - Timestamps are naive (UTC-normalized when an offset is present).
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, AnalysisResult};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// One raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// `true` for `Null`, NaN numbers and blank text.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(x) => x.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Bool(_) => false,
        }
    }

    /// Coerce to a finite `f64`, or `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(x) if x.is_finite() => Some(*x),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            _ => None,
        }
    }

    /// Parse as a timestamp. Numbers are Unix epoch seconds.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Number(x) if x.is_finite() => {
                let secs = x.floor();
                let nanos = ((x - secs) * 1e9).round() as u32;
                DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
            }
            Cell::Text(s) => parse_datetime_text(s.trim()),
            _ => None,
        }
    }

    /// Interpret as a boolean (`true/false/yes/no`, case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Canonical string form used for uniqueness and duplicate detection.
    pub fn key(&self) -> String {
        match self {
            Cell::Null => String::from("\u{0}null"),
            Cell::Number(x) if x.is_nan() => String::from("\u{0}null"),
            Cell::Number(x) => format!("{x:?}"),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
        }
    }

    /// Rough in-memory footprint in bytes.
    pub(crate) fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Cell>()
            + match self {
                Cell::Text(s) => s.capacity(),
                _ => 0,
            }
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Number(x)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Column { name: name.into(), values }
    }

    /// Build a fully numeric column.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Column::new(name, values.into_iter().map(Cell::Number).collect())
    }

    /// Build a text column.
    pub fn text<'a>(name: impl Into<String>, values: impl IntoIterator<Item = &'a str>) -> Self {
        Column::new(name, values.into_iter().map(Cell::from).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Dataset — validated collection of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    id: String,
    columns: Vec<Column>,
}

impl Dataset {
    /// Validate and wrap a set of columns.
    ///
    /// Errors
    /// ------
    /// - `InvalidColumn` if two columns share a name or a column's length
    ///   differs from the first column's.
    pub fn new(id: impl Into<String>, columns: Vec<Column>) -> AnalysisResult<Self> {
        if let Some(first) = columns.first() {
            let rows = first.len();
            for (i, col) in columns.iter().enumerate() {
                if col.len() != rows {
                    return Err(AnalysisError::InvalidColumn {
                        column: col.name.clone(),
                        reason: format!("has {} rows, expected {rows}", col.len()),
                    });
                }
                if columns[..i].iter().any(|c| c.name == col.name) {
                    return Err(AnalysisError::InvalidColumn {
                        column: col.name.clone(),
                        reason: "duplicate column name".to_string(),
                    });
                }
            }
        }
        Ok(Dataset { id: id.into(), columns })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Approximate memory footprint of the cell storage.
    pub fn memory_usage_bytes(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.name.capacity() + c.values.iter().map(Cell::approx_bytes).sum::<usize>())
            .sum()
    }
}

//
// ---------- Private helpers (compact docs) ----------
//

#[inline]
fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
