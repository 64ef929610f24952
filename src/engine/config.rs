//! engine::config — analysis and pool configuration.
//!
//! Purpose
//! -------
//! Collect every tunable of the pipeline in one serde-friendly tree so a
//! deployment can override a handful of values from JSON and inherit the
//! documented defaults for everything else.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisConfig`] nests the per-component options structs; each level
//!   deserializes with `#[serde(default)]`.
//! - [`AnalysisConfig::from_json_str`] parses and validates in one step.
//! - [`AnalysisConfig::validate`] range-checks the values a routine cannot
//!   recover from and reports the offending field as `InvalidConfig`.
//! - [`PoolConfig`] sizes the worker pool (workers, queue depth, timeout).
//!
//! Invariants & assumptions
//! ------------------------
//! - A default-constructed config always validates.
//! - Validation is explicit; constructing a config with `new` does not
//!   validate, mirroring the options structs it aggregates.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    data::SamplingOptions,
    errors::{AnalysisError, AnalysisResult},
    profiling::ProfilingOptions,
    statistical_tests::{
        CorrelogramOptions, HurstOptions, MutualInformationOptions, SeasonalityOptions, StationarityOptions,
    },
};

/// AnalysisConfig — configuration for one analysis run.
///
/// Fields
/// ------
/// - `min_observations`: valid values the target must keep after coercion
///   and sampling (10).
/// - `sampling`, `profiling`, `correlogram`, `mutual_information`,
///   `hurst`, `stationarity`, `seasonality`: per-stage options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_observations: usize,
    pub sampling: SamplingOptions,
    pub profiling: ProfilingOptions,
    pub correlogram: CorrelogramOptions,
    pub mutual_information: MutualInformationOptions,
    pub hurst: HurstOptions,
    pub stationarity: StationarityOptions,
    pub seasonality: SeasonalityOptions,
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    ///
    /// Errors
    /// ------
    /// - `InvalidConfig { field: "json", .. }` for malformed JSON or wrong
    ///   types.
    /// - Anything [`AnalysisConfig::validate`] reports.
    pub fn from_json_str(json: &str) -> AnalysisResult<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidConfig { field: "json", reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check the configuration.
    ///
    /// Errors
    /// ------
    /// - `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.min_observations < 2 {
            return invalid("min_observations", "must be at least 2");
        }
        let p = &self.profiling;
        for (field, v) in [
            ("profiling.numeric_threshold", p.numeric_threshold),
            ("profiling.datetime_threshold", p.datetime_threshold),
            ("profiling.categorical_ratio", p.categorical_ratio),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return invalid(field, "must lie in [0, 1]");
            }
        }
        if !(p.completeness_weight >= 0.0 && p.consistency_weight >= 0.0)
            || (p.completeness_weight + p.consistency_weight - 1.0).abs() > 1e-9
        {
            return invalid("profiling.completeness_weight", "quality weights must be non-negative and sum to 1");
        }
        if !(p.iqr_multiplier > 0.0) {
            return invalid("profiling.iqr_multiplier", "must be positive");
        }
        if !(self.correlogram.significance_z > 0.0) {
            return invalid("correlogram.significance_z", "must be positive");
        }
        let mi = &self.mutual_information;
        if mi.max_lag == 0 {
            return invalid("mutual_information.max_lag", "must be at least 1");
        }
        if mi.bins.is_some_and(|b| !(2..=256).contains(&b)) {
            return invalid("mutual_information.bins", "must lie in 2..=256");
        }
        if !(mi.significance > 0.0 && mi.significance < 1.0) {
            return invalid("mutual_information.significance", "must lie in (0, 1)");
        }
        if self.hurst.min_scale < 2 {
            return invalid("hurst.min_scale", "must be at least 2");
        }
        if self.hurst.min_scales < 2 {
            return invalid("hurst.min_scales", "a regression needs at least 2 scales");
        }
        let s = &self.seasonality;
        if !(s.min_period >= 2.0) || s.max_period.is_some_and(|m| m < s.min_period) {
            return invalid("seasonality.min_period", "need 2 ≤ min_period ≤ max_period");
        }
        if s.max_peaks == 0 {
            return invalid("seasonality.max_peaks", "must be at least 1");
        }
        if !(s.min_prominence >= 1.0) {
            return invalid("seasonality.min_prominence", "must be at least 1");
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            min_observations: 10,
            sampling: SamplingOptions::default(),
            profiling: ProfilingOptions::default(),
            correlogram: CorrelogramOptions::default(),
            mutual_information: MutualInformationOptions::default(),
            hurst: HurstOptions::default(),
            stationarity: StationarityOptions::default(),
            seasonality: SeasonalityOptions::default(),
        }
    }
}

/// PoolConfig — worker pool sizing.
///
/// Fields
/// ------
/// - `workers`: worker threads (`num_cpus::get()`).
/// - `queue_depth`: bounded queue capacity; submissions beyond it are shed
///   with `Overloaded` (`4 × workers`).
/// - `default_timeout`: per-job budget measured from submission (30 s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_depth: usize,
    pub default_timeout: Duration,
}

impl PoolConfig {
    pub fn new(workers: usize, queue_depth: usize, default_timeout: Duration) -> Self {
        PoolConfig { workers, queue_depth, default_timeout }
    }

    /// `workers` threads with the default `4 × workers` queue and timeout.
    pub fn with_workers(workers: usize) -> Self {
        PoolConfig::new(workers, 4 * workers, Duration::from_secs(30))
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.workers == 0 {
            return invalid("pool.workers", "must be at least 1");
        }
        if self.queue_depth == 0 {
            return invalid("pool.queue_depth", "must be at least 1");
        }
        if self.default_timeout.is_zero() {
            return invalid("pool.default_timeout", "must be positive");
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig::with_workers(num_cpus::get().max(1))
    }
}

#[inline]
fn invalid(field: &'static str, reason: &str) -> AnalysisResult<()> {
    Err(AnalysisError::InvalidConfig { field, reason: reason.to_string() })
}
