//! engine::cache — content-addressed memoization of analysis reports.
//!
//! Reports are keyed by a [`CacheKey`]: the dataset id, the request and the
//! JSON form of the configuration are stored verbatim and compared on every
//! lookup, while the cell contents are reduced to a 128-bit digest made of
//! two domain-separated SipHash (`DefaultHasher`) passes. Identical inputs
//! reuse the stored sections; on a hit the timestamp and timing fields are
//! refreshed for the current call. The cache holds at most `capacity`
//! entries and evicts the oldest insertion first.
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::{
    data::{AnalysisRequest, Cell, Dataset},
    engine::{cancel::CancelToken, config::AnalysisConfig, orchestrator::run_analysis, report::CompleteAnalysisReport},
    errors::{AnalysisError, AnalysisResult},
};

/// Lookup key of one analysis input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    dataset_id: String,
    request: AnalysisRequest,
    config_json: String,
    content_digest: u128,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, CompleteAnalysisReport>,
    order: VecDeque<CacheKey>,
}

/// Bounded FIFO cache of complete reports.
#[derive(Debug)]
pub struct ReportCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ReportCache {
    /// Cache holding at most `capacity` reports (at least one).
    pub fn new(capacity: usize) -> Self {
        ReportCache {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Key of one analysis input.
    ///
    /// Errors
    /// ------
    /// - `InvalidConfig { field: "config", .. }` if the config cannot be
    ///   serialized (it always can for values built through serde).
    pub fn key(dataset: &Dataset, request: &AnalysisRequest, config: &AnalysisConfig) -> AnalysisResult<CacheKey> {
        let config_json = serde_json::to_string(config)
            .map_err(|e| AnalysisError::InvalidConfig { field: "config", reason: e.to_string() })?;
        let low = content_hash(dataset, 0x5eed_0001);
        let high = content_hash(dataset, 0x5eed_0002);
        Ok(CacheKey {
            dataset_id: dataset.id().to_string(),
            request: request.clone(),
            config_json,
            content_digest: (u128::from(high) << 64) | u128::from(low),
        })
    }

    pub fn get(&self, key: &CacheKey) -> Option<CompleteAnalysisReport> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.entries.get(key).cloned()
    }

    /// Store `report` under `key`, evicting the oldest entry when full.
    pub fn insert(&self, key: CacheKey, report: CompleteAnalysisReport) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if inner.entries.insert(key.clone(), report).is_none() {
            inner.order.push_back(key);
        }
        while inner.order.len() > self.capacity {
            if let Some(old) = inner.order.pop_front() {
                inner.entries.remove(&old);
            }
        }
    }

    /// Return the cached report for these inputs or compute and store it.
    ///
    /// Only successful runs are cached; errors (including timeouts) are
    /// returned as-is so a later call can retry.
    pub fn run_cached(
        &self, dataset: &Dataset, request: &AnalysisRequest, config: &AnalysisConfig, token: &CancelToken,
    ) -> AnalysisResult<CompleteAnalysisReport> {
        let started = Instant::now();
        let key = Self::key(dataset, request, config)?;
        if let Some(mut report) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(dataset = %key.dataset_id, "report cache hit");
            report.analysis_timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            report.computation_time_seconds = started.elapsed().as_secs_f64();
            return Ok(report);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let report = run_analysis(dataset, request, config, token)?;
        self.insert(key, report.clone());
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

/// One salted pass over every column name and cell.
fn content_hash(dataset: &Dataset, salt: u64) -> u64 {
    let mut h = DefaultHasher::new();
    salt.hash(&mut h);
    dataset.columns().len().hash(&mut h);
    for column in dataset.columns() {
        column.name.hash(&mut h);
        column.values.len().hash(&mut h);
        for cell in &column.values {
            hash_cell(cell, &mut h);
        }
    }
    h.finish()
}

#[inline]
fn hash_cell<H: Hasher>(cell: &Cell, h: &mut H) {
    match cell {
        Cell::Null => 0u8.hash(h),
        Cell::Number(x) => {
            1u8.hash(h);
            x.to_bits().hash(h);
        }
        Cell::Text(s) => {
            2u8.hash(h);
            s.hash(h);
        }
        Cell::Bool(b) => {
            3u8.hash(h);
            b.hash(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Key sensitivity to data, request and config.
    // - Exact comparison of the stored inputs on lookup.
    // - Hits returning identical sections with refreshed timing.
    // - FIFO eviction at capacity.
    // -------------------------------------------------------------------------

    fn dataset(shift: f64) -> Dataset {
        let values: Vec<f64> = (0..64).map(|t| (t as f64 * 0.7).sin() + shift).collect();
        Dataset::new("cache", vec![Column::numeric("y", values)]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Any change to the inputs changes the key.
    //
    // Given
    // -----
    // - Two datasets differing by a shift, two max_lags, two configs.
    //
    // Expect
    // ------
    // - Same inputs → same key; each change → a different key.
    fn key_tracks_every_input() {
        let cfg = AnalysisConfig::default();
        let req = AnalysisRequest::new("y");
        let k = ReportCache::key(&dataset(0.0), &req, &cfg).unwrap();
        assert_eq!(k, ReportCache::key(&dataset(0.0), &req, &cfg).unwrap());
        assert_ne!(k, ReportCache::key(&dataset(1.0), &req, &cfg).unwrap());
        assert_ne!(k, ReportCache::key(&dataset(0.0), &req.clone().with_max_lags(7), &cfg).unwrap());
        let mut other = cfg.clone();
        other.hurst.random_walk_band = 0.1;
        assert_ne!(k, ReportCache::key(&dataset(0.0), &req, &other).unwrap());
    }

    #[test]
    // Purpose
    // -------
    // Entries only match when the stored inputs are equal, not just the
    // content digest.
    //
    // Given
    // -----
    // - A report stored under one key; a key with the same digest but a
    //   different dataset id; a different column name over the same cells.
    //
    // Expect
    // ------
    // - Only the original key hits; the digest tracks column names.
    fn lookup_compares_stored_inputs() {
        let cache = ReportCache::new(4);
        let cfg = AnalysisConfig::default();
        let req = AnalysisRequest::new("y").with_max_lags(4);
        let key = ReportCache::key(&dataset(0.0), &req, &cfg).unwrap();
        let report = cache.run_cached(&dataset(0.0), &req, &cfg, &CancelToken::unbounded()).unwrap();
        cache.insert(key.clone(), report);

        let mut renamed = key.clone();
        renamed.dataset_id = "other".to_string();
        assert_eq!(renamed.content_digest, key.content_digest);
        assert!(cache.get(&key).is_some());
        assert!(cache.get(&renamed).is_none());

        let values: Vec<f64> = (0..64).map(|t| (t as f64 * 0.7).sin()).collect();
        let relabelled = Dataset::new("cache", vec![Column::numeric("z", values)]).unwrap();
        assert_ne!(ReportCache::key(&relabelled, &req, &cfg).unwrap().content_digest, key.content_digest);
    }

    #[test]
    // Purpose
    // -------
    // A second identical call is served from the cache.
    //
    // Given
    // -----
    // - The same request run twice.
    //
    // Expect
    // ------
    // - Stats (1 hit, 1 miss); identical ACF sections.
    fn run_cached_hits_on_identical_inputs() {
        let cache = ReportCache::new(4);
        let ds = dataset(0.0);
        let req = AnalysisRequest::new("y").with_max_lags(6);
        let cfg = AnalysisConfig::default();
        let first = cache.run_cached(&ds, &req, &cfg, &CancelToken::unbounded()).unwrap();
        let second = cache.run_cached(&ds, &req, &cfg, &CancelToken::unbounded()).unwrap();
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(first.autocorrelation, second.autocorrelation);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    // Purpose
    // -------
    // The oldest entry is evicted first.
    //
    // Given
    // -----
    // - Capacity 2 and three inserts.
    //
    // Expect
    // ------
    // - The first key is gone; the last two remain.
    fn insert_evicts_oldest_entry() {
        let cache = ReportCache::new(2);
        let report = cache
            .run_cached(&dataset(0.0), &AnalysisRequest::new("y"), &AnalysisConfig::default(), &CancelToken::unbounded())
            .unwrap();
        let cfg = AnalysisConfig::default();
        let keys: Vec<CacheKey> = (10..13)
            .map(|lags| ReportCache::key(&dataset(0.0), &AnalysisRequest::new("y").with_max_lags(lags), &cfg).unwrap())
            .collect();
        for key in &keys {
            cache.insert(key.clone(), report.clone());
        }
        assert!(cache.get(&keys[0]).is_none());
        assert!(cache.get(&keys[1]).is_some() && cache.get(&keys[2]).is_some());
        assert_eq!(cache.len(), 2);
    }
}
