//! Integration tests for the bounded analysis worker pool.
//!
//! Purpose
//! -------
//! - Exercise `engine::AnalysisPool` under the conditions a service hits:
//!   concurrent submissions over one shared dataset, a saturated queue,
//!   expired deadlines, client-side cancellation and shutdown.
//!
//! Coverage
//! --------
//! - `engine::pool`: admission (`Overloaded`, `PoolClosed`), deadlines,
//!   `JobHandle::{wait, wait_timeout, cancel}`.
//! - `engine::cache`: reuse of a report across pool submissions.
//!
//! Exclusions
//! ----------
//! - Report contents beyond a consistency check; see
//!   `integration_analysis_pipeline.rs`.
//! - Timing-sensitive assertions: every test keeps the single worker busy
//!   with a job orders of magnitude slower than the submissions it races.
use std::sync::Arc;
use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use ts_diagnostics::{
    data::{AnalysisRequest, Column, Dataset},
    engine::{AnalysisConfig, AnalysisPool, PoolConfig, ReportCache},
    errors::AnalysisError,
};

fn noise_dataset(n: usize, seed: u64) -> Arc<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() - 0.5).collect();
    Arc::new(Dataset::new("pool", vec![Column::numeric("value", values)]).unwrap())
}

/// A job that takes far longer than a burst of submissions.
fn heavy() -> (Arc<Dataset>, AnalysisRequest) {
    (noise_dataset(5_000, 99), AnalysisRequest::new("value").with_max_lags(20))
}

fn config() -> Arc<AnalysisConfig> {
    Arc::new(AnalysisConfig::default())
}

#[test]
// Purpose
// -------
// Concurrent jobs over one shared dataset all complete identically.
//
// Given
// -----
// - 4 workers, 8 submissions of the same request.
//
// Expect
// ------
// - Every job succeeds with the same ACF section.
fn concurrent_jobs_share_one_dataset() {
    let pool = AnalysisPool::new(PoolConfig::with_workers(4)).unwrap();
    let ds = noise_dataset(256, 1);
    let cfg = config();
    let req = AnalysisRequest::new("value").with_max_lags(10);

    let handles: Vec<_> = (0..8).map(|_| pool.submit(Arc::clone(&ds), req.clone(), Arc::clone(&cfg)).unwrap()).collect();
    let reports: Vec<_> = handles.into_iter().map(|h| h.wait().unwrap()).collect();
    for r in &reports[1..] {
        assert_eq!(r.autocorrelation, reports[0].autocorrelation);
    }
}

#[test]
// Purpose
// -------
// A full queue sheds load instead of blocking.
//
// Given
// -----
// - 1 worker, queue depth 1, ten back-to-back heavy submissions.
//
// Expect
// ------
// - At least one `Overloaded { queue_depth: 1 }`; accepted jobs are kept
//   alive until the end of the test.
fn saturated_queue_returns_overloaded() {
    let pool = AnalysisPool::new(PoolConfig::new(1, 1, Duration::from_secs(30))).unwrap();
    let (ds, req) = heavy();
    let cfg = config();

    let mut accepted = Vec::new();
    let mut shed = 0;
    for _ in 0..10 {
        match pool.submit(Arc::clone(&ds), req.clone(), Arc::clone(&cfg)) {
            Ok(handle) => accepted.push(handle),
            Err(AnalysisError::Overloaded { queue_depth }) => {
                assert_eq!(queue_depth, 1);
                shed += 1;
            }
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert!(shed >= 1, "no submission was shed");
    assert!(!accepted.is_empty());
}

#[test]
// Purpose
// -------
// A job whose deadline has already passed is answered without running.
//
// Given
// -----
// - A zero timeout.
//
// Expect
// ------
// - `ComputationTimeout` with a zero budget.
fn zero_timeout_job_times_out() {
    let pool = AnalysisPool::new(PoolConfig::with_workers(1)).unwrap();
    let handle = pool
        .submit_with_timeout(noise_dataset(64, 2), AnalysisRequest::new("value"), config(), Duration::ZERO)
        .unwrap();
    match handle.wait() {
        Err(AnalysisError::ComputationTimeout { budget_ms, .. }) => assert_eq!(budget_ms, 0),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
// Purpose
// -------
// Client-side cancellation and bounded waiting both end in a timeout.
//
// Given
// -----
// - 1 worker busy with a heavy job; a queued job that is cancelled, and
//   a bounded wait on the heavy job.
//
// Expect
// ------
// - The cancelled job reports `ComputationTimeout` and is marked
//   cancelled; cancelling the busy job frees the worker early.
// - `wait_timeout(1 ms)` on the heavy job reports `ComputationTimeout`.
fn cancel_and_wait_timeout_report_timeouts() {
    let pool = AnalysisPool::new(PoolConfig::new(1, 4, Duration::from_secs(30))).unwrap();
    let (ds, req) = heavy();
    let cfg = config();

    let busy = pool.submit(Arc::clone(&ds), req.clone(), Arc::clone(&cfg)).unwrap();
    let queued = pool.submit(noise_dataset(64, 3), AnalysisRequest::new("value"), Arc::clone(&cfg)).unwrap();
    queued.cancel();
    busy.cancel();
    assert!(queued.is_cancelled());
    assert!(matches!(queued.wait(), Err(AnalysisError::ComputationTimeout { .. })));

    let next = pool.submit(ds, req, cfg).unwrap();
    assert_ne!(next.id(), busy.id());
    assert!(matches!(next.wait_timeout(Duration::from_millis(1)), Err(AnalysisError::ComputationTimeout { .. })));
}

#[test]
// Purpose
// -------
// A shut-down pool refuses new work.
//
// Given
// -----
// - A pool that completes one job and is then shut down.
//
// Expect
// ------
// - The first job succeeds; a later submission fails with `PoolClosed`.
fn submit_after_shutdown_is_rejected() {
    let mut pool = AnalysisPool::new(PoolConfig::with_workers(2)).unwrap();
    let ds = noise_dataset(128, 4);
    let report = pool.submit(Arc::clone(&ds), AnalysisRequest::new("value").with_max_lags(5), config()).unwrap().wait();
    assert!(report.is_ok());

    pool.shutdown();
    let err = pool.submit(ds, AnalysisRequest::new("value"), config()).unwrap_err();
    assert_eq!(err, AnalysisError::PoolClosed);
}

#[test]
// Purpose
// -------
// A pool built with a cache serves repeated requests from it.
//
// Given
// -----
// - Two sequential submissions of the same inputs.
//
// Expect
// ------
// - Cache stats of one hit and one miss; identical sections.
fn pool_with_cache_reuses_reports() {
    let cache = Arc::new(ReportCache::new(8));
    let pool = AnalysisPool::with_cache(PoolConfig::with_workers(1), Arc::clone(&cache)).unwrap();
    let ds = noise_dataset(200, 5);
    let req = AnalysisRequest::new("value").with_max_lags(8);
    let cfg = config();

    let first = pool.submit(Arc::clone(&ds), req.clone(), Arc::clone(&cfg)).unwrap().wait().unwrap();
    let second = pool.submit(ds, req, cfg).unwrap().wait().unwrap();
    assert_eq!(cache.stats(), (1, 1));
    assert_eq!(first.stationarity_tests, second.stationarity_tests);
    assert_eq!(cache.len(), 1);
}
