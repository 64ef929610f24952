//! engine::pool — bounded worker pool with load shedding and deadlines.
//!
//! Purpose
//! -------
//! Run analyses on a fixed set of worker threads fed by a bounded
//! `crossbeam_channel` queue, so the caller controls parallelism and
//! back-pressure independently of request volume.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisPool::submit`] never blocks: a full queue returns
//!   `Overloaded { queue_depth }`, a shut-down pool returns `PoolClosed`.
//! - Every job carries a [`CancelToken`] whose deadline starts at
//!   submission. A worker that dequeues an expired or cancelled job answers
//!   `ComputationTimeout` without running it; otherwise the orchestrator
//!   checks the token between stages.
//! - [`JobHandle`] receives the single reply. Waiting with a timeout,
//!   calling `cancel`, or dropping the handle cancels the job.
//! - [`AnalysisPool::shutdown`] (also run on drop) closes the queue, lets
//!   workers drain what was already accepted, and joins them.
//!
//! Invariants & assumptions
//! ------------------------
//! - Datasets and configs are shared through `Arc`; workers never mutate
//!   them, so concurrent jobs over one dataset are safe.
//! - A panicking analysis is caught on the worker: its handle receives
//!   `Internal { reason }` and the worker keeps serving the queue.
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, error, info, warn};

use crate::{
    data::{AnalysisRequest, Dataset},
    engine::{
        cache::ReportCache,
        cancel::CancelToken,
        config::{AnalysisConfig, PoolConfig},
        orchestrator::run_analysis,
        report::CompleteAnalysisReport,
    },
    errors::{AnalysisError, AnalysisResult},
};

type Reply = AnalysisResult<CompleteAnalysisReport>;

struct Job {
    id: u64,
    dataset: Arc<Dataset>,
    request: AnalysisRequest,
    config: Arc<AnalysisConfig>,
    token: CancelToken,
    reply: Sender<Reply>,
}

/// Fixed-size pool of analysis workers.
pub struct AnalysisPool {
    config: PoolConfig,
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    next_id: AtomicU64,
}

impl AnalysisPool {
    /// Start `config.workers` worker threads.
    ///
    /// Errors
    /// ------
    /// - `InvalidConfig` if the pool configuration is out of range.
    pub fn new(config: PoolConfig) -> AnalysisResult<Self> {
        Self::start(config, None)
    }

    /// Like [`AnalysisPool::new`], serving repeated inputs from `cache`.
    pub fn with_cache(config: PoolConfig, cache: Arc<ReportCache>) -> AnalysisResult<Self> {
        Self::start(config, Some(cache))
    }

    fn start(config: PoolConfig, cache: Option<Arc<ReportCache>>) -> AnalysisResult<Self> {
        config.validate()?;
        let (sender, receiver) = bounded::<Job>(config.queue_depth);
        let workers = (0..config.workers)
            .map(|i| {
                let rx = receiver.clone();
                let cache = cache.clone();
                std::thread::Builder::new()
                    .name(format!("analysis-worker-{i}"))
                    .spawn(move || worker_loop(i, rx, cache))
                    .map_err(|e| AnalysisError::InvalidConfig {
                        field: "pool.workers",
                        reason: format!("failed to spawn worker thread: {e}"),
                    })
            })
            .collect::<AnalysisResult<Vec<_>>>()?;
        info!(workers = config.workers, queue_depth = config.queue_depth, "analysis pool started");
        Ok(AnalysisPool { config, sender: Some(sender), workers, next_id: AtomicU64::new(0) })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Submit a job with the pool's default timeout.
    pub fn submit(
        &self, dataset: Arc<Dataset>, request: AnalysisRequest, config: Arc<AnalysisConfig>,
    ) -> AnalysisResult<JobHandle> {
        self.submit_with_timeout(dataset, request, config, self.config.default_timeout)
    }

    /// Submit a job whose deadline is `timeout` from now.
    ///
    /// Errors
    /// ------
    /// - `Overloaded { queue_depth }` when the queue is full.
    /// - `PoolClosed` after shutdown.
    pub fn submit_with_timeout(
        &self, dataset: Arc<Dataset>, request: AnalysisRequest,
        config: Arc<AnalysisConfig>, timeout: Duration,
    ) -> AnalysisResult<JobHandle> {
        let sender = self.sender.as_ref().ok_or(AnalysisError::PoolClosed)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancelToken::with_timeout(timeout);
        let (reply, receiver) = bounded(1);
        let job = Job { id, dataset, request, config, token: token.clone(), reply };

        match sender.try_send(job) {
            Ok(()) => {
                debug!(job = id, "job accepted");
                Ok(JobHandle { id, receiver, token })
            }
            Err(TrySendError::Full(_)) => {
                warn!(job = id, queue_depth = self.config.queue_depth, "queue full; job shed");
                Err(AnalysisError::Overloaded { queue_depth: self.config.queue_depth })
            }
            Err(TrySendError::Disconnected(_)) => Err(AnalysisError::PoolClosed),
        }
    }

    /// Stop accepting jobs, drain the queue and join the workers.
    pub fn shutdown(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("analysis worker panicked");
            }
        }
        info!("analysis pool stopped");
    }
}

impl Drop for AnalysisPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Handle to one submitted job.
///
/// Dropping the handle cancels the job.
#[derive(Debug)]
pub struct JobHandle {
    id: u64,
    receiver: Receiver<Reply>,
    token: CancelToken,
}

impl JobHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the job replies.
    pub fn wait(self) -> Reply {
        self.receiver.recv().unwrap_or(Err(AnalysisError::PoolClosed))
    }

    /// Block for at most `timeout`; on expiry the job is cancelled and
    /// `ComputationTimeout` is returned.
    pub fn wait_timeout(self, timeout: Duration) -> Reply {
        match self.receiver.recv_timeout(timeout) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) => {
                self.token.cancel();
                Err(self.token.timeout_error(None))
            }
            Err(RecvTimeoutError::Disconnected) => Err(AnalysisError::PoolClosed),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

//
// ---------- Private helpers (compact docs) ----------
//

fn worker_loop(index: usize, jobs: Receiver<Job>, cache: Option<Arc<ReportCache>>) {
    debug!(worker = index, "worker started");
    while let Ok(job) = jobs.recv() {
        let reply = if job.token.is_cancelled() || job.token.is_expired() {
            debug!(job = job.id, "job expired before start");
            Err(job.token.timeout_error(None))
        } else {
            run_guarded(job.id, || match &cache {
                Some(c) => c.run_cached(&job.dataset, &job.request, &job.config, &job.token),
                None => run_analysis(&job.dataset, &job.request, &job.config, &job.token),
            })
        };
        if let Err(AnalysisError::ComputationTimeout { stage, elapsed_ms, .. }) = &reply {
            warn!(job = job.id, ?stage, elapsed_ms, "job timed out");
        }
        if job.reply.send(reply).is_err() {
            debug!(job = job.id, "client disconnected before reply");
        }
    }
    debug!(worker = index, "worker stopped");
}

/// Run one job, turning a panic into `Internal` so the worker survives.
fn run_guarded(job: u64, run: impl FnOnce() -> Reply) -> Reply {
    catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(job, %reason, "analysis panicked");
        Err(AnalysisError::Internal { reason })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // A panic inside a job becomes an `Internal` reply instead of unwinding
    // through the worker.
    //
    // Given
    // -----
    // - A job body that panics with a formatted message, then one that
    //   returns normally on the same thread.
    //
    // Expect
    // ------
    // - `Internal` carrying the panic message; the next job still runs.
    fn run_guarded_converts_panics_and_keeps_running() {
        let reply = run_guarded(7, || panic!("section {} blew up", 3));
        assert_eq!(reply, Err(AnalysisError::Internal { reason: "section 3 blew up".to_string() }));

        let next = run_guarded(8, || Err(AnalysisError::PoolClosed));
        assert_eq!(next, Err(AnalysisError::PoolClosed));
    }
}
