//! engine::cancel — cooperative cancellation and deadlines.
//!
//! A [`CancelToken`] couples a shared cancellation flag with an optional
//! deadline. The orchestrator calls [`CancelToken::checkpoint`] before every
//! [`Stage`]; the numerical routines themselves are never interrupted, so a
//! stage that has started always runs to completion.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::errors::{AnalysisError, AnalysisResult};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Sampling,
    Profiling,
    Autocorrelation,
    PartialAutocorrelation,
    MutualInformation,
    Hurst,
    Stationarity,
    Seasonality,
    /// Final check before the report is assembled.
    Report,
}

impl Stage {
    pub const ORDER: [Stage; 9] = [
        Stage::Sampling,
        Stage::Profiling,
        Stage::Autocorrelation,
        Stage::PartialAutocorrelation,
        Stage::MutualInformation,
        Stage::Hurst,
        Stage::Stationarity,
        Stage::Seasonality,
        Stage::Report,
    ];
}

/// Shared cancellation flag plus deadline.
///
/// Clones share the same flag: cancelling any clone cancels all of them.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    started: Instant,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Token that never expires and is only cancelled explicitly.
    pub fn unbounded() -> Self {
        CancelToken { cancelled: Arc::new(AtomicBool::new(false)), started: Instant::now(), deadline: None }
    }

    /// Token that expires `budget` from now.
    pub fn with_timeout(budget: Duration) -> Self {
        let started = Instant::now();
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            started,
            deadline: started.checked_add(budget),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail with `ComputationTimeout` if the token is cancelled or past its
    /// deadline. `stage` names the stage about to start.
    pub fn checkpoint(&self, stage: Stage) -> AnalysisResult<()> {
        if self.is_cancelled() || self.is_expired() {
            return Err(self.timeout_error(Some(stage)));
        }
        Ok(())
    }

    pub(crate) fn timeout_error(&self, stage: Option<Stage>) -> AnalysisError {
        let budget_ms = self
            .deadline
            .map(|d| d.saturating_duration_since(self.started).as_millis() as u64)
            .unwrap_or(0);
        AnalysisError::ComputationTimeout {
            stage,
            elapsed_ms: self.elapsed().as_millis() as u64,
            budget_ms,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        CancelToken::unbounded()
    }
}
