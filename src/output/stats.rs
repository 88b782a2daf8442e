//! Run statistics
//!
//! Counters are updated concurrently by the URL producer and the workers, and
//! read once at the end of a run for the summary.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for a single run
#[derive(Debug, Default)]
pub struct VisitStats {
    urls_accepted: AtomicU64,
    urls_rejected: AtomicU64,
    visits_attempted: AtomicU64,
    visits_completed: AtomicU64,
    visits_dropped: AtomicU64,
    outcomes_lost: AtomicU64,
}

/// Point-in-time copy of [`VisitStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// URLs that passed validation and entered the URL stream
    pub urls_accepted: u64,

    /// Inputs that failed validation
    pub urls_rejected: u64,

    /// URLs taken by a worker
    pub visits_attempted: u64,

    /// Attempts that produced an outcome
    pub visits_completed: u64,

    /// Attempts abandoned on a build, transport or cancellation error
    pub visits_dropped: u64,

    /// Outcomes produced but not delivered because the run was cancelled
    pub outcomes_lost: u64,
}

impl VisitStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accepted(&self) {
        self.urls_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.urls_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self) {
        self.visits_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.visits_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.visits_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lost(&self) {
        self.outcomes_lost.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            urls_accepted: self.urls_accepted.load(Ordering::Relaxed),
            urls_rejected: self.urls_rejected.load(Ordering::Relaxed),
            visits_attempted: self.visits_attempted.load(Ordering::Relaxed),
            visits_completed: self.visits_completed.load(Ordering::Relaxed),
            visits_dropped: self.visits_dropped.load(Ordering::Relaxed),
            outcomes_lost: self.outcomes_lost.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters at info level
    pub fn log_summary(&self) {
        let s = self.snapshot();
        tracing::info!(
            urls_accepted = s.urls_accepted,
            urls_rejected = s.urls_rejected,
            visits_completed = s.visits_completed,
            visits_dropped = s.visits_dropped,
            outcomes_lost = s.outcomes_lost,
            "Run summary"
        );
    }
}
