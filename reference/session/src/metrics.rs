//! Session counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters updated by the session as events are processed.
pub struct SessionMetrics {
    /// Events applied to the session.
    pub events_total: AtomicU64,
    /// Submissions accepted.
    pub submissions_accepted: AtomicU64,
    /// Submit requests ignored (invalid selection or already in flight).
    pub submissions_rejected: AtomicU64,
    /// Submissions that completed.
    pub submissions_settled: AtomicU64,
    /// Submissions currently in flight.
    pub submissions_active: AtomicU64,
    /// Successful catalog loads.
    pub loads_succeeded: AtomicU64,
    /// Failed catalog loads.
    pub loads_failed: AtomicU64,
}

impl SessionMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            events_total: AtomicU64::new(0),
            submissions_accepted: AtomicU64::new(0),
            submissions_rejected: AtomicU64::new(0),
            submissions_settled: AtomicU64::new(0),
            submissions_active: AtomicU64::new(0),
            loads_succeeded: AtomicU64::new(0),
            loads_failed: AtomicU64::new(0),
        }
    }

    /// Increment events applied.
    pub fn event_applied(&self) {
        self.events_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record submission accepted.
    pub fn submission_accepted(&self) {
        self.submissions_accepted.fetch_add(1, Ordering::Relaxed);
        self.submissions_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record submit request ignored.
    pub fn submission_rejected(&self) {
        self.submissions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record submission completed.
    pub fn submission_settled(&self) {
        self.submissions_settled.fetch_add(1, Ordering::Relaxed);
        self.submissions_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record catalog load outcome.
    pub fn catalog_load(&self, ok: bool) {
        if ok {
            self.loads_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.loads_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_total: self.events_total.load(Ordering::Relaxed),
            submissions_accepted: self.submissions_accepted.load(Ordering::Relaxed),
            submissions_rejected: self.submissions_rejected.load(Ordering::Relaxed),
            submissions_settled: self.submissions_settled.load(Ordering::Relaxed),
            submissions_active: self.submissions_active.load(Ordering::Relaxed),
            loads_succeeded: self.loads_succeeded.load(Ordering::Relaxed),
            loads_failed: self.loads_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub events_total: u64,
    pub submissions_accepted: u64,
    pub submissions_rejected: u64,
    pub submissions_settled: u64,
    pub submissions_active: u64,
    pub loads_succeeded: u64,
    pub loads_failed: u64,
}
