//! Simulator metrics.

use std::collections::VecDeque;

use tokenswap_session::metrics::MetricsSnapshot;

/// Metrics collected by the simulator front end.
#[derive(Debug, Clone)]
pub struct SimulationMetrics {
    /// Submissions reported as successful.
    pub completed_swaps: u64,
    /// Scenario expectations that held.
    pub checks_passed: u64,
    /// Scenario expectations that did not hold.
    pub checks_failed: u64,
    /// Submission latency samples (ms).
    latency_samples: VecDeque<u64>,
    /// Maximum samples to keep.
    max_samples: usize,
}

impl SimulationMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self {
            completed_swaps: 0,
            checks_passed: 0,
            checks_failed: 0,
            latency_samples: VecDeque::with_capacity(1024),
            max_samples: 1024,
        }
    }

    /// Record a completed swap.
    pub fn record_swap(&mut self, latency_ms: u64) {
        self.completed_swaps += 1;

        if self.latency_samples.len() >= self.max_samples {
            self.latency_samples.pop_front();
        }
        self.latency_samples.push_back(latency_ms);
    }

    /// Record a scenario expectation.
    pub fn record_check(&mut self, passed: bool) {
        if passed {
            self.checks_passed += 1;
        } else {
            self.checks_failed += 1;
        }
    }

    /// Get average latency in ms.
    pub fn average_latency_ms(&self) -> u64 {
        if self.latency_samples.is_empty() {
            return 0;
        }

        let sum: u64 = self.latency_samples.iter().sum();
        sum / self.latency_samples.len() as u64
    }

    /// Get p50 latency.
    pub fn p50_latency_ms(&self) -> u64 {
        self.percentile_latency(50)
    }

    /// Get max latency.
    pub fn max_latency_ms(&self) -> u64 {
        self.latency_samples.iter().copied().max().unwrap_or(0)
    }

    fn percentile_latency(&self, percentile: usize) -> u64 {
        if self.latency_samples.is_empty() {
            return 0;
        }

        let mut sorted: Vec<_> = self.latency_samples.iter().copied().collect();
        sorted.sort_unstable();

        let idx = (sorted.len() * percentile / 100).min(sorted.len() - 1);
        sorted[idx]
    }

    /// One-line summary combined with the session's own counters.
    pub fn summary(&self, session: &MetricsSnapshot) -> String {
        format!(
            "swaps={} accepted={} ignored={} loads_ok={} loads_failed={} avg_latency_ms={} p50_latency_ms={} max_latency_ms={}",
            self.completed_swaps,
            session.submissions_accepted,
            session.submissions_rejected,
            session.loads_succeeded,
            session.loads_failed,
            self.average_latency_ms(),
            self.p50_latency_ms(),
            self.max_latency_ms(),
        )
    }
}

impl Default for SimulationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
