//! Time utilities and constants for TokenSwap.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// Lower bound of the simulated submission delay (800 ms).
    pub fn min_submission_delay() -> Duration {
        Duration::from_millis(800)
    }

    /// Upper bound (exclusive) of the simulated submission delay (1300 ms).
    pub fn max_submission_delay() -> Duration {
        Duration::from_millis(1300)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds elapsed since `since`, clamped at zero.
pub fn elapsed_ms(since: Timestamp) -> u64 {
    (now() - since).num_milliseconds().max(0) as u64
}
