//! Session configuration.

use std::time::Duration;

use tokenswap_common::constants;

/// Simulated submission configuration.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    /// Shortest simulated delay.
    pub min_delay: Duration,
    /// Longest simulated delay (exclusive unless equal to `min_delay`).
    pub max_delay: Duration,
    /// Seed for the delay draw. Entropy-seeded when unset.
    pub seed: Option<u64>,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            min_delay: constants::min_submission_delay(),
            max_delay: constants::max_submission_delay(),
            seed: None,
        }
    }
}

/// Main session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Submission configuration.
    pub submission: SubmissionConfig,
    /// Capacity of the inbound event queue.
    pub event_buffer: usize,
    /// Capacity of the notice broadcast.
    pub notice_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            submission: SubmissionConfig::default(),
            event_buffer: 64,
            notice_buffer: 16,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(ms) = std::env::var("SWAP_SUBMIT_MIN_DELAY_MS") {
            if let Ok(ms) = ms.parse() {
                config.submission.min_delay = Duration::from_millis(ms);
            }
        }

        if let Ok(ms) = std::env::var("SWAP_SUBMIT_MAX_DELAY_MS") {
            if let Ok(ms) = ms.parse() {
                config.submission.max_delay = Duration::from_millis(ms);
            }
        }

        if let Ok(seed) = std::env::var("SWAP_SEED") {
            if let Ok(seed) = seed.parse() {
                config.submission.seed = Some(seed);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.submission.min_delay > self.submission.max_delay {
            return Err("Minimum submission delay cannot exceed maximum delay".to_string());
        }

        if self.event_buffer == 0 {
            return Err("Event buffer cannot be zero".to_string());
        }

        if self.notice_buffer == 0 {
            return Err("Notice buffer cannot be zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.submission.min_delay, Duration::from_millis(800));
        assert_eq!(config.submission.max_delay, Duration::from_millis(1300));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = SessionConfig::default();
        config.submission.min_delay = Duration::from_secs(2);
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.event_buffer = 0;
        assert!(config.validate().is_err());
    }
}
