//! Simulated submission sequencing.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokenswap_common::{now, SubmissionId, Timestamp};
use tracing::debug;

use crate::config::SubmissionConfig;
use crate::error::SubmitRejected;
use crate::state::SubmissionState;
use crate::validator::ValidationState;

/// An accepted submission waiting out its delay.
///
/// Holds no copy of the selection: completion acts on whatever the session
/// holds at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub id: SubmissionId,
    pub delay: Duration,
    pub submitted_at: Timestamp,
}

/// Drives `Idle -> Submitting -> Succeeded`, one submission at a time.
pub struct SubmissionSequencer {
    state: SubmissionState,
    in_flight: Option<SubmissionTicket>,
    min_delay: Duration,
    max_delay: Duration,
    rng: StdRng,
}

impl SubmissionSequencer {
    /// Create a sequencer from configuration.
    pub fn new(config: &SubmissionConfig) -> Self {
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            state: SubmissionState::Idle,
            in_flight: None,
            min_delay: config.min_delay,
            max_delay: config.max_delay,
            rng,
        }
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// The submission currently in flight, if any.
    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight.map(|t| t.id)
    }

    /// Try to start a submission.
    ///
    /// Rejected unless `validation` is valid and nothing is in flight.
    pub fn submit(&mut self, validation: ValidationState) -> Result<SubmissionTicket, SubmitRejected> {
        if !self.state.accepts_submission() {
            return Err(SubmitRejected::AlreadySubmitting);
        }
        if !validation.is_valid() {
            return Err(SubmitRejected::NotValid(validation));
        }

        let ticket = SubmissionTicket {
            id: SubmissionId::new(),
            delay: self.draw_delay(),
            submitted_at: now(),
        };

        self.state = SubmissionState::Submitting;
        self.in_flight = Some(ticket);

        debug!(submission_id = %ticket.id, delay_ms = ticket.delay.as_millis() as u64, "Submission accepted");
        Ok(ticket)
    }

    /// Finish the submission `id`.
    ///
    /// Returns the finished ticket, or `None` for an id that is not in
    /// flight (already finished or abandoned); the state is left alone then.
    pub fn complete(&mut self, id: SubmissionId) -> Option<SubmissionTicket> {
        let ticket = self.in_flight.filter(|t| t.id == id)?;
        self.in_flight = None;
        self.state = SubmissionState::Succeeded;
        Some(ticket)
    }

    /// Clear a `Succeeded` flash back to `Idle`.
    pub fn acknowledge(&mut self) {
        if self.state == SubmissionState::Succeeded {
            self.state = SubmissionState::Idle;
        }
    }

    fn draw_delay(&mut self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(self.rng.gen_range(min..max))
    }
}
