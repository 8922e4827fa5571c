//! Submission state definitions.

use serde::{Deserialize, Serialize};

/// Lifecycle of the simulated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A submission is waiting out its delay.
    Submitting,
    /// The last submission just completed. Cleared by the next event.
    Succeeded,
}

impl SubmissionState {
    /// Check if a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }

    /// Check if a new submission may start.
    pub fn accepts_submission(&self) -> bool {
        !self.is_submitting()
    }

    /// Label for the submit control.
    pub fn button_label(&self) -> &'static str {
        match self {
            SubmissionState::Submitting => "Resetting...",
            SubmissionState::Idle | SubmissionState::Succeeded => "Reset",
        }
    }
}
