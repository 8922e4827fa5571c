//! Session error types.

use thiserror::Error;

use crate::validator::ValidationState;

/// Errors from talking to a running session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session task has stopped and no longer takes events.
    #[error("Session is closed")]
    Closed,

    /// The session task ended abnormally.
    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

/// Why a submit request was ignored.
///
/// Not a failure of the session: the request is simply a no-op.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// The selection does not validate.
    #[error("Selection is not valid: {0:?}")]
    NotValid(ValidationState),

    /// A submission is already in flight.
    #[error("A submission is already in flight")]
    AlreadySubmitting,
}
