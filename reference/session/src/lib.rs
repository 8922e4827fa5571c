//! TokenSwap Session
//!
//! The swap calculator state machine. A session owns the asset selection and
//! typed amount, derives validation and output from them on every change,
//! and sequences the simulated submission lifecycle.
//!
//! The pure parts ([`SwapSelection`], [`validate`], [`compute_output`],
//! [`SwapSession`]) can be driven directly. [`SessionRuntime`] wraps a
//! session in a task that runs the catalog load and submission delays and
//! publishes snapshots for a presentation layer to render.

pub mod config;
pub mod error;
pub mod metrics;
pub mod output;
pub mod runtime;
pub mod selection;
pub mod sequencer;
pub mod session;
pub mod state;
pub mod validator;

pub use config::{SessionConfig, SubmissionConfig};
pub use error::{SessionError, SubmitRejected};
pub use metrics::SessionMetrics;
pub use output::{compute_output, Output};
pub use runtime::{SessionHandle, SessionRuntime};
pub use selection::SwapSelection;
pub use sequencer::{SubmissionSequencer, SubmissionTicket};
pub use session::{Effect, Notice, SessionEvent, SessionSnapshot, SwapSession};
pub use state::SubmissionState;
pub use validator::{validate, ValidationState};
