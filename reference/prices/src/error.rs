//! Catalog loading error types.

use thiserror::Error;

/// Errors that can occur while loading the price catalog.
///
/// Any of these fails the whole load: there is no partially loaded catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The request could not be sent or the body could not be read.
    #[error("Transport error from {source_name}: {message}")]
    Transport { source_name: String, message: String },

    /// The source answered with a non-success HTTP status.
    #[error("HTTP status {status} from {source_name}")]
    HttpStatus { source_name: String, status: u16 },

    /// The payload is not a JSON array of price records.
    #[error("Malformed price payload: {0}")]
    Parse(String),

    /// A local price file could not be read.
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
}

impl LoadError {
    /// Get error code for structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            LoadError::Transport { .. } => "TRANSPORT",
            LoadError::HttpStatus { .. } => "HTTP_STATUS",
            LoadError::Parse(_) => "PARSE",
            LoadError::Io { .. } => "IO",
        }
    }
}

/// Result type for catalog loading.
pub type LoadResult<T> = Result<T, LoadError>;
