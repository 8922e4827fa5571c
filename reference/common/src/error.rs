//! Error types shared across TokenSwap crates.

use thiserror::Error;

/// Why a piece of amount text is not a usable amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Nothing was entered.
    #[error("Amount is empty")]
    Empty,

    /// The text is not a number.
    #[error("Not a number: {0}")]
    NotANumber(String),

    /// The number is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositive(String),

    /// The number is positive but too large or too small to represent.
    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

impl AmountError {
    /// Get error code for structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AmountError::Empty => "AMOUNT_EMPTY",
            AmountError::NotANumber(_) => "AMOUNT_NOT_A_NUMBER",
            AmountError::NonPositive(_) => "AMOUNT_NON_POSITIVE",
            AmountError::OutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
        }
    }
}
