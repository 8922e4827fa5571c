//! Amount parsing.
//!
//! The amount a user types is kept verbatim as text. Everything that needs a
//! number (validation, output calculation) goes through [`Amount::parse`], so
//! both sides always agree on what the text means.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::AmountError;

/// A strictly positive, finite amount parsed from user text.
///
/// Any positive number that fits a 64-bit float is an amount. When the text
/// also fits a [`Decimal`] without rounding to zero, the exact decimal is kept
/// alongside, and arithmetic should prefer it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Amount {
    exact: Option<Decimal>,
    approx: f64,
}

impl Amount {
    /// Parse user-entered text into a positive amount.
    ///
    /// Surrounding whitespace is ignored and scientific notation (`1e3`) is
    /// accepted. Empty text, zero, negatives and anything non-numeric fail,
    /// as do positive numbers too large or too small for a float.
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Only digits, sign, point and exponent; rejects `inf`, `NaN` and
        // digit separators the float and decimal parsers would tolerate.
        let numeric = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
        if !numeric {
            return Err(AmountError::NotANumber(trimmed.to_string()));
        }

        let approx = f64::from_str(trimmed)
            .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;

        if trimmed.starts_with('-') || approx < 0.0 || (approx == 0.0 && !has_nonzero_digit(trimmed)) {
            return Err(AmountError::NonPositive(trimmed.to_string()));
        }
        if approx == 0.0 || !approx.is_finite() {
            return Err(AmountError::OutOfRange(trimmed.to_string()));
        }

        let exact = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
            .filter(|d| *d > Decimal::ZERO);

        Ok(Self { exact, approx })
    }

    /// The exact decimal value, if the text fits one.
    pub fn exact(&self) -> Option<Decimal> {
        self.exact
    }

    /// The value as a float. Always positive and finite.
    pub fn approx(&self) -> f64 {
        self.approx
    }
}

fn has_nonzero_digit(text: &str) -> bool {
    let mantissa = text.split(['e', 'E']).next().unwrap_or(text);
    mantissa.chars().any(|c| matches!(c, '1'..='9'))
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exact {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "{:e}", self.approx),
        }
    }
}
