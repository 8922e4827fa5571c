//! Asset symbols.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Ticker-like identifier of a tradable asset.
///
/// Symbols are case-sensitive (`bNEO` and `BNEO` are different assets) and
/// order lexicographically by their raw text, which is the order the catalog
/// presents them in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from its text.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A symbol with no text is never a valid catalog key.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
