//! TokenSwap Common Types
//!
//! Shared types used across the TokenSwap crates: asset symbols, the
//! amount parser that both validation and output calculation rely on,
//! submission identifiers, and timing defaults.

pub mod amount;
pub mod error;
pub mod identifiers;
pub mod symbol;
pub mod time;

pub use amount::*;
pub use error::*;
pub use identifiers::*;
pub use symbol::*;
pub use time::*;
