//! Selection validation.

use serde::{Deserialize, Serialize};
use tokenswap_common::{Amount, Symbol};
use tokenswap_prices::AssetCatalog;

use crate::selection::SwapSelection;

/// Whether the current selection can be submitted, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationState {
    /// Ready to submit.
    Valid,
    /// Amount text is empty, not a number, not positive or out of range.
    EmptyOrNonPositiveAmount,
    /// Both sides name the same asset.
    SameAsset,
    /// One of the assets has no known price.
    PriceUnavailable,
}

impl ValidationState {
    /// Check if the selection can be submitted.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationState::Valid)
    }

    /// User-facing message, or `None` when valid.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ValidationState::Valid => None,
            ValidationState::EmptyOrNonPositiveAmount => Some("Enter a valid amount"),
            ValidationState::SameAsset => Some("Tokens must differ"),
            ValidationState::PriceUnavailable => Some("Token price unavailable"),
        }
    }
}

/// Classify a selection against a catalog.
///
/// Rules are checked in order and the first failure wins: amount, then
/// asset identity, then price availability.
pub fn validate(selection: &SwapSelection, catalog: &AssetCatalog) -> ValidationState {
    if Amount::parse(&selection.amount_text).is_err() {
        return ValidationState::EmptyOrNonPositiveAmount;
    }

    if selection.from == selection.to {
        return ValidationState::SameAsset;
    }

    let priced = |side: &Option<Symbol>| side.as_ref().is_some_and(|s| catalog.contains(s));
    if !priced(&selection.from) || !priced(&selection.to) {
        return ValidationState::PriceUnavailable;
    }

    ValidationState::Valid
}
