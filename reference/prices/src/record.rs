//! Raw price records as delivered by a price source.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokenswap_common::{Amount, AmountError, Symbol};
use tracing::warn;

use crate::error::{LoadError, LoadResult};

/// One entry of the price feed.
///
/// Both fields are optional because the feed is not trusted: a record without
/// a usable symbol or price is skipped during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub currency: Option<String>,
    pub price: Option<Decimal>,
}

impl PriceRecord {
    /// Create a record with both fields present.
    pub fn new(currency: impl Into<String>, price: Decimal) -> Self {
        Self {
            currency: Some(currency.into()),
            price: Some(price),
        }
    }

    /// Decode a single feed entry.
    ///
    /// Non-string currencies and prices that are not numbers (or numeric
    /// strings) come back as `None` rather than failing the whole feed. So do
    /// positive prices too large or too small for a decimal.
    pub fn from_value(value: &Value) -> Self {
        let currency = value
            .get("currency")
            .and_then(Value::as_str)
            .map(str::to_string);

        let price = match value.get("price") {
            Some(Value::Number(n)) => parse_price(currency.as_deref(), &n.to_string()),
            Some(Value::String(s)) => parse_price(currency.as_deref(), s),
            _ => None,
        };

        Self { currency, price }
    }

    /// The symbol and a strictly positive price, if this record is usable.
    pub fn usable(&self) -> Option<(Symbol, Decimal)> {
        let symbol = Symbol::new(self.currency.as_deref()?);
        if symbol.is_empty() {
            return None;
        }
        let price = self.price.filter(|p| *p > Decimal::ZERO)?;
        Some((symbol, price))
    }
}

fn parse_price(currency: Option<&str>, text: &str) -> Option<Decimal> {
    let error = match Amount::parse(text) {
        Ok(amount) => match amount.exact() {
            Some(price) => return Some(price),
            None => AmountError::OutOfRange(text.trim().to_string()),
        },
        Err(e @ AmountError::OutOfRange(_)) => e,
        // Zero and negative prices are kept here and rejected by `usable`.
        Err(_) => return text.trim().parse::<Decimal>().ok(),
    };

    warn!(
        currency = currency.unwrap_or("-"),
        price = text,
        code = error.error_code(),
        "Dropping price outside the decimal range"
    );
    None
}

/// Decode a JSON feed body into records.
///
/// The body must be a JSON array; its elements are decoded leniently.
pub fn decode_records(body: &str) -> LoadResult<Vec<PriceRecord>> {
    let value: Value = serde_json::from_str(body).map_err(|e| LoadError::Parse(e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items.iter().map(PriceRecord::from_value).collect()),
        other => Err(LoadError::Parse(format!(
            "expected an array of price records, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
