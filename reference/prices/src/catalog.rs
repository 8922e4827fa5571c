//! The normalized asset catalog.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tokenswap_common::{now, Symbol, Timestamp};

use crate::record::PriceRecord;

/// Known assets and their prices.
///
/// Every symbol in [`symbols`](Self::symbols) has a price and every priced
/// symbol is listed exactly once, in ascending lexicographic order.
#[derive(Debug, Clone, Serialize)]
pub struct AssetCatalog {
    prices: HashMap<Symbol, Decimal>,
    symbols: Vec<Symbol>,
    loaded_at: Timestamp,
}

/// Result of normalizing a batch of records.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub catalog: AssetCatalog,
    /// Records skipped for a missing symbol or a missing, non-positive or
    /// out-of-range price.
    pub dropped: usize,
    /// Records whose symbol had already been seen (last one wins).
    pub overwritten: usize,
}

impl AssetCatalog {
    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
            symbols: Vec::new(),
            loaded_at: now(),
        }
    }

    /// Build a catalog from raw records, discarding normalization counts.
    pub fn from_records(records: impl IntoIterator<Item = PriceRecord>) -> Self {
        Self::normalize(records).catalog
    }

    /// Build a catalog from symbol/price pairs.
    ///
    /// Pairs go through the same normalization as feed records.
    pub fn from_prices<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Decimal)>) -> Self {
        Self::from_records(pairs.into_iter().map(|(s, p)| PriceRecord::new(s, p)))
    }

    /// Normalize raw records into a catalog.
    ///
    /// Unusable records are dropped; for duplicate symbols the record seen
    /// last wins.
    pub fn normalize(records: impl IntoIterator<Item = PriceRecord>) -> Normalized {
        let mut prices = HashMap::new();
        let mut dropped = 0;
        let mut overwritten = 0;

        for record in records {
            match record.usable() {
                Some((symbol, price)) => {
                    if prices.insert(symbol, price).is_some() {
                        overwritten += 1;
                    }
                }
                None => dropped += 1,
            }
        }

        let mut symbols: Vec<Symbol> = prices.keys().cloned().collect();
        symbols.sort();

        Normalized {
            catalog: Self {
                prices,
                symbols,
                loaded_at: now(),
            },
            dropped,
            overwritten,
        }
    }

    /// Get the price of a symbol.
    pub fn price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    /// Check whether a symbol has a price.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.prices.contains_key(symbol)
    }

    /// Known symbols in ascending order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// First symbol in catalog order that differs from `symbol`.
    pub fn first_other_than(&self, symbol: &Symbol) -> Option<&Symbol> {
        self.symbols.iter().find(|s| *s != symbol)
    }

    /// Look up a symbol by text, returning the catalog's own copy.
    pub fn find(&self, text: &str) -> Option<&Symbol> {
        self.prices.get_key_value(text).map(|(symbol, _)| symbol)
    }

    /// Number of known symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// When this catalog was built.
    pub fn loaded_at(&self) -> Timestamp {
        self.loaded_at
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_symbols_sorted_and_priced() {
        let catalog = AssetCatalog::from_prices([
            ("USDC", dec!(1)),
            ("ETH", dec!(2500)),
            ("ATOM", dec!(7.2)),
            ("BTC", dec!(50000)),
        ]);

        let symbols: Vec<&str> = catalog.symbols().iter().map(Symbol::as_str).collect();
        assert_eq!(symbols, vec!["ATOM", "BTC", "ETH", "USDC"]);
        assert_eq!(catalog.price(&Symbol::new("ETH")), Some(dec!(2500)));
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_unusable_records_dropped() {
        let normalized = AssetCatalog::normalize(vec![
            PriceRecord::new("BTC", dec!(50000)),
            PriceRecord { currency: Some("NUL".into()), price: None },
            PriceRecord { currency: None, price: Some(dec!(3)) },
            PriceRecord::new("", dec!(3)),
            PriceRecord::new("ZERO", dec!(0)),
        ]);

        assert_eq!(normalized.dropped, 4);
        assert_eq!(normalized.catalog.len(), 1);
        assert!(normalized.catalog.contains(&Symbol::new("BTC")));
        assert!(!normalized.catalog.contains(&Symbol::new("NUL")));
    }

    #[test]
    fn test_out_of_range_prices_dropped() {
        let records = crate::record::decode_records(
            r#"[{"currency": "DUST", "price": 1e-30}, {"currency": "MOON", "price": 1e30}, {"currency": "BTC", "price": 50000}]"#,
        )
        .unwrap();

        let normalized = AssetCatalog::normalize(records);

        assert_eq!(normalized.dropped, 2);
        assert_eq!(normalized.catalog.symbols(), &[Symbol::new("BTC")]);
    }

    #[test]
    fn test_duplicate_symbol_last_write_wins() {
        let normalized = AssetCatalog::normalize(vec![
            PriceRecord::new("USDC", dec!(0.99)),
            PriceRecord::new("ETH", dec!(2500)),
            PriceRecord::new("USDC", dec!(1.01)),
        ]);

        assert_eq!(normalized.overwritten, 1);
        assert_eq!(normalized.catalog.len(), 2);
        assert_eq!(normalized.catalog.price(&Symbol::new("USDC")), Some(dec!(1.01)));
    }

    #[test]
    fn test_first_other_than() {
        let catalog = AssetCatalog::from_prices([("A", dec!(1)), ("B", dec!(2)), ("C", dec!(3))]);

        assert_eq!(catalog.first_other_than(&Symbol::new("A")), Some(&Symbol::new("B")));
        assert_eq!(catalog.first_other_than(&Symbol::new("B")), Some(&Symbol::new("A")));

        let single = AssetCatalog::from_prices([("A", dec!(1))]);
        assert_eq!(single.first_other_than(&Symbol::new("A")), None);
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let catalog = AssetCatalog::from_prices([("bNEO", dec!(7.1))]);

        assert_eq!(catalog.find("bNEO"), Some(&Symbol::new("bNEO")));
        assert_eq!(catalog.find("BNEO"), None);
    }

    proptest! {
        #[test]
        fn prop_symbols_and_prices_agree(
            entries in proptest::collection::vec(("[A-Za-z]{0,4}", -5i64..100_000), 0..40)
        ) {
            let catalog = AssetCatalog::from_prices(
                entries.into_iter().map(|(s, p)| (s, Decimal::from(p)))
            );

            for window in catalog.symbols().windows(2) {
                prop_assert!(window[0] < window[1]);
            }
            for symbol in catalog.symbols() {
                let price = catalog.price(symbol);
                prop_assert!(price.is_some());
                prop_assert!(price.unwrap() > Decimal::ZERO);
            }
            prop_assert_eq!(catalog.symbols().len(), catalog.prices.len());
        }
    }
}
