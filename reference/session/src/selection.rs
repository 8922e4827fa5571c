//! Asset selection and typed amount.

use serde::Serialize;
use tokenswap_common::Symbol;
use tokenswap_prices::AssetCatalog;

/// What the user has picked and typed.
///
/// `amount_text` is kept exactly as typed so invalid input can still be shown
/// back. `from` and `to` are unset until the first catalog arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwapSelection {
    pub from: Option<Symbol>,
    pub to: Option<Symbol>,
    pub amount_text: String,
}

impl SwapSelection {
    /// Create a selection with both sides and an amount.
    pub fn new(from: impl Into<Symbol>, to: impl Into<Symbol>, amount_text: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            amount_text: amount_text.into(),
        }
    }

    /// Set the "from" asset.
    ///
    /// If it collides with "to", "to" moves to the first catalog symbol that
    /// differs. With a single-symbol catalog the collision stays.
    pub fn set_from(&mut self, symbol: Symbol, symbols: &[Symbol]) {
        if self.to.as_ref() == Some(&symbol) {
            self.to = Some(first_other_than(symbols, &symbol));
        }
        self.from = Some(symbol);
    }

    /// Set the "to" asset. Mirror image of [`set_from`](Self::set_from).
    pub fn set_to(&mut self, symbol: Symbol, symbols: &[Symbol]) {
        if self.from.as_ref() == Some(&symbol) {
            self.from = Some(first_other_than(symbols, &symbol));
        }
        self.to = Some(symbol);
    }

    /// Replace the typed amount verbatim.
    pub fn set_amount_text(&mut self, text: impl Into<String>) {
        self.amount_text = text.into();
    }

    /// Exchange the two sides and clear the amount.
    pub fn swap_direction(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.amount_text.clear();
    }

    /// Seed the selection from a freshly loaded catalog.
    ///
    /// With at least two symbols, "from" becomes the first and "to" the
    /// second. Smaller catalogs leave the selection as it was.
    pub fn on_catalog_loaded(&mut self, catalog: &AssetCatalog) {
        if let [first, second, ..] = catalog.symbols() {
            self.from = Some(first.clone());
            self.to = Some(second.clone());
        }
    }

    /// Clear the typed amount.
    pub fn clear_amount(&mut self) {
        self.amount_text.clear();
    }
}

fn first_other_than(symbols: &[Symbol], symbol: &Symbol) -> Symbol {
    symbols
        .iter()
        .find(|s| *s != symbol)
        .cloned()
        .unwrap_or_else(|| symbol.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn catalog() -> AssetCatalog {
        AssetCatalog::from_prices([
            ("ATOM", dec!(7)),
            ("BTC", dec!(50000)),
            ("ETH", dec!(2500)),
        ])
    }

    fn sym(s: &str) -> Symbol {
        Symbol::new(s)
    }

    #[test]
    fn test_catalog_load_seeds_first_two_symbols() {
        let mut selection = SwapSelection::default();
        selection.on_catalog_loaded(&catalog());

        assert_eq!(selection.from, Some(sym("ATOM")));
        assert_eq!(selection.to, Some(sym("BTC")));
        assert_eq!(selection.amount_text, "");
    }

    #[test]
    fn test_small_catalog_leaves_selection() {
        let mut selection = SwapSelection::default();
        selection.on_catalog_loaded(&AssetCatalog::from_prices([("BTC", dec!(1))]));

        assert_eq!(selection, SwapSelection::default());
    }

    #[test]
    fn test_set_from_collision_moves_to() {
        let catalog = catalog();
        let mut selection = SwapSelection::new("ATOM", "BTC", "1");

        selection.set_from(sym("BTC"), catalog.symbols());

        assert_eq!(selection.from, Some(sym("BTC")));
        assert_eq!(selection.to, Some(sym("ATOM")));
        assert_eq!(selection.amount_text, "1");
    }

    #[test]
    fn test_set_to_collision_moves_from() {
        let catalog = catalog();
        let mut selection = SwapSelection::new("ATOM", "BTC", "");

        selection.set_to(sym("ATOM"), catalog.symbols());

        assert_eq!(selection.to, Some(sym("ATOM")));
        assert_eq!(selection.from, Some(sym("BTC")));
    }

    #[test]
    fn test_single_symbol_catalog_keeps_collision() {
        let catalog = AssetCatalog::from_prices([("BTC", dec!(1))]);
        let mut selection = SwapSelection::new("BTC", "XYZ", "");

        selection.set_to(sym("BTC"), catalog.symbols());

        assert_eq!(selection.from, Some(sym("BTC")));
        assert_eq!(selection.to, Some(sym("BTC")));
    }

    #[test]
    fn test_swap_direction_clears_amount() {
        let mut selection = SwapSelection::new("BTC", "ETH", "2");

        selection.swap_direction();
        assert_eq!(selection.from, Some(sym("ETH")));
        assert_eq!(selection.to, Some(sym("BTC")));
        assert_eq!(selection.amount_text, "");

        selection.set_amount_text("5");
        selection.swap_direction();
        assert_eq!(selection.from, Some(sym("BTC")));
        assert_eq!(selection.to, Some(sym("ETH")));
        assert_eq!(selection.amount_text, "");
    }

    #[test]
    fn test_amount_text_kept_verbatim() {
        let mut selection = SwapSelection::default();
        selection.set_amount_text("  -0.5abc ");
        assert_eq!(selection.amount_text, "  -0.5abc ");
    }

    proptest! {
        #[test]
        fn prop_set_from_never_collides(
            names in proptest::collection::btree_set("[A-Z]{1,4}", 2..8),
            pick in any::<proptest::sample::Index>(),
            start_from in any::<proptest::sample::Index>(),
            start_to in any::<proptest::sample::Index>(),
        ) {
            let catalog = AssetCatalog::from_prices(names.iter().map(|n| (n.clone(), dec!(1))));
            let symbols = catalog.symbols();
            let mut selection = SwapSelection::new(
                start_from.get(symbols).clone(),
                start_to.get(symbols).clone(),
                "1",
            );

            selection.set_from(pick.get(symbols).clone(), symbols);

            prop_assert_ne!(&selection.from, &selection.to);
            prop_assert!(catalog.contains(selection.to.as_ref().unwrap()));
        }

        #[test]
        fn prop_catalog_load_gives_distinct_members(
            names in proptest::collection::btree_set("[A-Za-z]{1,5}", 2..12),
        ) {
            let catalog = AssetCatalog::from_prices(names.iter().map(|n| (n.clone(), dec!(3))));
            let mut selection = SwapSelection::default();

            selection.on_catalog_loaded(&catalog);

            let from = selection.from.clone().unwrap();
            let to = selection.to.clone().unwrap();
            prop_assert_ne!(&from, &to);
            prop_assert!(catalog.contains(&from));
            prop_assert!(catalog.contains(&to));
        }

        #[test]
        fn prop_double_swap_restores_pair(from in "[A-Z]{1,4}", to in "[A-Z]{1,4}", amount in ".{0,8}") {
            let mut selection = SwapSelection::new(from.as_str(), to.as_str(), amount);
            let original = (selection.from.clone(), selection.to.clone());

            selection.swap_direction();
            prop_assert_eq!(&selection.amount_text, "");
            selection.swap_direction();

            prop_assert_eq!((selection.from.clone(), selection.to.clone()), original);
            prop_assert_eq!(&selection.amount_text, "");
        }
    }
}
