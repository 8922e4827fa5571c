//! Output calculation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tokenswap_common::{Amount, Symbol};
use tokenswap_prices::AssetCatalog;

use crate::selection::SwapSelection;

/// Converted amount in the "to" asset, or a sentinel when it cannot be known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Output {
    /// Exact result.
    Value(Decimal),
    /// Approximate result outside the decimal range, as `mantissa * 10^exponent`
    /// with the mantissa in `[1, 10)`.
    Scientific { mantissa: f64, exponent: i32 },
    Unavailable,
}

impl Output {
    /// Get the exact value, if there is one.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Output::Value(v) => Some(*v),
            Output::Scientific { .. } | Output::Unavailable => None,
        }
    }

    /// Check if a value is available.
    pub fn is_available(&self) -> bool {
        !matches!(self, Output::Unavailable)
    }

    fn from_log10(log: f64) -> Self {
        let exponent = log.floor();
        Self::normalized(10f64.powf(log - exponent), exponent as i32)
    }

    fn normalized(mut mantissa: f64, mut exponent: i32) -> Self {
        if mantissa >= 10.0 {
            mantissa /= 10.0;
            exponent += 1;
        } else if mantissa < 1.0 {
            mantissa *= 10.0;
            exponent -= 1;
        }
        Output::Scientific { mantissa, exponent }
    }
}

/// Convert the typed amount from the "from" asset into the "to" asset.
///
/// Returns `amount * price(from) / price(to)` at full precision when the
/// result fits a decimal, and a scientific approximation otherwise. Amount and
/// price availability are checked here on their own, so the result does not
/// depend on validation having run.
pub fn compute_output(selection: &SwapSelection, catalog: &AssetCatalog) -> Output {
    let Ok(amount) = Amount::parse(&selection.amount_text) else {
        return Output::Unavailable;
    };

    let price = |side: &Option<Symbol>| side.as_ref().and_then(|s| catalog.price(s));
    let (Some(from_price), Some(to_price)) = (price(&selection.from), price(&selection.to)) else {
        return Output::Unavailable;
    };

    amount
        .exact()
        .and_then(|exact| convert(exact, from_price, to_price))
        .filter(|value| *value > Decimal::ZERO)
        .map(Output::Value)
        .unwrap_or_else(|| approximate(amount.approx(), from_price, to_price))
}

fn convert(amount: Decimal, from_price: Decimal, to_price: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(from_price)
        .and_then(|notional| notional.checked_div(to_price))
        // Dividing first keeps very large amounts in range.
        .or_else(|| {
            from_price
                .checked_div(to_price)
                .and_then(|rate| amount.checked_mul(rate))
        })
}

/// Split a float into its shortest decimal mantissa and exponent.
fn decompose(value: f64) -> Option<(f64, i32)> {
    let text = format!("{value:e}");
    let (mantissa, exponent) = text.split_once('e')?;
    Some((mantissa.parse().ok()?, exponent.parse().ok()?))
}

fn approximate(amount: f64, from_price: Decimal, to_price: Decimal) -> Output {
    let (Some(from), Some(to)) = (from_price.to_f64(), to_price.to_f64()) else {
        return Output::Unavailable;
    };

    let direct = amount * from / to;
    if direct.is_normal() {
        if let Some((mantissa, exponent)) = decompose(direct) {
            return Output::Scientific { mantissa, exponent };
        }
    }

    // Past the float range; stay in log space.
    let log = amount.log10() + from.log10() - to.log10();
    if log.is_finite() {
        Output::from_log10(log)
    } else {
        Output::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{validate, ValidationState};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn catalog() -> AssetCatalog {
        AssetCatalog::from_prices([
            ("BTC", dec!(50000)),
            ("ETH", dec!(2500)),
            ("USDC", dec!(1)),
        ])
    }

    #[test]
    fn test_btc_to_eth() {
        let selection = SwapSelection::new("BTC", "ETH", "2");
        assert_eq!(compute_output(&selection, &catalog()), Output::Value(dec!(40)));
    }

    #[test]
    fn test_fractional_output() {
        let selection = SwapSelection::new("USDC", "ETH", "1000");
        assert_eq!(compute_output(&selection, &catalog()), Output::Value(dec!(0.4)));
    }

    #[test]
    fn test_unavailable_for_bad_amount() {
        for text in ["", "0", "-1", "abc"] {
            let selection = SwapSelection::new("BTC", "ETH", text);
            assert_eq!(compute_output(&selection, &catalog()), Output::Unavailable);
        }
    }

    #[test]
    fn test_unavailable_for_unknown_symbol() {
        let selection = SwapSelection::new("BTC", "XYZ", "1");
        assert_eq!(compute_output(&selection, &catalog()), Output::Unavailable);

        let unset = SwapSelection {
            amount_text: "1".into(),
            ..Default::default()
        };
        assert_eq!(compute_output(&unset, &catalog()), Output::Unavailable);
    }

    #[test]
    fn test_same_asset_still_computes() {
        let selection = SwapSelection::new("ETH", "ETH", "3");
        assert_eq!(compute_output(&selection, &catalog()), Output::Value(dec!(3)));
    }

    fn assert_scientific(output: Output, expected_mantissa: f64, expected_exponent: i32) {
        match output {
            Output::Scientific { mantissa, exponent } => {
                assert_eq!(exponent, expected_exponent);
                assert!((mantissa - expected_mantissa).abs() < 1e-9, "mantissa {mantissa}");
            }
            other => panic!("expected a scientific output, got {other:?}"),
        }
    }

    #[test]
    fn test_decimal_max_amount_still_computes() {
        let selection = SwapSelection::new("BTC", "ETH", "79228162514264337593543950335");
        let catalog = catalog();

        assert_eq!(validate(&selection, &catalog), ValidationState::Valid);
        assert_scientific(compute_output(&selection, &catalog), 1.5845632502852868, 30);
    }

    #[test]
    fn test_amounts_beyond_decimal_range_compute() {
        let catalog = catalog();
        let cases = [
            ("1e29", 2.0, 30),
            ("1e-29", 2.0, -28),
            ("0.00000000000000000000000000001", 2.0, -28),
        ];

        for (text, mantissa, exponent) in cases {
            let selection = SwapSelection::new("BTC", "ETH", text);
            assert_eq!(validate(&selection, &catalog), ValidationState::Valid, "{text}");
            assert_scientific(compute_output(&selection, &catalog), mantissa, exponent);
        }
    }

    #[test]
    fn test_result_past_float_range_uses_logs() {
        let catalog = AssetCatalog::from_prices([
            ("HUGE", Decimal::MAX),
            ("DUST", dec!(0.0000000000000000000000000001)),
        ]);
        let selection = SwapSelection::new("HUGE", "DUST", "1e300");

        assert_scientific(compute_output(&selection, &catalog), 7.922816251426434, 356);
    }

    #[test]
    fn test_large_amount_divides_first() {
        let catalog = AssetCatalog::from_prices([("BIG", dec!(1000000)), ("BIGGER", dec!(2000000))]);
        let selection = SwapSelection::new("BIG", "BIGGER", "10000000000000000000000000");

        assert_eq!(
            compute_output(&selection, &catalog),
            Output::Value(dec!(5000000000000000000000000))
        );
    }

    proptest! {
        #[test]
        fn prop_output_agrees_with_validation(
            from in "(BTC|ETH|USDC|XYZ)",
            to in "(BTC|ETH|USDC|XYZ)",
            amount in "(-?[0-9]{1,6}(\\.[0-9]{1,4})?|[a-z]{0,3}|[0-9]{25,40}|0\\.0{20,40}[1-9]|[1-9]e-?[0-9]{1,3})",
        ) {
            let catalog = catalog();
            let selection = SwapSelection::new(from.as_str(), to.as_str(), amount);

            let output = compute_output(&selection, &catalog);
            match validate(&selection, &catalog) {
                ValidationState::Valid => prop_assert!(output.is_available()),
                ValidationState::EmptyOrNonPositiveAmount | ValidationState::PriceUnavailable => {
                    prop_assert_eq!(output, Output::Unavailable)
                }
                ValidationState::SameAsset => {}
            }
        }
    }
}
