//! Terminal rendering of the swap form.

use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};

use tokenswap_common::Symbol;
use tokenswap_session::{Notice, Output, SessionSnapshot};

use crate::icons::IconResolver;

/// Form title.
pub const TITLE: &str = "Currency Swap";

/// Shown once after a submission completes.
pub const SUCCESS_MESSAGE: &str = "Swap Successful!";

/// Shown in place of the form when prices never loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load prices. Please try again later.";

const FRACTION_DIGITS: u32 = 6;

/// Exponents past this are shown in scientific notation.
const MAX_GROUPED_EXPONENT: i32 = 27;

/// Format an output for display: floored to six fractional digits with
/// thousands grouping, or `--` when there is nothing to show.
pub fn format_output(output: &Output) -> String {
    match *output {
        Output::Value(value) => format_amount(value),
        Output::Scientific { mantissa, exponent } => format_scientific(mantissa, exponent),
        Output::Unavailable => "--".to_string(),
    }
}

/// Format `mantissa * 10^exponent` with the same flooring as [`format_amount`].
///
/// Values that fit a decimal are grouped like any other amount; larger ones
/// keep six fractional digits of the mantissa, as in `1.584563e+30`.
pub fn format_scientific(mantissa: f64, exponent: i32) -> String {
    if exponent < -(FRACTION_DIGITS as i32) {
        return "0".to_string();
    }

    if exponent <= MAX_GROUPED_EXPONENT {
        if let Ok(value) = Decimal::from_scientific(&format!("{mantissa}e{exponent}")) {
            return format_amount(value);
        }
    }

    let scale = 10f64.powi(FRACTION_DIGITS as i32);
    let floored = (mantissa * scale).floor() / scale;
    format!("{floored}e+{exponent}")
}

/// Floor `value` to six fractional digits and group the integer part.
pub fn format_amount(value: Decimal) -> String {
    let floored = value
        .round_dp_with_strategy(FRACTION_DIGITS, RoundingStrategy::ToNegativeInfinity)
        .normalize();

    let text = floored.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if floored.is_sign_negative() && !floored.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Render the whole form for `snapshot`.
pub fn render_form(snapshot: &SessionSnapshot, icons: &IconResolver) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {TITLE} ==");

    if !snapshot.catalog_loaded {
        let status = if snapshot.load_error.is_some() {
            LOAD_FAILED_MESSAGE
        } else {
            "Loading prices..."
        };
        let _ = writeln!(out, "{status}");
        return out;
    }

    let selection = &snapshot.selection;
    let amount = if selection.amount_text.is_empty() {
        "Amount"
    } else {
        selection.amount_text.as_str()
    };

    let _ = writeln!(out, "{}  {}", token_cell(selection.from.as_ref(), icons), amount);
    let _ = writeln!(out, "    \u{21C5}");
    let _ = writeln!(
        out,
        "{}  {}",
        token_cell(selection.to.as_ref(), icons),
        format_output(&snapshot.output)
    );

    if let Some(message) = snapshot.error_message() {
        let _ = writeln!(out, "! {message}");
    }
    if let Some(error) = &snapshot.load_error {
        let _ = writeln!(out, "! {error}");
    }

    let label = snapshot.submission.button_label();
    if snapshot.can_submit() {
        let _ = writeln!(out, "[ {label} ]");
    } else {
        let _ = writeln!(out, "[ {label} ] (disabled)");
    }

    out
}

/// Message shown for a one-shot notice, if any.
pub fn render_notice(notice: &Notice) -> Option<&'static str> {
    match notice {
        Notice::SwapSucceeded { .. } => Some(SUCCESS_MESSAGE),
        Notice::CatalogLoaded { .. } | Notice::CatalogFailed { .. } => None,
    }
}

fn token_cell(symbol: Option<&Symbol>, icons: &IconResolver) -> String {
    match symbol {
        Some(symbol) => format!("{:<8} <{}>", symbol.as_str(), icons.icon_for(symbol)),
        None => format!("{:<8} <{}>", "-", icons.fallback_url()),
    }
}

/// Render the symbol list, several per line.
pub fn render_symbols(symbols: &[Symbol]) -> String {
    symbols
        .chunks(8)
        .map(|row| {
            row.iter()
                .map(|s| format!("{:<10}", s.as_str()))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
