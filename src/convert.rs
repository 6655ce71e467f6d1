//! Conversion between two currencies of a rate table
//!
//! Each rate says how many units of a currency make up one base unit (one
//! bitcoin for the default provider), so converting `amount` of `from` into
//! `to` is `amount / from_rate * to_rate`. A result is only produced when every
//! input is usable; otherwise the conversion is pending.

use crate::data::RateTable;

/// Converts `amount` given the base-unit rates of both currencies
///
/// Returns `None` unless both rates are positive and finite and the amount is
/// non-negative and finite. No rounding is applied.
pub fn convert(amount: f64, from_rate: f64, to_rate: f64) -> Option<f64> {
    let rate_ok = |rate: f64| rate.is_finite() && rate > 0.0;
    if !rate_ok(from_rate) || !rate_ok(to_rate) || !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Some(amount / from_rate * to_rate)
}

/// Converts between two codes of `table`
///
/// Pending (`None`) when either code is missing from the table.
pub fn convert_in(table: &RateTable, amount: f64, from: &str, to: &str) -> Option<f64> {
    let from_rate = table.get(from)?.value;
    let to_rate = table.get(to)?.value;
    convert(amount, from_rate, to_rate)
}

/// Formats a converted amount for display (4 decimal places)
pub fn format_amount(value: f64) -> String {
    format!("{:.4}", value)
}
