//! Formatting utilities for statistics display.

use rust_decimal::Decimal;

/// Format a value already expressed in percent.
#[must_use]
pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

/// Format an amount of money with 2 decimal places.
#[must_use]
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Format a ratio, showing "N/A" when it is undefined (zero).
#[must_use]
pub fn format_ratio(value: Decimal) -> String {
    if value.is_zero() {
        "N/A".to_string()
    } else {
        format!("{:.2}", value.round_dp(2))
    }
}
