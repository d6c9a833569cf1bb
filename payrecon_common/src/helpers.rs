use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a major-unit price such as `35.00`. Negative values are rejected.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value.trim()).ok().filter(|d| !d.is_sign_negative())
}
