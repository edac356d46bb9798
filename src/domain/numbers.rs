//! Permissive numeric coercion
//!
//! Every money or quantity field accepted by the engine goes through
//! [`coerce_non_negative`]. Absent, non-numeric, and negative input all become
//! zero; nothing here ever fails. Numbers too large for a `Decimal` saturate
//! at `Decimal::MAX`.

use rust_decimal::prelude::*;
use serde_json::Value;

/// Coerce arbitrary JSON input into a non-negative decimal.
pub fn coerce_non_negative(input: &Value) -> Decimal {
    let parsed = match input {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(saturating_from_f64)
            }
        }
        Value::String(s) => parse_str(s),
        _ => None,
    };

    match parsed {
        Some(value) if value.is_sign_positive() => value.normalize(),
        _ => Decimal::ZERO,
    }
}

/// Coerce into a whole, non-negative count (fractions truncate, overflow saturates).
pub fn coerce_count(input: &Value) -> u32 {
    coerce_non_negative(input).trunc().to_u32().unwrap_or(u32::MAX)
}

fn parse_str(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    Decimal::from_str(trimmed)
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
        .or_else(|| trimmed.parse::<f64>().ok().and_then(saturating_from_f64))
}

/// Infinities and NaN are not numbers here.
fn saturating_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).or_else(|| (value > 0.0).then_some(Decimal::MAX))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn negative_numbers_become_zero() {
        assert_eq!(coerce_non_negative(&json!(-50)), Decimal::ZERO);
        assert_eq!(coerce_non_negative(&json!(-0.5)), Decimal::ZERO);
        assert_eq!(coerce_non_negative(&json!("-12")), Decimal::ZERO);
    }

    #[test]
    fn garbage_and_absent_input_become_zero() {
        assert_eq!(coerce_non_negative(&Value::Null), Decimal::ZERO);
        assert_eq!(coerce_non_negative(&json!("abc")), Decimal::ZERO);
        assert_eq!(coerce_non_negative(&json!(true)), Decimal::ZERO);
        assert_eq!(coerce_non_negative(&json!([1, 2])), Decimal::ZERO);
        assert_eq!(coerce_non_negative(&json!("   ")), Decimal::ZERO);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert_eq!(coerce_non_negative(&json!(" 1250.50 ")), Decimal::new(125_050, 2));
        assert_eq!(coerce_non_negative(&json!("1e3")), Decimal::from(1000));
    }

    #[test]
    fn plain_numbers_pass_through() {
        assert_eq!(coerce_non_negative(&json!(42)), Decimal::from(42));
        assert_eq!(coerce_non_negative(&json!(2.25)), Decimal::new(225, 2));
    }

    #[test]
    fn oversized_numbers_saturate() {
        assert_eq!(coerce_non_negative(&json!("9e28")), Decimal::MAX);
        assert_eq!(coerce_non_negative(&json!(1e300)), Decimal::MAX);
        assert_eq!(coerce_non_negative(&json!("-9e28")), Decimal::ZERO);
        assert_eq!(coerce_non_negative(&json!("inf")), Decimal::ZERO);
        assert_eq!(coerce_count(&json!(1e300)), u32::MAX);
    }

    #[test]
    fn counts_truncate() {
        assert_eq!(coerce_count(&json!(12.9)), 12);
        assert_eq!(coerce_count(&json!("-3")), 0);
        assert_eq!(coerce_count(&json!("250")), 250);
    }
}
