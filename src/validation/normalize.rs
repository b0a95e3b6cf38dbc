//! Lenient coercions applied while deserializing raw form input.
//!
//! Admin forms post numbers as strings, blanks or nulls. These helpers
//! reproduce the form rules: blank, null and unparsable values become 0,
//! and `"unlimited"` in any case becomes the unbounded sentinel.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{TradingBound, UNLIMITED};

/// Coerce a numeric-like value. Negative results are kept so the
/// validator can reject them with a field message.
pub fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Null => 0.0,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Array(_) | Value::Object(_) => 0.0,
    };

    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Coerce the upper trading bound.
pub fn coerce_bound(value: &Value) -> TradingBound {
    match value {
        Value::String(text) if text.trim().eq_ignore_ascii_case(UNLIMITED) => {
            TradingBound::Unlimited
        }
        other => TradingBound::Amount(coerce_number(other)),
    }
}

pub fn loose_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

pub fn loose_bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TradingBound, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_bound(&value))
}

/// Trim a string field; null becomes empty.
pub fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).unwrap_or_default())
}

/// Trim and lowercase; used for usernames and emails.
pub fn lowercased<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    trimmed(deserializer).map(|s| s.to_lowercase())
}

/// Keep the secret verbatim; null becomes empty.
pub fn verbatim<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blanks_and_garbage_become_zero() {
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!("   ")), 0.0);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
        assert_eq!(coerce_number(&json!([1, 2])), 0.0);
    }

    #[test]
    fn numeric_strings_and_numbers_parse() {
        assert_eq!(coerce_number(&json!(" 12.5 ")), 12.5);
        assert_eq!(coerce_number(&json!(7)), 7.0);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(coerce_number(&json!("-3")), -3.0);
    }

    #[test]
    fn unlimited_is_case_insensitive() {
        assert_eq!(coerce_bound(&json!("UNLIMITED")), TradingBound::Unlimited);
        assert_eq!(coerce_bound(&json!(" Unlimited ")), TradingBound::Unlimited);
        assert_eq!(coerce_bound(&json!("500")), TradingBound::Amount(500.0));
        assert_eq!(coerce_bound(&json!("unlimitedish")), TradingBound::Amount(0.0));
        assert_eq!(coerce_bound(&json!(null)), TradingBound::Amount(0.0));
    }
}
