//! Loose numeric coercion and rounding
//!
//! Quotation payloads carry numbers as JSON numbers, numeric strings, `null`,
//! or not at all. Every numeric derivation in the crate goes through
//! [`to_number`] so a valid `"0"` is never confused with a missing value.

use serde::{Deserialize, Serialize};

/// A numeric-ish JSON value as it arrives from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    /// Coerce to a finite `f64`, falling back to 0
    pub fn value(&self) -> f64 {
        let raw = match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_numeric_text(s),
            Self::Other(v) => match v {
                serde_json::Value::Bool(true) => 1.0,
                serde_json::Value::Bool(false) | serde_json::Value::Null => 0.0,
                serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                serde_json::Value::String(s) => parse_numeric_text(s),
                _ => f64::NAN,
            },
        };
        if raw.is_finite() {
            raw
        } else {
            0.0
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Numeric-string parsing with the empty string counting as zero
fn parse_numeric_text(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Coerce an optional loose number; missing values are 0
pub fn to_number(value: Option<&LooseNumber>) -> f64 {
    value.map(LooseNumber::value).unwrap_or(0.0)
}

/// Round to cents, half away from zero
///
/// Binary noise below a millionth of a cent is snapped first so that values
/// written as `10.005` round up the way they read.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let cents = (value * 100.0 * 1_000_000.0).round() / 1_000_000.0;
    cents.round() / 100.0
}

/// Division that yields 0 instead of NaN or infinity
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        quotient
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number_numbers_and_strings() {
        assert_eq!(to_number(Some(&LooseNumber::from(12.5))), 12.5);
        assert_eq!(to_number(Some(&LooseNumber::from("7.25"))), 7.25);
        assert_eq!(to_number(Some(&LooseNumber::from("  3 "))), 3.0);
        assert_eq!(to_number(Some(&LooseNumber::from("0"))), 0.0);
        assert_eq!(to_number(Some(&LooseNumber::from(""))), 0.0);
    }

    #[test]
    fn test_to_number_invalid_falls_back_to_zero() {
        assert_eq!(to_number(None), 0.0);
        assert_eq!(to_number(Some(&LooseNumber::from("abc"))), 0.0);
        assert_eq!(to_number(Some(&LooseNumber::from("inf"))), 0.0);
        assert_eq!(to_number(Some(&LooseNumber::from("NaN"))), 0.0);
        assert_eq!(
            to_number(Some(&LooseNumber::Other(serde_json::json!({"a": 1})))),
            0.0
        );
    }

    #[test]
    fn test_to_number_json_shapes() {
        let parsed: Vec<LooseNumber> =
            serde_json::from_str(r#"[1, "2.5", null, true, false, [1]]"#).unwrap();
        let values: Vec<f64> = parsed.iter().map(LooseNumber::value).collect();
        assert_eq!(values, vec![1.0, 2.5, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(10.005), 10.01);
        assert_eq!(round2(-2.345), -2.35);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(f64::NAN), 0.0);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 4.0), 2.5);
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
    }
}
