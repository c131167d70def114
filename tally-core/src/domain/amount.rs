//! Amount coercion
//!
//! Amounts arrive from forms as text or as numbers and are always stored as
//! floating point. Text is read the lenient way web forms expect: leading
//! whitespace is skipped, the longest numeric prefix wins ("12.5 USD" is 12.5)
//! and anything without a numeric prefix becomes NaN.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// An amount as supplied by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Coerce to a float (NaN when nothing numeric can be read)
    pub fn coerce(&self) -> f64 {
        match self {
            AmountInput::Number(n) => *n,
            AmountInput::Text(text) => parse_float(text),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

/// Coerce an optional amount to its wire value
///
/// Missing or unreadable amounts become NaN, which JSON cannot carry, so the
/// wire value is `null`.
pub fn amount_to_wire(amount: Option<&AmountInput>) -> JsonValue {
    let value = amount.map(AmountInput::coerce).unwrap_or(f64::NAN);
    JsonValue::from(value)
}

/// Parse the longest numeric prefix of `input`
pub fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
