//! Value normalization
//!
//! Different sources spell the same setting differently: `1000` in one YAML
//! file, `"1000"` in another, `" true"` with stray whitespace in a third.
//! [`normalize`] maps every scalar to a [`NormalizedValue`] so that equality of
//! normalized values is the only comparison the diff engine needs.
//!
//! Rules, in order:
//!
//! 1. string candidates are trimmed before any other check
//! 2. `true` / `false` (any case) become booleans
//! 3. numeric strings become integers or floats; integers and floats stay
//!    distinct, float text is canonical (`1.50` and `1.5` are equal)
//! 4. anything else is the trimmed string
//! 5. null scalars become [`NormalizedValue::Null`], which is never equal to the
//!    string `"null"`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::ScalarValue;

/// Canonical form of a leaf value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NormalizedValue {
    Null,
    Bool(bool),
    Integer(i128),
    /// Shortest round-trip rendering of the float
    Float(String),
    String(String),
}

impl NormalizedValue {
    /// Numeric view of integer and float values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(text) => text.parse().ok(),
            _ => None,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(text) => write!(f, "{text}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// Normalize a scalar into its canonical form
pub fn normalize(value: &ScalarValue) -> NormalizedValue {
    match value {
        ScalarValue::Null => NormalizedValue::Null,
        ScalarValue::Bool(b) => NormalizedValue::Bool(*b),
        ScalarValue::Integer(i) => NormalizedValue::Integer(*i),
        ScalarValue::Float(f) => NormalizedValue::Float(canonical_float(*f)),
        ScalarValue::String(s) => normalize_str(s),
    }
}

fn normalize_str(raw: &str) -> NormalizedValue {
    let trimmed = raw.trim();

    if trimmed.eq_ignore_ascii_case("true") {
        return NormalizedValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return NormalizedValue::Bool(false);
    }

    parse_numeric(trimmed).unwrap_or_else(|| NormalizedValue::String(trimmed.to_string()))
}

fn parse_numeric(text: &str) -> Option<NormalizedValue> {
    if text.is_empty() || !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    // Only sign, digits, decimal point and exponent; rejects "inf", "NaN", "0x10"
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    // Zero-padded digits are identifiers (zip codes, file modes), not numbers
    let unsigned = text.trim_start_matches(['+', '-']);
    let integer_digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if integer_digits > 1 && unsigned.starts_with('0') {
        return None;
    }

    if let Ok(i) = text.parse::<i128>() {
        return Some(NormalizedValue::Integer(i));
    }

    let is_float_syntax = text.contains(['.', 'e', 'E']);
    if !is_float_syntax {
        return None;
    }

    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(NormalizedValue::Float(canonical_float(f))),
        _ => None,
    }
}

/// Canonical text for a float: shortest round-trip digits, `-0.0` folded into
/// `0.0`.
pub fn canonical_float(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    format!("{value:?}")
}
