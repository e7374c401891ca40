//! Literal checks for strict validation mode.
//!
//! These only run when the encoder is built with
//! [`Validation::Strict`](super::Validation::Strict); the default mode
//! trusts the CSV text verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::FieldType;

/// Integer literal accepted by line protocol (before the `i` suffix).
static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?\d+$").unwrap());

/// Float literal, including exponent notation.
static FLOAT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").unwrap());

/// Boolean spellings accepted by InfluxDB.
const BOOLEAN_LITERALS: [&str; 10] = [
    "t", "T", "true", "True", "TRUE", "f", "F", "false", "False", "FALSE",
];

/// Check if a string is an integer literal that fits in a signed 64-bit int.
pub fn is_integer_literal(s: &str) -> bool {
    INTEGER_REGEX.is_match(s) && s.parse::<i64>().is_ok()
}

/// Check if a string is a float literal.
pub fn is_float_literal(s: &str) -> bool {
    FLOAT_REGEX.is_match(s)
}

/// Check if a string is a boolean literal.
pub fn is_boolean_literal(s: &str) -> bool {
    BOOLEAN_LITERALS.contains(&s)
}

/// Check whether `value` can be written as a field of type `field_type`.
pub fn is_valid_literal(value: &str, field_type: FieldType) -> bool {
    match field_type {
        FieldType::Int => is_integer_literal(value),
        FieldType::Float => is_float_literal(value),
        FieldType::Bool => is_boolean_literal(value),
        FieldType::String => true,
    }
}
