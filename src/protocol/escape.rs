//! Escaping rules for the textual parts of a line.
//!
//! Line protocol has three escaping contexts:
//! - measurement names: comma and space
//! - tag keys, tag values and field keys: comma, equals sign and space
//! - string field values: double quote and backslash, inside double quotes
//!
//! Each function appends to an output buffer so a whole line is built with a
//! single allocation.

/// Append `value` to `out`, backslash-escaping any char in `special`.
fn push_escaped(out: &mut String, value: &str, special: &[char]) {
    for c in value.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Append a measurement name, escaping commas and spaces.
pub fn push_measurement(out: &mut String, value: &str) {
    push_escaped(out, value, &[',', ' ']);
}

/// Append a tag key, tag value or field key, escaping commas, equals signs
/// and spaces.
pub fn push_key(out: &mut String, value: &str) {
    push_escaped(out, value, &[',', '=', ' ']);
}

/// Append a double-quoted string field value.
pub fn push_string_field(out: &mut String, value: &str) {
    out.push('"');
    push_escaped(out, value, &['"', '\\']);
    out.push('"');
}

/// Escape a measurement name.
pub fn escape_measurement(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    push_measurement(&mut out, value);
    out
}

/// Escape a tag key, tag value or field key.
pub fn escape_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    push_key(&mut out, value);
    out
}

/// Quote and escape a string field value.
pub fn quote_string_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    push_string_field(&mut out, value);
    out
}
