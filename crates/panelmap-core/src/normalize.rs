//! Identifier normalization
//!
//! Cable-length tables and the two GeoJSON layers spell the same inverter or
//! table differently (`"INV 07"`, `"INV07"`, `"INV 7"`). Normalization is the
//! only join mechanism between them, so it is total and idempotent.

use serde_json::Value;

/// Canonicalize a free-text identifier.
///
/// Trims outer whitespace, removes whitespace directly preceding a digit, and
/// strips leading zeros from every run of ASCII digits. Empty input yields `""`.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let compact = remove_space_before_digits(trimmed);
    strip_leading_zeros(&compact)
}

/// Normalize a JSON property value; anything but a string yields `""`.
pub fn normalize_value(value: &Value) -> String {
    value.as_str().map(normalize_id).unwrap_or_default()
}

fn remove_space_before_digits(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = String::new();

    for c in input.chars() {
        if c.is_whitespace() {
            pending.push(c);
            continue;
        }
        if !c.is_ascii_digit() {
            out.push_str(&pending);
        }
        pending.clear();
        out.push(c);
    }
    out.push_str(&pending);
    out
}

fn strip_leading_zeros(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut digits = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            flush_digits(&mut digits, &mut out);
            out.push(c);
        }
    }
    flush_digits(&mut digits, &mut out);
    out
}

fn flush_digits(digits: &mut String, out: &mut String) {
    if digits.is_empty() {
        return;
    }
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        out.push('0');
    } else {
        out.push_str(significant);
    }
    digits.clear();
}
