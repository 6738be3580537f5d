//! # Type Coercion
//!
//! Defensive conversion of raw cell values to integer identifiers.
//!
//! A value that cannot be read as an integer never fails the caller; it
//! degrades to the supplied default, which the ingestor treats as absent.

/// Convert `raw` to an integer, or return `default`.
///
/// Accepted: surrounding whitespace, an optional sign, ASCII digits, and a
/// decimal form whose fractional digits are all zero (`"12.0"`), which is
/// how spreadsheet exports often write integer columns. Everything else
/// (absent, empty, text, `"1.5"`, out of `i64` range) yields `default`.
#[must_use]
pub fn coerce_int(raw: Option<&str>, default: Option<i64>) -> Option<i64> {
    raw.and_then(parse_integral).or(default)
}

fn parse_integral(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let integral = match trimmed.split_once('.') {
        Some((whole, fraction)) => {
            if !fraction.bytes().all(|b| b == b'0') || !has_digits(whole) {
                return None;
            }
            whole
        }
        None => trimmed,
    };
    if !has_digits(integral) {
        return None;
    }
    integral.parse::<i64>().ok()
}

/// Non-empty run of ASCII digits behind an optional sign.
fn has_digits(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// TESTS
// =============================================================================
