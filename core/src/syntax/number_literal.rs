//! Number literal parsing.
//!
//! The lexer hands over raw number text (`42`, `0x2A`, `1_000`, `3.5`,
//! `.5`, `1e9`, `2.5e-3`); this module turns it into an integer or a float.

/// A parsed numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

/// Parse the text of a Number token.
///
/// Returns `None` when the text is not a valid literal (e.g. `12ab`, or an
/// integer that overflows `i64`).
pub fn parse_number(text: &str) -> Option<Number> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }

    let lower = cleaned.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return i64::from_str_radix(digits, radix).ok().map(Number::Integer);
        }
    }

    if lower.bytes().all(|b| b.is_ascii_digit()) {
        return lower.parse().ok().map(Number::Integer);
    }

    let is_float_text = lower
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'+' | b'-'));
    if is_float_text && (lower.contains('.') || lower.contains('e')) {
        return lower.parse().ok().map(Number::Float);
    }

    None
}
