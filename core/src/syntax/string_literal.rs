/// String literal escaping and unescaping.
///
/// Converts between runtime strings (with real newline characters) and the
/// quoted source form accepted by the lexer (`'a\n'` or `"a\n"`).
use core::fmt;
use thiserror::Error;

/// Errors that can occur when unescaping string literals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    /// Invalid escape sequence (e.g., `\q`)
    #[error("invalid escape sequence '{seq}' at position {pos}")]
    InvalidEscape { pos: usize, seq: String },
    /// Invalid hex digit in Unicode escape
    #[error("invalid hex digit in '{seq}' at position {pos}")]
    InvalidHexDigit { pos: usize, seq: String },
    /// Incomplete Unicode escape (not enough digits)
    #[error("incomplete Unicode escape at position {pos}: expected {expected} digits, got {got}")]
    IncompleteUnicodeEscape {
        pos: usize,
        expected: usize,
        got: usize,
    },
    /// Invalid Unicode scalar value
    #[error("invalid Unicode scalar value U+{value:X} at position {pos}")]
    InvalidUnicodeScalar { pos: usize, value: u32 },
    /// Literal is missing its surrounding quotes
    #[error("string literal is not quoted")]
    Unquoted,
}

/// Escape a runtime string into a single-quoted literal.
///
/// - `'` → `\'`
/// - `\` → `\\`
/// - newline, carriage return, tab and NUL use their short escapes
/// - other control characters → `\uNNNN`
pub fn escape_string(f: &mut impl fmt::Write, s: &str) -> fmt::Result {
    f.write_char('\'')?;
    for ch in s.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\0' => f.write_str("\\0")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

/// Unescape a quoted string token (quotes included) into its runtime value.
///
/// Supports `\n`, `\r`, `\t`, `\0`, `\\`, `\'`, `\"`, `\u{X..}` (one to six
/// hex digits), the fixed-width `\uNNNN` and line continuation (backslash
/// followed by a newline).
pub fn unescape_string(raw: &str) -> Result<String, UnescapeError> {
    let quote = raw.chars().next().ok_or(UnescapeError::Unquoted)?;
    if !(quote == '\'' || quote == '"') || raw.len() < 2 || !raw.ends_with(quote) {
        return Err(UnescapeError::Unquoted);
    }
    let input = &raw[1..raw.len() - 1];

    if !input.contains('\\') {
        return Ok(input.to_string());
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }

        match chars.next() {
            Some((_, 'n')) => output.push('\n'),
            Some((_, 'r')) => output.push('\r'),
            Some((_, 't')) => output.push('\t'),
            Some((_, '0')) => output.push('\0'),
            Some((_, '\\')) => output.push('\\'),
            Some((_, '"')) => output.push('"'),
            Some((_, '\'')) => output.push('\''),
            Some((_, '\n')) => {}
            Some((upos, 'u')) if chars.peek().is_some_and(|(_, c)| *c == '{') => {
                chars.next();
                let mut value = 0u32;
                let mut got = 0;
                loop {
                    match chars.next() {
                        Some((_, '}')) if got > 0 => break,
                        Some((_, c)) if got < 6 => {
                            let digit = c.to_digit(16).ok_or_else(|| {
                                UnescapeError::InvalidHexDigit {
                                    pos: upos + 1,
                                    seq: format!("\\u{{{}", c),
                                }
                            })?;
                            value = (value << 4) | digit;
                            got += 1;
                        }
                        _ => {
                            return Err(UnescapeError::InvalidEscape {
                                pos,
                                seq: "\\u{".to_string(),
                            });
                        }
                    }
                }
                let c = char::from_u32(value)
                    .ok_or(UnescapeError::InvalidUnicodeScalar { pos, value })?;
                output.push(c);
            }
            Some((upos, 'u')) => {
                let mut value = 0u32;
                let mut got = 0;
                while got < 4 {
                    match chars.next() {
                        Some((_, c)) => {
                            let digit = c.to_digit(16).ok_or_else(|| {
                                UnescapeError::InvalidHexDigit {
                                    pos: upos + 1,
                                    seq: format!("\\u{}", c),
                                }
                            })?;
                            value = (value << 4) | digit;
                            got += 1;
                        }
                        None => {
                            return Err(UnescapeError::IncompleteUnicodeEscape {
                                pos,
                                expected: 4,
                                got,
                            });
                        }
                    }
                }
                let c = char::from_u32(value)
                    .ok_or(UnescapeError::InvalidUnicodeScalar { pos, value })?;
                output.push(c);
            }
            Some((_, other)) => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: format!("\\{}", other),
                });
            }
            None => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: "\\".to_string(),
                });
            }
        }
    }

    Ok(output)
}
