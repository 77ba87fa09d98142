use plang_core::lexer::{self, LexErrorKind, TokenKind};
use reedline::{ValidationResult, Validator};

/// Number of regions left open at the end of `buffer`, or `None` when the
/// buffer cannot be lexed.
pub fn calculate_depth(buffer: &str) -> Option<usize> {
    let tokens = lexer::tokenize(buffer).ok()?;
    let mut depth: isize = 0;
    for token in &tokens {
        match token.kind {
            TokenKind::RegionOpen(_) => depth += 1,
            TokenKind::RegionClose(_) => depth -= 1,
            _ => {}
        }
    }
    Some(depth.max(0) as usize)
}

/// Keeps the REPL reading lines while a region, string or block comment is
/// still open.
pub struct RegionValidator;

impl Validator for RegionValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match lexer::tokenize(line) {
            Err(err) if err.kind != LexErrorKind::UnexpectedCharacter => {
                ValidationResult::Incomplete
            }
            Err(_) => ValidationResult::Complete,
            Ok(_) => match calculate_depth(line) {
                Some(depth) if depth > 0 => ValidationResult::Incomplete,
                _ => ValidationResult::Complete,
            },
        }
    }
}
