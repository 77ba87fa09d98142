//! Source text to token stream.
//!
//! Raw scanning is done by a `logos` automaton; a small post-pass then
//! handles the context-sensitive bits (leading-dot numbers, preprocessor
//! lines split into command and arguments) and attaches line/column
//! locations.

mod token;


pub use token::{Region, Token, TokenKind};

use logos::Logos;
use thiserror::Error;

use crate::syntax::{LineIndex, Location, Span};

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {location}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub text: String,
    pub location: Location,
    pub span: Span,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0C\x{A0}]+")]
#[logos(error = LexErrorKind)]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"#[^\n]*")]
    Directive,

    #[token(";")]
    Terminator,

    #[token(",")]
    Separator,

    #[token(".")]
    Accessor,

    #[token("(")]
    TupleOpen,
    #[token(")")]
    TupleClose,
    #[token("[")]
    ListOpen,
    #[token("]")]
    ListClose,
    #[token("[|")]
    ArrayOpen,
    #[token("|]")]
    ArrayClose,
    #[token("{")]
    BlockOpen,
    #[token("}")]
    BlockClose,

    // A run of operator characters. A run may not start with `//` or `/*`,
    // those open comments.
    #[regex(r"[+\-*%!^&|~=:?<>][+\-*/%!^&|~=:?<>]*")]
    #[regex(r"/([+\-%!^&|~=:?<>][+\-*/%!^&|~=:?<>]*)?")]
    Special,

    #[token("'", |lex| quoted(lex, '\''))]
    #[token("\"", |lex| quoted(lex, '"'))]
    String,

    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9][0-9A-Za-z_]*)?", signed_exponent)]
    Number,

    #[regex(r#"[^ \t\r\n\x0C\x{A0}()\[\]{}+\-*/%!^&|~=:?<>;,#.'"0-9][^ \t\r\n\x0C\x{A0}()\[\]{}+\-*/%!^&|~=:?<>;,#.'"]*"#)]
    Word,
}

fn block_comment(lex: &mut logos::Lexer<RawToken>) -> Result<(), LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(lex.remainder().len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

/// Extend a decimal literal ending in `e` over a signed exponent (`1e-5`).
fn signed_exponent(lex: &mut logos::Lexer<RawToken>) {
    let text = lex.slice().to_ascii_lowercase();
    let radix = ["0x", "0o", "0b"].iter().any(|prefix| text.starts_with(prefix));
    if radix || !text.ends_with('e') {
        return;
    }
    let rest = lex.remainder().as_bytes();
    if !matches!(rest.first(), Some(b'+' | b'-')) {
        return;
    }
    let digits = rest[1..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 {
        lex.bump(1 + digits);
    }
}

fn quoted(lex: &mut logos::Lexer<RawToken>, quote: char) -> Result<(), LexErrorKind> {
    let mut escaped = false;
    for (i, c) in lex.remainder().char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            lex.bump(i + c.len_utf8());
            return Ok(());
        }
    }
    lex.bump(lex.remainder().len());
    Err(LexErrorKind::UnterminatedString)
}

/// Tokenize `source`, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let lines = LineIndex::new(source);
    let raw = RawToken::lexer(source)
        .spanned()
        .map(|(result, range)| match result {
            Ok(raw) => Ok((raw, range)),
            Err(kind) => Err(LexError {
                kind,
                text: source[range.clone()].to_string(),
                location: lines.location(source, range.start),
                span: Span(range),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let (kind, ref range) = raw[i];
        let text = &source[range.clone()];
        let location = lines.location(source, range.start);
        let span = Span(range.clone());
        i += 1;

        let kind = match kind {
            RawToken::LineComment | RawToken::BlockComment => TokenKind::Comment,
            RawToken::Directive => {
                push_directive(&mut tokens, source, &lines, range.start, text);
                continue;
            }
            RawToken::Terminator => TokenKind::Terminator,
            RawToken::Separator => TokenKind::Separator,
            RawToken::Accessor => {
                if let Some((RawToken::Number, next)) = raw.get(i).cloned() {
                    if next.start == range.end && dot_starts_number(tokens.last()) {
                        i += 1;
                        tokens.push(Token::new(
                            TokenKind::Number,
                            &source[range.start..next.end],
                            location,
                            Span::new(range.start, next.end),
                        ));
                        continue;
                    }
                }
                TokenKind::Accessor
            }
            RawToken::TupleOpen => TokenKind::RegionOpen(Region::Tuple),
            RawToken::TupleClose => TokenKind::RegionClose(Region::Tuple),
            RawToken::ListOpen => TokenKind::RegionOpen(Region::List),
            RawToken::ListClose => TokenKind::RegionClose(Region::List),
            RawToken::ArrayOpen => TokenKind::RegionOpen(Region::Array),
            RawToken::ArrayClose => TokenKind::RegionClose(Region::Array),
            RawToken::BlockOpen => TokenKind::RegionOpen(Region::Block),
            RawToken::BlockClose => TokenKind::RegionClose(Region::Block),
            RawToken::Special | RawToken::Word => TokenKind::Identifier,
            RawToken::String => TokenKind::String,
            RawToken::Number => TokenKind::Number,
        };
        tokens.push(Token::new(kind, text, location, span));
    }

    Ok(tokens)
}

/// A `.` directly followed by digits is a number unless it continues an
/// access or follows a value (`a.0`, `(x).1`). Operator runs are not values.
fn dot_starts_number(previous: Option<&Token>) -> bool {
    match previous {
        None => true,
        Some(token) => match token.kind {
            TokenKind::Identifier => token.text.chars().all(is_special),
            TokenKind::Accessor
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::RegionClose(_) => false,
            _ => true,
        },
    }
}

fn is_special(c: char) -> bool {
    "+-*/%!^&|~=:?<>".contains(c)
}

/// `#command arg1 arg2` becomes one command token and one token per argument.
fn push_directive(
    tokens: &mut Vec<Token>,
    source: &str,
    lines: &LineIndex,
    start: usize,
    text: &str,
) {
    let body = &text[1..];
    let mut words = body.split_whitespace().map(|word| {
        let offset = start + 1 + (word.as_ptr() as usize - body.as_ptr() as usize);
        (word, offset)
    });

    let (command, offset) = words.next().unwrap_or(("", start + 1));
    tokens.push(Token::new(
        TokenKind::PreprocessorCommand,
        command,
        lines.location(source, start),
        Span::new(start, offset + command.len()),
    ));
    for (word, offset) in words {
        tokens.push(Token::new(
            TokenKind::PreprocessorArgument,
            word,
            lines.location(source, offset),
            Span::new(offset, offset + word.len()),
        ));
    }
}
