use core::fmt;

use crate::syntax::{Location, Span};

/// The four bracketed region kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// `( )`
    Tuple,
    /// `[ ]`
    List,
    /// `[| |]`
    Array,
    /// `{ }`
    Block,
}

impl Region {
    pub fn opener(self) -> &'static str {
        match self {
            Region::Tuple => "(",
            Region::List => "[",
            Region::Array => "[|",
            Region::Block => "{",
        }
    }

    pub fn closer(self) -> &'static str {
        match self {
            Region::Tuple => ")",
            Region::List => "]",
            Region::Array => "|]",
            Region::Block => "}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    PreprocessorCommand,
    PreprocessorArgument,
    /// `;`
    Terminator,
    /// `,`
    Separator,
    /// `.`
    Accessor,
    RegionOpen(Region),
    RegionClose(Region),
    Identifier,
    Number,
    String,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Comment => "Comment",
            TokenKind::PreprocessorCommand => "PreprocessCmd",
            TokenKind::PreprocessorArgument => "PreprocessArg",
            TokenKind::Terminator => "Terminator",
            TokenKind::Separator => "Separator",
            TokenKind::Accessor => "Accessor",
            TokenKind::RegionOpen(_) => "RegionOpen",
            TokenKind::RegionClose(_) => "RegionClose",
            TokenKind::Identifier => "Identifier",
            TokenKind::Number => "Number",
            TokenKind::String => "String",
        }
    }
}

/// A lexed token. Immutable once produced.
///
/// `text` is the raw source text: strings keep their quotes and escapes,
/// preprocessor commands drop the leading `#`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: Location,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Location, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>13} {}", self.kind.name(), self.text)
    }
}
