use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::syntax::{Location, Span, UnescapeError};

/// Parser error, located at the offending token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {location}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Text of the offending token (or the node's type name when the error
    /// is found after structural parsing).
    pub token: String,
    pub location: Location,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("mismatched '{found}', expected '{expected}'")]
    MismatchedRegion {
        expected: &'static str,
        found: &'static str,
    },
    #[error("unexpected '{found}' with no open region")]
    UnexpectedRegionClose { found: &'static str },
    #[error("unclosed region '{opener}'")]
    UnclosedRegion { opener: &'static str },
    #[error("separator outside of a tuple, list or array")]
    InvalidSeparator,
    #[error("terminator outside of a program or block")]
    InvalidTerminator,
    #[error("empty element before separator")]
    EmptyElement,
    #[error("expected a member name after '.'")]
    MissingMember,
    #[error("unexpected identifier")]
    UnexpectedIdentifier,
    #[error("missing operand for '{operator}'")]
    MissingOperand { operator: String },
    #[error("too many operands")]
    TooManyOperands,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("invalid string literal: {0}")]
    InvalidString(UnescapeError),
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: impl Into<String>, location: Location, span: Span) -> Self {
        Self {
            kind,
            token: token.into(),
            location,
            span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::MismatchedRegion { .. } => "P001",
            ParseErrorKind::UnexpectedRegionClose { .. } => "P002",
            ParseErrorKind::UnclosedRegion { .. } => "P003",
            ParseErrorKind::InvalidSeparator => "P004",
            ParseErrorKind::InvalidTerminator => "P005",
            ParseErrorKind::EmptyElement => "P006",
            ParseErrorKind::MissingMember => "P007",
            ParseErrorKind::UnexpectedIdentifier => "P008",
            ParseErrorKind::MissingOperand { .. } => "P009",
            ParseErrorKind::TooManyOperands => "P010",
            ParseErrorKind::InvalidNumber => "P011",
            ParseErrorKind::InvalidString(_) => "P012",
        }
    }

    /// Kind message, naming the offending token when the kind doesn't.
    pub fn message(&self) -> String {
        match self.kind {
            ParseErrorKind::UnexpectedIdentifier
            | ParseErrorKind::TooManyOperands
            | ParseErrorKind::EmptyElement
            | ParseErrorKind::MissingMember
            | ParseErrorKind::InvalidNumber => format!("{} '{}'", self.kind, self.token),
            _ => self.kind.to_string(),
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let help = match &self.kind {
            ParseErrorKind::MismatchedRegion { expected, .. } => Some(format!(
                "close the innermost region with '{}' first",
                expected
            )),
            ParseErrorKind::UnclosedRegion { opener } => {
                Some(format!("add the closer matching '{}'", opener))
            }
            ParseErrorKind::InvalidSeparator => Some("use ';' to separate statements".to_string()),
            ParseErrorKind::InvalidTerminator => Some("use ',' to separate elements".to_string()),
            ParseErrorKind::UnexpectedIdentifier => {
                Some("adjacent values need an operator between them".to_string())
            }
            _ => None,
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span: self.span.clone(),
            help,
            code: Some(self.code().to_string()),
        }
    }
}
