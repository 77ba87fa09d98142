//! Public error types for the Plang API.
//!
//! Lexer, parser and evaluator errors are converted to these types at the
//! API boundary. Every variant can be reduced to [`Diagnostic`]s carrying a
//! source span, which is what renderers consume.

use std::fmt;

use thiserror::Error;

use crate::evaluator::{EvalError, ResourceExceeded};
use crate::lexer::{LexError, LexErrorKind};
use crate::parser::ParseError;
use crate::syntax::Span;

/// Public error type for all Plang operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Invalid API usage (e.g. a malformed signature string).
    #[error("API error: {0}")]
    Api(String),

    /// Lexing or parsing failed.
    #[error("compilation failed with {} error(s)", error_count(.diagnostics))]
    Compilation { diagnostics: Vec<Diagnostic> },

    /// Evaluation stopped with an error.
    #[error("runtime error: {}", .diagnostic.message)]
    Runtime { diagnostic: Diagnostic },

    /// Frame stack or call depth limit hit.
    #[error("resource limit exceeded: {0}")]
    ResourceExceeded(ResourceExceeded),
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

impl Error {
    /// All diagnostics carried by this error, for rendering.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Api(message) => vec![Diagnostic::error(message.clone(), Span::default())],
            Error::Compilation { diagnostics } => diagnostics.clone(),
            Error::Runtime { diagnostic } => vec![diagnostic.clone()],
            Error::ResourceExceeded(error) => {
                vec![Diagnostic::error(error.to_string(), Span::default())]
            }
        }
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "P001") for documentation lookup.
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            help: None,
            code: None,
        }
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - the program cannot run.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        let (code, help) = match err.kind {
            LexErrorKind::UnexpectedCharacter => ("L001", None),
            LexErrorKind::UnterminatedString => ("L002", Some("close the string with its opening quote")),
            LexErrorKind::UnterminatedComment => ("L003", Some("close the comment with '*/'")),
        };
        Diagnostic {
            severity: Severity::Error,
            message: err.kind.to_string(),
            span: err.span.clone(),
            help: help.map(str::to_string),
            code: Some(code.to_string()),
        }
    }
}

impl From<&EvalError> for Diagnostic {
    fn from(err: &EvalError) -> Self {
        let code = match err {
            EvalError::UndefinedCallee { .. } => "E001",
            EvalError::NotCallable { .. } => "E002",
            EvalError::InvalidAssignment { .. } => "E003",
            EvalError::InvalidAssignmentTarget { .. } => "E004",
            EvalError::InvalidParameter { .. } => "E005",
            EvalError::Value { .. } => "E006",
            EvalError::Native { .. } => "E007",
            EvalError::ResourceExceeded(_) => "E008",
            EvalError::Internal(_) => "E009",
        };
        let help = match err {
            EvalError::UndefinedCallee { name, .. } => Some(format!(
                "nothing named '{}' is in scope; operators need a prelude binding",
                name
            )),
            EvalError::InvalidAssignment { .. } => {
                Some("use '=' to assign a variable".to_string())
            }
            _ => None,
        };
        Diagnostic {
            severity: Severity::Error,
            message: err.to_string(),
            span: err.span().cloned().unwrap_or_default(),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Compilation {
            diagnostics: vec![Diagnostic::from(&err)],
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Compilation {
            diagnostics: vec![err.to_diagnostic()],
        }
    }
}

impl From<Vec<ParseError>> for Error {
    fn from(errors: Vec<ParseError>) -> Self {
        Error::Compilation {
            diagnostics: errors.iter().map(|e| e.to_diagnostic()).collect(),
        }
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::ResourceExceeded(error) => Error::ResourceExceeded(error),
            err => Error::Runtime {
                diagnostic: Diagnostic::from(&err),
            },
        }
    }
}
