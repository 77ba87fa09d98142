//! Runtime evaluation errors.
//!
//! Evaluation stops at the first error; nothing is caught or retried inside
//! the evaluator. Errors raised while a node is being folded carry that
//! node's span when one is known.

use thiserror::Error;

use crate::syntax::Span;
use crate::values::{InvalidParameter, ValueError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The callee (or operator) resolved to `Undefined`.
    #[error("'{name}' is undefined, not callable")]
    UndefinedCallee { name: String, span: Option<Span> },

    #[error("'{name}' is a {type_name}, not callable")]
    NotCallable {
        name: String,
        type_name: &'static str,
        span: Option<Span>,
    },

    /// `:` with no enclosing tuple or block to define on.
    #[error("invalid assignment, must be in object/tuple")]
    InvalidAssignment { span: Option<Span> },

    #[error("cannot assign to {target}")]
    InvalidAssignmentTarget { target: String, span: Option<Span> },

    #[error("{source}")]
    InvalidParameter {
        source: InvalidParameter,
        span: Option<Span>,
    },

    #[error("{source}")]
    Value {
        source: ValueError,
        span: Option<Span>,
    },

    /// Raised by a host function.
    #[error("{message}")]
    Native { message: String, span: Option<Span> },

    #[error("resource limit exceeded: {0}")]
    ResourceExceeded(ResourceExceeded),

    /// The machine itself is in an inconsistent state.
    #[error("internal evaluator error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceExceeded {
    #[error("frame stack depth {depth} exceeds maximum of {max_depth}")]
    FrameStack { depth: usize, max_depth: usize },
    #[error("call depth {depth} exceeds maximum of {max_depth}")]
    CallDepth { depth: usize, max_depth: usize },
}

impl EvalError {
    pub fn native(message: impl Into<String>) -> Self {
        EvalError::Native {
            message: message.into(),
            span: None,
        }
    }

    pub fn span(&self) -> Option<&Span> {
        match self {
            EvalError::UndefinedCallee { span, .. }
            | EvalError::NotCallable { span, .. }
            | EvalError::InvalidAssignment { span }
            | EvalError::InvalidAssignmentTarget { span, .. }
            | EvalError::InvalidParameter { span, .. }
            | EvalError::Value { span, .. }
            | EvalError::Native { span, .. } => span.as_ref(),
            EvalError::ResourceExceeded(_) | EvalError::Internal(_) => None,
        }
    }

    /// Attach `at` unless a more precise span is already recorded.
    pub fn with_span(mut self, at: &Span) -> Self {
        match &mut self {
            EvalError::UndefinedCallee { span, .. }
            | EvalError::NotCallable { span, .. }
            | EvalError::InvalidAssignment { span }
            | EvalError::InvalidAssignmentTarget { span, .. }
            | EvalError::InvalidParameter { span, .. }
            | EvalError::Value { span, .. }
            | EvalError::Native { span, .. } => {
                if span.is_none() {
                    *span = Some(at.clone());
                }
            }
            EvalError::ResourceExceeded(_) | EvalError::Internal(_) => {}
        }
        self
    }
}

impl From<ValueError> for EvalError {
    fn from(source: ValueError) -> Self {
        EvalError::Value { source, span: None }
    }
}

impl From<InvalidParameter> for EvalError {
    fn from(source: InvalidParameter) -> Self {
        EvalError::InvalidParameter { source, span: None }
    }
}

impl From<ResourceExceeded> for EvalError {
    fn from(error: ResourceExceeded) -> Self {
        EvalError::ResourceExceeded(error)
    }
}
