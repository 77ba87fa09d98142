//! Plang - a small, embeddable, prototype-based scripting language
//!
//! # Overview
//!
//! Every runtime value is a construct: a bag of named properties with an
//! optional prototype. Objects, tuples, lists and scripts are all constructs,
//! and so are scopes. Operators are not built in; `a + b` calls whatever `+`
//! resolves to in the current scope, which the host usually provides through
//! the prelude.
//!
//! # Quick Start
//!
//! ```ignore
//! use plang::{Engine, EngineOptions, Value};
//!
//! let engine = Engine::new(EngineOptions::default());
//!
//! // Register a native function taking one positional argument.
//! engine.register_function("double", "x", |scope| {
//!     let x = scope.get("x", false).as_int().unwrap_or_default();
//!     Ok(Value::int(x * 2).into())
//! })?;
//!
//! let result = engine.eval("point = (x, y) {}; double(point(20, 1).x) + 2")?;
//! assert_eq!(result.as_int(), Some(42));
//! ```
//!
//! # Error reporting
//!
//! Every [`Error`] reduces to [`Diagnostic`]s with source spans. Render them
//! with [`render_error`] or [`render_error_to_string`].

mod error_renderer;

// Re-export public API from plang_core
pub use plang_core::api::{CompiledProgram, Diagnostic, Engine, EngineOptions, Error, Severity};

// Re-export commonly used types and values
pub use plang_core::values::{
    self, Completion, Construct, ConstructKind, ConstructRef, Continuation, Function, NativeFn, Script,
    Signature, Value,
};
pub use plang_core::{lexer, parser, stdlib};

// Re-export errors
pub use plang_core::evaluator::{EvalError, EvaluatorOptions, ResourceExceeded};

pub use error_renderer::{
    render_diagnostics_to_string, render_error, render_error_to, render_error_to_string,
    render_error_to_string_no_color,
};
