//! Stack-machine evaluator for parsed programs.
//!
//! The evaluator walks a [`SyntaxTree`](crate::parser::SyntaxTree) with an
//! explicit frame stack instead of host recursion. Each composite node
//! becomes a frame; leaves push values onto a register stack; finished frames
//! fold their registers into a single result.
//!
//! ## Design Principles
//!
//! - **Never panic**: malformed trees and adversarial programs surface as
//!   [`EvalError`]s
//! - **Stack-safe**: frame and call depth are bounded by [`EvaluatorOptions`]
//! - **Dynamic scoping**: a called script's scope inherits from its caller
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use plang_core::{lexer, parser, values::{Script, Value}};
//!
//! let tree = parser::parse(&lexer::tokenize("x = 40; x")?)?;
//! let script = Script::program(Rc::new(tree), None);
//! let result = script.evaluate(&Value::UNDEFINED, None)?;
//! assert_eq!(result.as_int(), Some(40));
//! ```

mod error;
mod eval;

#[cfg(test)]
mod eval_test;

pub use error::{EvalError, ResourceExceeded};
pub use eval::Evaluator;

/// Resource limits for a single evaluator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Maximum number of live frames.
    ///
    /// Default: 100_000
    pub max_frames: usize,

    /// Maximum number of nested script invocations.
    ///
    /// Default: 10_000
    pub max_call_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_frames: 100_000,
            max_call_depth: 10_000,
        }
    }
}
