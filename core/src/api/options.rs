//! Configuration options for the Plang engine.

use crate::evaluator::EvaluatorOptions;

/// Configuration options for the Plang engine.
///
/// # Example
///
/// ```
/// use plang_core::api::EngineOptions;
/// use plang_core::evaluator::EvaluatorOptions;
///
/// let options = EngineOptions {
///     evaluator: EvaluatorOptions {
///         max_frames: 10_000,
///         max_call_depth: 500,
///     },
///     prelude: false,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Resource limits applied to every run.
    pub evaluator: EvaluatorOptions,

    /// Install the host prelude (operators, `if`, `while`, ...) on the root
    /// scope.
    ///
    /// Default: true
    pub prelude: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorOptions::default(),
            prelude: true,
        }
    }
}
