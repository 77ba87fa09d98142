//! Public API for the Plang scripting language.
//!
//! An [`Engine`] owns a root scope, optionally preloaded with the host
//! prelude, compiles source text into [`CompiledProgram`]s and runs them.
//! All failures surface as [`Error`], which reduces to [`Diagnostic`]s for
//! rendering.
//!
//! # Example
//!
//! ```ignore
//! use plang_core::api::{Engine, EngineOptions};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let result = engine.eval("x = 40; x + 2")?;
//! assert_eq!(result.as_int(), Some(42));
//! ```

pub mod engine;
pub mod error;
pub mod expression;
pub mod options;

#[cfg(test)]
mod engine_test;

pub use engine::Engine;
pub use error::{Diagnostic, Error, Severity};
pub use expression::CompiledProgram;
pub use options::EngineOptions;
