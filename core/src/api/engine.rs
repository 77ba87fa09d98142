//! The Plang embedding engine.

use tracing::{debug, info};

use super::{CompiledProgram, Diagnostic, EngineOptions, Error};
use crate::evaluator::{EvalError, Evaluator};
use crate::lexer;
use crate::parser;
use crate::stdlib;
use crate::values::{Completion, Construct, ConstructRef, Function, Signature, Value};

/// Owns a root scope and runs programs against it.
///
/// Top-level assignments of every run land on the root scope, so state
/// carries over between runs (which is what the REPL relies on).
///
/// # Example
///
/// ```ignore
/// use plang_core::api::{Engine, EngineOptions};
/// use plang_core::values::Value;
///
/// let engine = Engine::new(EngineOptions::default());
/// engine.register_function("double", "x", |scope| {
///     let x = scope.get("x", false).as_int().unwrap_or_default();
///     Ok(Value::int(x * 2).into())
/// })?;
///
/// let program = engine.compile("double(20) + 2")?;
/// assert_eq!(engine.run(&program)?.as_int(), Some(42));
/// ```
pub struct Engine {
    root: ConstructRef,
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        let root = Construct::object();
        if options.prelude {
            stdlib::install(&root);
        }
        debug!(prelude = options.prelude, "engine created");
        Self { root, options }
    }

    pub fn root(&self) -> &ConstructRef {
        &self.root
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Bind `name` on the root scope.
    pub fn define(&self, name: &str, value: Value) {
        self.root.set(name, value, false);
    }

    /// Register a native function. `signature` uses the parameter list
    /// syntax, e.g. `"a, b, [rest]"`.
    pub fn register_function(
        &self,
        name: &str,
        signature: &str,
        native: impl Fn(&ConstructRef) -> Result<Completion, EvalError> + 'static,
    ) -> Result<(), Error> {
        let signature = Signature::parse_str(signature)
            .map_err(|e| Error::Api(format!("cannot register '{}': {}", name, e)))?;
        self.define(name, Function::new(signature, native).into_value());
        Ok(())
    }

    /// Lex and parse `source`, stopping at the first error.
    pub fn compile(&self, source: &str) -> Result<CompiledProgram, Error> {
        let tokens = lexer::tokenize(source)?;
        let tree = parser::parse(&tokens)?;
        Ok(CompiledProgram::new(source, tree))
    }

    /// Every lexical and syntax problem in `source`, without running it.
    pub fn check(&self, source: &str) -> Vec<Diagnostic> {
        match lexer::tokenize(source) {
            Ok(tokens) => {
                let (_, errors) = parser::parse_recovering(&tokens);
                errors.iter().map(|e| e.to_diagnostic()).collect()
            }
            Err(err) => vec![Diagnostic::from(&err)],
        }
    }

    /// Run a compiled program in the root scope.
    pub fn run(&self, program: &CompiledProgram) -> Result<Value, Error> {
        info!(bytes = program.source().len(), "running program");
        let script = program.script(Some(self.root.clone()));
        let value = Evaluator::new(self.options.evaluator).run_in_scope(&script, self.root.clone())?;
        Ok(value)
    }

    /// Compile and run `source`.
    pub fn eval(&self, source: &str) -> Result<Value, Error> {
        let program = self.compile(source)?;
        self.run(&program)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
