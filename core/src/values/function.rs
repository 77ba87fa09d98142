//! Callable constructs: native host functions and interpreted scripts.

use std::rc::Rc;

use super::construct::{Construct, ConstructKind, ConstructRef, Value};
use super::signature::Signature;
use crate::evaluator::{EvalError, Evaluator, EvaluatorOptions};
use crate::parser::{NodeId, SyntaxTree};

/// What a native function hands back to the evaluator.
pub enum Completion {
    Value(Value),
    /// Ask the evaluator to invoke `callee` with `args` in place of this
    /// function's result. Lets natives such as `if` run a script body without
    /// nesting a second evaluator.
    Call { callee: Value, args: Value },
    /// Invoke `callee` with `args`, then pass its result to `then`, whose
    /// completion replaces this function's result. The callee runs on the
    /// same machine and counts against its limits.
    Then {
        callee: Value,
        args: Value,
        then: Continuation,
    },
}

/// Resumes a native once the callee of a [`Completion::Then`] has produced a
/// value.
pub type Continuation = Box<dyn FnOnce(Value) -> Result<Completion, EvalError>>;

impl From<Value> for Completion {
    fn from(value: Value) -> Self {
        Completion::Value(value)
    }
}

/// Host callable. Receives the bound argument scope, whose prototype is the
/// caller's scope.
pub type NativeFn = Rc<dyn Fn(&ConstructRef) -> Result<Completion, EvalError>>;

/// A native function with the signature its arguments are bound against.
#[derive(Clone)]
pub struct Function {
    pub signature: Signature,
    pub native: NativeFn,
}

impl Function {
    pub fn new(
        signature: Signature,
        native: impl Fn(&ConstructRef) -> Result<Completion, EvalError> + 'static,
    ) -> Self {
        Self {
            signature,
            native: Rc::new(native),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Ref(Construct::new(ConstructKind::Function(self)))
    }
}

/// An interpreted callable: a signature plus a body node in a shared syntax
/// tree, optionally closed over a context scope.
#[derive(Clone)]
pub struct Script {
    pub signature: Signature,
    pub tree: Rc<SyntaxTree>,
    pub body: NodeId,
    pub context: Option<ConstructRef>,
}

impl Script {
    pub fn new(
        signature: Signature,
        tree: Rc<SyntaxTree>,
        body: NodeId,
        context: Option<ConstructRef>,
    ) -> Self {
        Self {
            signature,
            tree,
            body,
            context,
        }
    }

    /// A script whose body is the whole program.
    pub fn program(tree: Rc<SyntaxTree>, context: Option<ConstructRef>) -> Self {
        let body = tree.root();
        Self::new(Signature::empty(), tree, body, context)
    }

    pub fn into_value(self) -> Value {
        Value::Ref(Construct::new(ConstructKind::Script(self)))
    }

    /// Run the script with default evaluator options. The argument scope's
    /// prototype is `lexical` when given, else the captured context.
    pub fn evaluate(&self, args: &Value, lexical: Option<ConstructRef>) -> Result<Value, EvalError> {
        self.evaluate_with(EvaluatorOptions::default(), args, lexical)
    }

    pub fn evaluate_with(
        &self,
        options: EvaluatorOptions,
        args: &Value,
        lexical: Option<ConstructRef>,
    ) -> Result<Value, EvalError> {
        Evaluator::new(options).run(self, args, lexical)
    }
}
