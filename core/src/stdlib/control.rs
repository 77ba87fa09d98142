//! Control structures.
//!
//! `if (cond) { ... }` reaches these natives as a call with one thunk per
//! parenthesized argument followed by the body. Thunks are zero-parameter
//! scripts closed over the calling scope. They are forced through
//! [`Completion`] continuations, so they run on the calling evaluator and
//! count against its limits.

use super::{define, truthy};
use crate::evaluator::EvalError;
use crate::values::{Completion, ConstructKind, ConstructRef, Signature, Value};

/// Force a thunk, then continue with its value. Non-script values are
/// already evaluated and go straight to `then`.
fn force(
    value: Value,
    then: impl FnOnce(Value) -> Result<Completion, EvalError> + 'static,
) -> Result<Completion, EvalError> {
    if !is_thunk(&value) {
        return then(value);
    }
    Ok(Completion::Then {
        callee: value,
        args: Value::tuple(Vec::new()),
        then: Box::new(then),
    })
}

fn is_thunk(value: &Value) -> bool {
    matches!(value.kind(), Some(ConstructKind::Script(_)))
}

fn branches(scope: &ConstructRef) -> Vec<Value> {
    scope
        .get("branches", false)
        .construct()
        .map(|c| c.elements())
        .unwrap_or_default()
}

/// Hands `value` back to the evaluator to run in place of the native's own
/// result.
fn tail(value: Value) -> Completion {
    Completion::Call {
        callee: value,
        args: Value::tuple(Vec::new()),
    }
}

/// `if (cond) { body }` and `if (cond, otherwise) { body }`.
fn if_native(scope: &ConstructRef) -> Result<Completion, EvalError> {
    let mut branches = branches(scope).into_iter();
    let Some(condition) = branches.next() else {
        return Err(EvalError::native("'if' expects a condition"));
    };
    let body = scope.get("body", false);
    let otherwise = branches.next();
    force(condition, move |condition| {
        Ok(match otherwise {
            _ if truthy(&condition) => tail(body),
            Some(otherwise) => tail(otherwise),
            None => Completion::Value(Value::UNDEFINED),
        })
    })
}

/// One round of `while`: test the condition, then run the body and loop.
fn iterate(condition: Value, body: Value, last: Value) -> Result<Completion, EvalError> {
    force(condition.clone(), move |test| {
        if !truthy(&test) {
            return Ok(Completion::Value(last));
        }
        force(body.clone(), move |result| iterate(condition, body, result))
    })
}

/// `while (cond) { body }`; yields the last body result.
fn while_native(scope: &ConstructRef) -> Result<Completion, EvalError> {
    let branches = branches(scope);
    let [condition] = branches.as_slice() else {
        return Err(EvalError::native("'while' expects exactly one condition"));
    };
    if !is_thunk(condition) {
        return Err(EvalError::native("'while' expects a parenthesized condition"));
    }
    iterate(condition.clone(), scope.get("body", false), Value::UNDEFINED)
}

pub fn install(root: &ConstructRef) {
    let signature = || Signature::empty().list("branches").single("body");
    define(root, "if", signature(), if_native);
    define(root, "while", signature(), while_native);
}
