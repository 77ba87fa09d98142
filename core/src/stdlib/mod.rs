//! Host prelude.
//!
//! The language defines no operators or functions of its own: `1 + 2` only
//! works when something named `+` is in scope. This module provides an
//! opt-in set of native functions:
//! - Math: arithmetic, bitwise, comparison and logic operators
//! - Control: `if` and `while`
//! - Builtins: `true`, `false`, `print`, `len`, `push`, `proto`
//!
//! Everything is registered as ordinary properties of a root scope, so user
//! code can shadow or replace any of it.

use crate::evaluator::EvalError;
use crate::values::{Completion, ConstructKind, ConstructRef, Function, Signature, Value};

pub mod control;
pub mod math;


pub use math::equals;

/// Register the whole prelude on `root`.
pub fn install(root: &ConstructRef) {
    math::install(root);
    control::install(root);
    install_builtins(root);
}

pub(crate) fn define(
    root: &ConstructRef,
    name: &str,
    signature: Signature,
    native: impl Fn(&ConstructRef) -> Result<Completion, EvalError> + 'static,
) {
    root.set(name, Function::new(signature, native).into_value(), false);
}

/// Truthiness used by conditions and the logic operators. Undefined, false,
/// zero and the empty string are false.
pub fn truthy(value: &Value) -> bool {
    match value.kind() {
        None => false,
        Some(ConstructKind::Bool(b)) => *b,
        Some(ConstructKind::Int(n)) => *n != 0,
        Some(ConstructKind::Float(f)) => *f != 0.0,
        Some(ConstructKind::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Space-separated rendering used by `print`. Strings are written raw.
pub fn format_print(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn install_builtins(root: &ConstructRef) {
    root.set("true", Value::bool(true), false);
    root.set("false", Value::bool(false), false);

    define(root, "print", Signature::empty().list("values"), |scope| {
        let values = scope.get("values", false);
        let values = values.construct().map(|c| c.elements()).unwrap_or_default();
        println!("{}", format_print(&values));
        Ok(Value::UNDEFINED.into())
    });

    define(root, "len", Signature::empty().single("value"), |scope| {
        let value = scope.get("value", false);
        let len = match value.kind() {
            Some(ConstructKind::String(s)) => s.chars().count(),
            Some(ConstructKind::Object) => value.construct().map_or(0, |c| c.count()),
            Some(_) => match value.construct().and_then(|c| c.len()) {
                Some(len) => len,
                None => {
                    return Err(EvalError::native(format!(
                        "{} has no length",
                        value.type_name()
                    )));
                }
            },
            None => return Err(EvalError::native("undefined has no length")),
        };
        Ok(Value::int(len as i64).into())
    });

    define(
        root,
        "push",
        Signature::empty().single("target").list("values"),
        |scope| {
            let target = scope.get("target", false);
            let Some(construct) = target.construct() else {
                return Err(EvalError::native("cannot push onto undefined"));
            };
            let values = scope.get("values", false);
            for value in values.construct().map(|c| c.elements()).unwrap_or_default() {
                construct.push(value)?;
            }
            Ok(target.clone().into())
        },
    );

    // `proto(value)` reads the prototype, `proto(value, prototype)` replaces it.
    define(
        root,
        "proto",
        Signature::empty().single("value").list("prototype"),
        |scope| {
            let value = scope.get("value", false);
            let Some(construct) = value.construct() else {
                return Ok(Value::UNDEFINED.into());
            };
            let replacement = scope.get("prototype", false);
            match replacement.construct().map(|c| c.elements()).as_deref() {
                Some([prototype]) => {
                    construct.set_prototype(prototype.construct().cloned())?;
                    Ok(value.clone().into())
                }
                _ => Ok(construct.prototype().map(Value::Ref).unwrap_or_default().into()),
            }
        },
    );
}
