//! Arithmetic, comparison and logic operators.
//!
//! Operators are ordinary bindings: the evaluator calls whatever `+` resolves
//! to with the operand tuple. Prefix and infix forms share one binding and
//! are told apart by arity.
//!
//! Integer arithmetic wraps on overflow. Mixing Int and Float widens to
//! Float.

use std::cmp::Ordering;

use super::{define, truthy};
use crate::evaluator::EvalError;
use crate::values::{ConstructKind, ConstructRef, Signature, Value};

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn number(value: &Value) -> Option<Number> {
    match value.kind()? {
        ConstructKind::Int(n) => Some(Number::Int(*n)),
        ConstructKind::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

fn operands(scope: &ConstructRef) -> Vec<Value> {
    scope
        .get("operands", false)
        .construct()
        .map(|c| c.elements())
        .unwrap_or_default()
}

fn invalid_operands(operator: &str, values: &[Value]) -> EvalError {
    let types: Vec<&str> = values.iter().map(|v| v.type_name()).collect();
    EvalError::native(format!(
        "invalid operands for '{}': ({})",
        operator,
        types.join(", ")
    ))
}

/// Applies a binary numeric operator, widening to Float when either side is
/// a Float.
fn arithmetic(
    operator: &str,
    a: &Value,
    b: &Value,
    int: impl Fn(i64, i64) -> Result<Value, EvalError>,
    float: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (number(a), number(b)) {
        (Some(Number::Int(x)), Some(Number::Int(y))) => int(x, y),
        (Some(x), Some(y)) => Ok(Value::float(float(widen(x), widen(y)))),
        _ => Err(invalid_operands(operator, &[a.clone(), b.clone()])),
    }
}

fn widen(number: Number) -> f64 {
    match number {
        Number::Int(n) => n as f64,
        Number::Float(f) => f,
    }
}

fn add(a: &Value, b: &Value) -> Result<Value, EvalError> {
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Ok(Value::string(format!("{}{}", x, y)));
    }
    arithmetic("+", a, b, |x, y| Ok(Value::int(x.wrapping_add(y))), |x, y| x + y)
}

fn subtract(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic("-", a, b, |x, y| Ok(Value::int(x.wrapping_sub(y))), |x, y| x - y)
}

fn multiply(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic("*", a, b, |x, y| Ok(Value::int(x.wrapping_mul(y))), |x, y| x * y)
}

fn divide(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(
        "/",
        a,
        b,
        |x, y| match y {
            0 => Err(EvalError::native("division by zero")),
            _ => Ok(Value::int(x.wrapping_div(y))),
        },
        |x, y| x / y,
    )
}

fn remainder(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(
        "%",
        a,
        b,
        |x, y| match y {
            0 => Err(EvalError::native("division by zero")),
            _ => Ok(Value::int(x.wrapping_rem(y))),
        },
        |x, y| x % y,
    )
}

fn power(a: &Value, b: &Value) -> Result<Value, EvalError> {
    arithmetic(
        "^",
        a,
        b,
        |x, y| match u32::try_from(y) {
            Ok(exponent) => Ok(Value::int(x.wrapping_pow(exponent))),
            Err(_) => Ok(Value::float((x as f64).powf(y as f64))),
        },
        f64::powf,
    )
}

fn bitwise(
    operator: &str,
    a: &Value,
    b: &Value,
    op: impl Fn(i64, i64) -> i64,
) -> Result<Value, EvalError> {
    match (number(a), number(b)) {
        (Some(Number::Int(x)), Some(Number::Int(y))) => Ok(Value::int(op(x, y))),
        _ => Err(invalid_operands(operator, &[a.clone(), b.clone()])),
    }
}

fn negate(a: &Value) -> Result<Value, EvalError> {
    match number(a) {
        Some(Number::Int(n)) => Ok(Value::int(n.wrapping_neg())),
        Some(Number::Float(f)) => Ok(Value::float(-f)),
        None => Err(invalid_operands("-", std::slice::from_ref(a))),
    }
}

/// Structural equality for primitives, identity for everything else.
pub fn equals(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (number(a), number(b)) {
        return match (x, y) {
            (Number::Int(x), Number::Int(y)) => x == y,
            _ => widen(x) == widen(y),
        };
    }
    match (a.kind(), b.kind()) {
        (Some(ConstructKind::String(x)), Some(ConstructKind::String(y))) => x == y,
        (Some(ConstructKind::Bool(x)), Some(ConstructKind::Bool(y))) => x == y,
        _ => a.ptr_eq(b),
    }
}

fn compare(operator: &str, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    let ordering = match (number(a), number(b)) {
        (Some(Number::Int(x)), Some(Number::Int(y))) => Some(x.cmp(&y)),
        (Some(x), Some(y)) => widen(x).partial_cmp(&widen(y)),
        _ => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => Some(x.cmp(y)),
            _ => None,
        },
    };
    ordering.ok_or_else(|| invalid_operands(operator, &[a.clone(), b.clone()]))
}

type Binary = fn(&Value, &Value) -> Result<Value, EvalError>;

/// Registers an infix operator. With a single operand, `prefix` applies when
/// given.
fn operator(
    root: &ConstructRef,
    name: &'static str,
    infix: Binary,
    prefix: Option<fn(&Value) -> Result<Value, EvalError>>,
) {
    define(root, name, Signature::empty().list("operands"), move |scope| {
        let values = operands(scope);
        match (values.as_slice(), prefix) {
            ([a, b], _) => infix(a, b),
            ([a], Some(prefix)) => prefix(a),
            _ => Err(EvalError::native(format!(
                "'{}' expects 2 operands, got {}",
                name,
                values.len()
            ))),
        }
        .map(Into::into)
    });
}

pub fn install(root: &ConstructRef) {
    operator(root, "+", add, None);
    operator(root, "-", subtract, Some(negate));
    operator(root, "*", multiply, None);
    operator(root, "/", divide, None);
    operator(root, "%", remainder, None);
    operator(root, "^", power, None);

    operator(root, "<<", |a, b| bitwise("<<", a, b, |x, y| x.wrapping_shl(y as u32)), None);
    operator(root, ">>", |a, b| bitwise(">>", a, b, |x, y| x.wrapping_shr(y as u32)), None);
    operator(root, "&", |a, b| bitwise("&", a, b, |x, y| x & y), None);
    operator(root, "|", |a, b| bitwise("|", a, b, |x, y| x | y), None);

    operator(root, "==", |a, b| Ok(Value::bool(equals(a, b))), None);
    operator(root, "!=", |a, b| Ok(Value::bool(!equals(a, b))), None);
    operator(root, "<", |a, b| Ok(Value::bool(compare("<", a, b)?.is_lt())), None);
    operator(root, "<=", |a, b| Ok(Value::bool(compare("<=", a, b)?.is_le())), None);
    operator(root, ">", |a, b| Ok(Value::bool(compare(">", a, b)?.is_gt())), None);
    operator(root, ">=", |a, b| Ok(Value::bool(compare(">=", a, b)?.is_ge())), None);

    // Both operands are already evaluated; these pick one of them.
    operator(root, "&&", |a, b| Ok(if truthy(a) { b.clone() } else { a.clone() }), None);
    operator(root, "||", |a, b| Ok(if truthy(a) { a.clone() } else { b.clone() }), None);

    define(root, "!", Signature::empty().single("value"), |scope| {
        Ok(Value::bool(!truthy(&scope.get("value", false))).into())
    });
    define(root, "~", Signature::empty().single("value"), |scope| {
        let value = scope.get("value", false);
        match number(&value) {
            Some(Number::Int(n)) => Ok(Value::int(!n).into()),
            _ => Err(invalid_operands("~", &[value])),
        }
    });
}
