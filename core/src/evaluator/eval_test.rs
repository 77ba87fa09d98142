//! Unit tests for the stack machine, run against a hand-built root scope
//! rather than the standard library.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::values::{Completion, Construct, ConstructRef, Function, Script, Signature, Value};

/// Root scope with integer `+`, `dec` and a `when` control structure.
fn root() -> ConstructRef {
    let root = Construct::object();
    let plus = Function::new(Signature::empty().list("operands"), |scope| {
        let operands = scope.get("operands", false);
        let mut sum = 0;
        for value in operands.construct().map(|c| c.elements()).unwrap_or_default() {
            sum += value
                .as_int()
                .ok_or_else(|| EvalError::native(format!("cannot add {}", value)))?;
        }
        Ok(Value::int(sum).into())
    });
    root.set("+", plus.into_value(), false);

    let when = Function::new(Signature::empty().single("cond").single("body"), |scope| {
        let cond = scope.get("cond", false);
        let taken = match cond.kind() {
            Some(crate::values::ConstructKind::Script(script)) => script
                .evaluate(&Value::tuple(Vec::new()), None)?
                .as_int()
                .is_some_and(|n| n != 0),
            _ => false,
        };
        Ok(if taken {
            Completion::Call {
                callee: scope.get("body", false),
                args: Value::tuple(Vec::new()),
            }
        } else {
            Completion::Value(Value::UNDEFINED)
        })
    });
    root.set("when", when.into_value(), false);

    let dec = Function::new(Signature::empty().single("n"), |scope| {
        let n = scope.get("n", false).as_int().unwrap_or_default();
        Ok(Value::int(n - 1).into())
    });
    root.set("dec", dec.into_value(), false);
    root
}

fn run_with(source: &str, scope: &ConstructRef, options: EvaluatorOptions) -> Result<Value, EvalError> {
    let tokens = tokenize(source).unwrap_or_else(|e| panic!("lexing failed: {}\n{}", source, e));
    let tree = parse(&tokens).unwrap_or_else(|e| panic!("parsing failed: {}\n{}", source, e));
    let script = Script::program(Rc::new(tree), None);
    Evaluator::new(options).run_in_scope(&script, scope.clone())
}

fn run(source: &str) -> Result<Value, EvalError> {
    run_with(source, &root(), EvaluatorOptions::default())
}

fn show(source: &str) -> String {
    match run(source) {
        Ok(value) => value.to_string(),
        Err(e) => panic!("evaluation failed: {}\n{}", source, e),
    }
}

#[test]
fn test_literals() {
    assert_eq!(show("42"), "42");
    assert_eq!(show("2.5"), "2.5");
    assert_eq!(show("'hi'"), "'hi'");
    assert_eq!(show(""), "undefined");
    assert_eq!(show("missing"), "undefined");
}

#[test]
fn test_operator_without_binding_is_undefined_callee() {
    let error = run_with("1 + 2", &Construct::object(), EvaluatorOptions::default()).unwrap_err();
    assert!(matches!(&error, EvalError::UndefinedCallee { name, span: Some(_) } if name == "+"));
    assert_eq!(error.to_string(), "'+' is undefined, not callable");
}

#[test]
fn test_operations_call_scope_bindings() {
    assert_eq!(show("1 + 2 + 3"), "6");
    assert_eq!(show("x = 1 + 2; x + x"), "6");
}

#[test]
fn test_program_result_is_last_statement() {
    assert_eq!(show("1; 2; 3"), "3");
    assert_eq!(show("x = 5"), "5");
}

#[test]
fn test_assignment_writes_top_level_bindings_to_root() {
    let scope = root();
    run_with("x = 7; y = x", &scope, EvaluatorOptions::default()).unwrap();
    assert_eq!(scope.get("x", false).as_int(), Some(7));
    assert_eq!(scope.get("y", false).as_int(), Some(7));
}

#[test]
fn test_collections() {
    assert_eq!(show("(1, 2)"), "(1,2)");
    assert_eq!(show("[1, [2]]"), "[1,[2]]");
    assert_eq!(show("[|1, 2|]"), "[|1,2|]");
    assert_eq!(show("(1, k: 2)"), "(1,k:2)");
}

#[test]
fn test_definition_needs_tuple_or_block() {
    assert!(matches!(
        run("x: 1"),
        Err(EvalError::InvalidAssignment { span: Some(_) })
    ));
    assert!(matches!(
        run("[x: 1]"),
        Err(EvalError::InvalidAssignment { .. })
    ));
    assert_eq!(
        run("x: 1").unwrap_err().to_string(),
        "invalid assignment, must be in object/tuple"
    );
}

#[test]
fn test_block_without_result_is_its_object() {
    assert_eq!(show("{ a: 1; b: 2 }"), "{a:1,b:2}");
    assert_eq!(show("o = { a: 1; b: 2 }; o.b"), "2");
    assert_eq!(show("{ 1; 2 }"), "2");
}

#[test]
fn test_reflexive_access() {
    assert_eq!(show("o = { a: 1; b: .a }; o.b"), "1");
}

#[test]
fn test_block_inherits_enclosing_scope() {
    assert_eq!(show("x = 1; { x + 1 }"), "2");
    // Assignment writes through to the binding that already exists.
    assert_eq!(show("x = 1; { x = 5 }; x"), "5");
}

#[test]
fn test_accessor_reads() {
    assert_eq!(show("t = (10, 20); t.1"), "20");
    assert_eq!(show("l = [1, 2, 3]; l.2"), "3");
    assert_eq!(show("o = { a: { b: 4 } }; o.a.b"), "4");
    assert_eq!(show("o = {}; o.missing.deeper"), "undefined");
    assert_eq!(show("o = { 'k': 3 }; o.'k'"), "3");
}

#[test]
fn test_accessor_assignment() {
    assert_eq!(show("o = { a: 1 }; o.a = 5; o.a"), "5");
    assert_eq!(show("o = { a: {} }; o.a.b = 2; o"), "{a:{b:2}}");
    assert_eq!(show("l = [1, 2]; l.0 = 9; l"), "[9,2]");
}

#[test]
fn test_invalid_assignment_targets() {
    assert!(matches!(
        run("1 = 2"),
        Err(EvalError::InvalidAssignmentTarget { .. })
    ));
    assert!(matches!(
        run("t = (1, 2); t.0 = 3"),
        Err(EvalError::Value { .. })
    ));
}

#[test]
fn test_script_call_binds_arguments() {
    assert_eq!(show("add = (a, b) { a + b }; add(2, 3)"), "5");
    assert_eq!(show("first = (a, [rest]) { rest }; first(1, 2, 3)"), "[2,3]");
    assert_eq!(show("(x) { x + 1 }(3)"), "4");
}

#[test]
fn test_scripts_are_dynamically_scoped() {
    assert_eq!(show("g = () { y }; h = (y) { g() }; h(7)"), "7");
}

#[test]
fn test_script_body_is_its_argument_object() {
    assert_eq!(show("make = (a) { b: a }; make(1)"), "{a:1,b:1}");
}

#[test]
fn test_not_callable() {
    let error = run("x = 1; x(2)").unwrap_err();
    assert!(matches!(
        &error,
        EvalError::NotCallable { name, type_name: "Int", .. } if name == "x"
    ));
    assert!(matches!(
        run("o = {}; o.m(1)"),
        Err(EvalError::UndefinedCallee { name, .. }) if name == "o.m"
    ));
}

#[test]
fn test_control_structure_passes_thunks() {
    assert_eq!(show("when (1) { 10 }"), "10");
    assert_eq!(show("when (0) { 10 }"), "undefined");
    assert_eq!(show("x = 0; when (1) { x = 3 }; x"), "3");
}

#[test]
fn test_recursion_is_not_host_recursion() {
    crate::test_utils::init_test_logging();
    let source = "count = (n) { when (n) { count(dec(n)) } }; count(2000)";
    assert_eq!(show(source), "undefined");
}

#[test]
fn test_call_depth_limit() {
    let options = EvaluatorOptions {
        max_call_depth: 50,
        ..EvaluatorOptions::default()
    };
    let error = run_with("f = () { f() }; f()", &root(), options).unwrap_err();
    assert!(matches!(
        error,
        EvalError::ResourceExceeded(ResourceExceeded::CallDepth { max_depth: 50, .. })
    ));
}

#[test]
fn test_frame_limit() {
    let options = EvaluatorOptions {
        max_frames: 3,
        ..EvaluatorOptions::default()
    };
    let error = run_with("[[[[1]]]]", &root(), options).unwrap_err();
    assert_eq!(
        error,
        EvalError::ResourceExceeded(ResourceExceeded::FrameStack {
            depth: 4,
            max_depth: 3
        })
    );
}

#[test]
fn test_script_evaluate_with_lexical_scope() {
    let tree = parse(&tokenize("x + 1").unwrap()).unwrap();
    let script = Script::program(Rc::new(tree), None);
    let scope = root();
    scope.set("x", Value::int(41), false);
    let result = script.evaluate(&Value::UNDEFINED, Some(scope)).unwrap();
    assert_eq!(result.as_int(), Some(42));
}
