use indoc::indoc;
use pretty_assertions::assert_eq;

use super::*;
use crate::evaluator::{EvalError, EvaluatorOptions, ResourceExceeded};
use crate::values::Value;

fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().filter_map(|d| d.code.as_deref()).collect()
}

#[test]
fn test_eval_with_prelude() {
    let engine = Engine::default();
    let result = engine.eval("x = 40; x + 2").unwrap();
    assert_eq!(result.as_int(), Some(42));
}

#[test]
fn test_root_scope_persists_between_runs() {
    let engine = Engine::default();
    engine.eval("counter = 1").unwrap();
    engine.eval("counter = counter + 1").unwrap();
    assert_eq!(engine.root().get("counter", false).as_int(), Some(2));
}

#[test]
fn test_compiled_program_runs_repeatedly() {
    let engine = Engine::default();
    engine.define("n", Value::int(0));
    let program = engine.compile("n = n + 1").unwrap();
    engine.run(&program).unwrap();
    let result = engine.run(&program).unwrap();
    assert_eq!(result.as_int(), Some(2));
    assert_eq!(program.source(), "n = n + 1");
}

#[test]
fn test_register_function() {
    let engine = Engine::default();
    engine
        .register_function("double", "x", |scope| {
            let x = scope
                .get("x", false)
                .as_int()
                .ok_or_else(|| EvalError::native("double expects an Int"))?;
            Ok(Value::int(x * 2).into())
        })
        .unwrap();
    assert_eq!(engine.eval("double(20) + 2").unwrap().as_int(), Some(42));

    let error = engine.eval("double('a')").unwrap_err();
    let diagnostics = error.diagnostics();
    assert_eq!(diagnostics[0].message, "double expects an Int");
    assert_eq!(codes(&diagnostics), vec!["E007"]);
}

#[test]
fn test_register_function_rejects_bad_signature() {
    let engine = Engine::default();
    let error = engine
        .register_function("f", "a, [b", |_| Ok(Value::UNDEFINED.into()))
        .unwrap_err();
    assert!(matches!(error, Error::Api(_)));
}

#[test]
fn test_without_prelude_operators_are_undefined() {
    let engine = Engine::new(EngineOptions {
        prelude: false,
        ..EngineOptions::default()
    });
    let error = engine.eval("1 + 2").unwrap_err();
    let diagnostics = error.diagnostics();
    assert_eq!(diagnostics[0].message, "'+' is undefined, not callable");
    assert_eq!(codes(&diagnostics), vec!["E001"]);
    assert!(diagnostics[0].help.is_some());
}

#[test]
fn test_compilation_errors() {
    let engine = Engine::default();
    let error = engine.eval("(1]").unwrap_err();
    assert_eq!(error.to_string(), "compilation failed with 1 error(s)");
    assert_eq!(codes(&error.diagnostics()), vec!["P001"]);

    let error = engine.eval("'open").unwrap_err();
    assert_eq!(codes(&error.diagnostics()), vec!["L002"]);
}

#[test]
fn test_check_reports_every_syntax_error() {
    let engine = Engine::default();
    let diagnostics = engine.check("a b; c = 1; (2]");
    assert_eq!(codes(&diagnostics), vec!["P008", "P001", "P003"]);
    assert!(engine.check("x = 1").is_empty());
}

#[test]
fn test_resource_limits_come_from_options() {
    let engine = Engine::new(EngineOptions {
        evaluator: EvaluatorOptions {
            max_call_depth: 20,
            ..EvaluatorOptions::default()
        },
        prelude: true,
    });
    let error = engine.eval("f = () { f() }; f()").unwrap_err();
    assert!(matches!(
        error,
        Error::ResourceExceeded(ResourceExceeded::CallDepth { max_depth: 20, .. })
    ));
}

fn limited_engine(evaluator: EvaluatorOptions) -> Engine {
    Engine::new(EngineOptions {
        evaluator,
        prelude: true,
    })
}

#[test]
fn test_recursion_through_control_structures_hits_the_call_limit() {
    let engine = limited_engine(EvaluatorOptions {
        max_call_depth: 50,
        ..EvaluatorOptions::default()
    });
    for source in [
        "f = () { while (1) { f() } }; f()",
        "f = () { if (f()) { 1 } }; f()",
        "f = () { if (0, f()) { 1 } }; f()",
    ] {
        let error = engine.eval(source).unwrap_err();
        assert!(
            matches!(
                error,
                Error::ResourceExceeded(ResourceExceeded::CallDepth { max_depth: 50, .. })
            ),
            "{}: {:?}",
            source,
            error
        );
    }
}

#[test]
fn test_loops_run_in_constant_frames() {
    let engine = limited_engine(EvaluatorOptions {
        max_frames: 32,
        ..EvaluatorOptions::default()
    });
    let source = indoc! {"
        i = 0;
        while (i < 5000) { i = i + 1 };
        i
    "};
    assert_eq!(engine.eval(source).unwrap().as_int(), Some(5000));
}

#[test]
fn test_objects_and_scripts_end_to_end() {
    let engine = Engine::default();
    let source = indoc! {"
        point = (x, y) { };
        p = point(3, 4);
        p.x * p.x + p.y * p.y
    "};
    assert_eq!(engine.eval(source).unwrap().as_int(), Some(25));
}
