#[macro_use]
mod cases;

use plang::{Engine, EngineOptions, Error, render_error_to_string_no_color};

test_case!(
    mismatched_region,
    input: "(1, 2]",
    result: Err("P001"),
);

test_case!(
    unexpected_region_close,
    input: "1)",
    result: Err("P002"),
);

test_case!(
    unclosed_region,
    input: "f(1, [2",
    result: Err("P003"),
);

test_case!(
    separator_outside_collection,
    input: "a, b",
    result: Err("P004"),
);

test_case!(
    terminator_inside_tuple,
    input: "(a; b)",
    result: Err("P005"),
);

test_case!(
    adjacent_values,
    input: "a b",
    result: Err("P008"),
);

test_case!(
    dangling_operator,
    input: "1 +",
    result: Err("P009"),
);

test_case!(
    bad_escape,
    input: r"'\q'",
    result: Err("P012"),
);

test_case!(
    unterminated_string,
    input: "'abc",
    result: Err("L002"),
);

test_case!(
    unterminated_comment,
    input: "1 /* never closed",
    result: Err("L003"),
);

#[test]
fn test_first_error_wins_but_check_reports_all() {
    let engine = Engine::default();
    let source = "a b; c = 1; (1, 2]";
    let error = engine.eval(source).unwrap_err();
    assert_eq!(error.diagnostics().len(), 1);

    let codes: Vec<_> = engine
        .check(source)
        .into_iter()
        .filter_map(|d| d.code)
        .collect();
    assert_eq!(codes, vec!["P008", "P001", "P003"]);
}

#[test]
fn test_runtime_error_points_at_the_operation() {
    let engine = Engine::new(EngineOptions {
        prelude: false,
        ..EngineOptions::default()
    });
    let source = "x = 1 + 2";
    let Err(Error::Runtime { diagnostic }) = engine.eval(source) else {
        panic!("expected a runtime error");
    };
    assert_eq!(&source[diagnostic.span.0.clone()], "1 + 2");

    let rendered = render_error_to_string_no_color(source, &Error::Runtime { diagnostic });
    assert!(rendered.contains("E001"));
    assert!(rendered.contains("'+' is undefined, not callable"));
}

#[test]
fn test_errors_do_not_poison_the_engine() {
    let engine = Engine::default();
    assert!(engine.eval("x = 1; nothing()").is_err());
    // Statements before the failure already ran.
    assert_eq!(engine.eval("x + 1").unwrap().as_int(), Some(2));
}
