use plang::{Engine, EngineOptions};

/// Declares a test that runs `input` on a fresh engine with the prelude.
///
/// `result: Ok(text)` compares the rendered value; `result: Err(code)`
/// compares the code of the first diagnostic.
macro_rules! test_case {
    ($name:ident, input: $input:expr, result: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            $crate::cases::check($input, $expected);
        }
    };
}

pub fn check(input: &str, expected: Result<&str, &str>) {
    let engine = Engine::new(EngineOptions::default());
    let actual = match engine.eval(input) {
        Ok(value) => Ok(value.to_string()),
        Err(error) => Err(error
            .diagnostics()
            .first()
            .and_then(|d| d.code.clone())
            .unwrap_or_else(|| error.to_string())),
    };
    let expected = expected.map(str::to_string).map_err(str::to_string);
    pretty_assertions::assert_eq!(actual, expected, "input:\n{}", input);
}
