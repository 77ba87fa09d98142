#[macro_use]
mod cases;

use indoc::indoc;

test_case!(
    call_with_positional_arguments,
    input: "add = (a, b) { a + b }; add(40, 2)",
    result: Ok("42"),
);

test_case!(
    immediate_call,
    input: "(x) { x * x }(7)",
    result: Ok("49"),
);

test_case!(
    keyed_argument_overrides_position,
    input: "sub = (a, b) { a - b }; sub(1, 10, a: 20)",
    result: Ok("10"),
);

test_case!(
    missing_arguments_are_undefined,
    input: "f = (a, b) { b }; f(1)",
    result: Ok("undefined"),
);

test_case!(
    rest_parameter,
    input: "f = (head, [tail]) { tail }; f(1, 2, 3)",
    result: Ok("[2,3]"),
);

test_case!(
    two_rest_parameters_split_evenly,
    input: "f = ([a], [b]) { (a, b) }; f(1, 2, 3, 4, 5)",
    result: Ok("([1,2,3],[4,5])"),
);

test_case!(
    script_without_result_returns_its_scope,
    input: "point = (x, y) {}; point(1, 2)",
    result: Ok("{x:1,y:2}"),
);

test_case!(
    constructor_with_definitions,
    input: indoc! {"
        vector = (x, y) { length2: x * x + y * y };
        vector(3, 4).length2
    "},
    result: Ok("25"),
);

test_case!(
    callee_sees_caller_bindings,
    input: indoc! {"
        show = () { label };
        wrap = (label) { show() };
        wrap('dynamic')
    "},
    result: Ok("'dynamic'"),
);

test_case!(
    assignment_writes_through_to_outer_binding,
    input: indoc! {"
        total = 0;
        add = (n) { total = total + n };
        add(2);
        add(3);
        total
    "},
    result: Ok("5"),
);

test_case!(
    if_else,
    input: indoc! {"
        sign = (n) { if (n < 0, 'non-negative') { 'negative' } };
        (sign(-1), sign(1))
    "},
    result: Ok("('negative','non-negative')"),
);

test_case!(
    while_loop,
    input: indoc! {"
        i = 0;
        squares = [];
        while (i < 4) {
            push(squares, i * i);
            i = i + 1
        };
        squares
    "},
    result: Ok("[0,1,4,9]"),
);

test_case!(
    recursion,
    input: indoc! {"
        fib = (n) { if (n < 2, fib(n - 1) + fib(n - 2)) { n } };
        fib(15)
    "},
    result: Ok("610"),
);

test_case!(
    deep_recursion_stays_off_the_host_stack,
    input: indoc! {"
        down = (n) { if (n > 0) { down(n - 1) } };
        down(3000)
    "},
    result: Ok("undefined"),
);

test_case!(
    operators_are_values,
    input: "apply = (op, a, b) { op(a, b) }; apply(*, 6, 7)",
    result: Ok("42"),
);

test_case!(
    operator_bound_to_a_name,
    input: "times = *; apply = (op, a, b) { op(a, b) }; apply(times, 6, 7)",
    result: Ok("42"),
);

test_case!(
    unbounded_recursion_hits_the_limit,
    input: "loop = () { loop() }; loop()",
    result: Err("resource limit exceeded: call depth 10001 exceeds maximum of 10000"),
);

test_case!(
    calling_a_number,
    input: "x = 3; x(1)",
    result: Err("E002"),
);

test_case!(
    calling_undefined,
    input: "nothing(1)",
    result: Err("E001"),
);

test_case!(
    invalid_parameter_list,
    input: "f = (1) { 2 }",
    result: Err("E005"),
);
