use indoc::indoc;
use pretty_assertions::assert_eq;

use super::*;
use crate::lexer::{Region, tokenize};
use crate::syntax::Location;

fn tree(source: &str) -> SyntaxTree {
    let tokens = tokenize(source).unwrap_or_else(|e| panic!("lexing failed: {}\n{}", source, e));
    parse(&tokens).unwrap_or_else(|e| panic!("parsing failed: {}\n{}", source, e))
}

fn statements(source: &str) -> Vec<String> {
    let tree = tree(source);
    tree.children(tree.root())
        .iter()
        .map(|id| tree.to_sexpr(*id))
        .collect()
}

fn single(source: &str) -> String {
    let all = statements(source);
    assert_eq!(all.len(), 1, "expected one statement in {:?}: {:?}", source, all);
    all.into_iter().next().unwrap()
}

fn parse_error(source: &str) -> ParseError {
    let tokens = tokenize(source).unwrap();
    match parse(&tokens) {
        Ok(tree) => panic!("expected an error for {:?}, got:\n{}", source, tree),
        Err(e) => e,
    }
}

#[test]
fn test_empty_program() {
    assert!(statements("").is_empty());
    assert!(statements(";;").is_empty());
    assert!(statements("// just a comment").is_empty());
}

#[test]
fn test_statements_are_split_by_terminators() {
    assert_eq!(statements("a; b; c"), vec!["a", "b", "c"]);
    assert_eq!(statements("1;\n2.5;\n'x'"), vec!["1", "2.5", "'x'"]);
}

#[test]
fn test_accessor_chain_is_one_node() {
    let tree = tree("a.b.c");
    let accessor = tree.children(tree.root())[0];
    assert_eq!(*tree.instruction(accessor), Instruction::Accessor);
    let segments: Vec<_> = tree
        .children(accessor)
        .iter()
        .map(|id| tree.instruction(*id).clone())
        .collect();
    assert_eq!(
        segments,
        vec![
            Instruction::Identifier("a".to_string()),
            Instruction::Identifier("b".to_string()),
            Instruction::Identifier("c".to_string()),
        ]
    );
}

#[test]
fn test_accessor_forms() {
    assert_eq!(single(".x"), "(accessor <> x)");
    assert_eq!(single("a..b"), "(accessor a <> b)");
    assert_eq!(single("t.0"), "(accessor t 0)");
    assert_eq!(single("o.'key'"), "(accessor o 'key')");
    assert_eq!(single("f(x).y"), "(accessor (call f (tuple x)) y)");
    assert_eq!(single("a + .b"), "(+ a (accessor <> b))");
}

#[test]
fn test_calls() {
    assert_eq!(single("f()"), "(call f (tuple))");
    assert_eq!(single("f(1, 2)"), "(call f (tuple 1 2))");
    assert_eq!(single("o.m(1)"), "(call (accessor o m) (tuple 1))");
    assert_eq!(single("f(1)(2)"), "(call (call f (tuple 1)) (tuple 2))");
    assert_eq!(single("g(f(x))"), "(call g (tuple (call f (tuple x))))");
}

#[test]
fn test_regions() {
    assert_eq!(single("()"), "(tuple)");
    assert_eq!(single("(1, 2)"), "(tuple 1 2)");
    assert_eq!(single("[1, 2,]"), "(list 1 2)");
    assert_eq!(single("[|1, 2|]"), "(array 1 2)");
    assert_eq!(single("{ a; b }"), "(block a b)");
    assert_eq!(single("{}"), "(block)");
    assert_eq!(single("[[1], []]"), "(list (list 1) (list))");
}

#[test]
fn test_expression_and_control_structure() {
    assert_eq!(
        single("(x) { x + 1 }"),
        "(expression (tuple x) (block (+ x 1)))"
    );
    assert_eq!(single("() {}"), "(expression (tuple) (block))");
    assert_eq!(
        single("if (c) { 1 }"),
        "(controlstructure if (tuple c) (block 1))"
    );
    assert_eq!(
        single("f = (a, [rest]) { rest }"),
        "(= f (expression (tuple a (list rest)) (block rest)))"
    );
    assert_eq!(
        single("(x) { x }(3)"),
        "(call (expression (tuple x) (block x)) (tuple 3))"
    );
}

#[test]
fn test_adjacent_strings_concatenate() {
    assert_eq!(single("'ab' \"cd\" 'ef'"), "'abcdef'");
    assert_eq!(single("x = 'a' 'b'"), "(= x 'ab')");
}

#[test]
fn test_directives_are_collected() {
    let tree = tree("#include lib.p other\nx");
    assert_eq!(
        tree.directives,
        vec![Directive {
            command: "include".to_string(),
            arguments: vec!["lib.p".to_string(), "other".to_string()],
            location: Location::new(1, 1),
        }]
    );
    assert_eq!(tree.children(tree.root()).len(), 1);
}

#[test]
fn test_parents_are_consistent() {
    let source = indoc! {"
        counter = {
            count: 0;
            step: (n) { .count = .count + n };
        };
        if (counter.count < 10) { counter.step(1) };
        [|1, (2, 3), [4]|].0;
    "};
    let tree = tree(source);
    assert_eq!(tree.check_parents(), Ok(()));
}

#[test]
fn test_operation_location_is_the_operator() {
    let tree = tree("a + b");
    let operation = tree.children(tree.root())[0];
    assert_eq!(tree.node(operation).location, Location::new(1, 3));
    assert_eq!(tree.node(operation).span, crate::syntax::Span::new(0, 5));
}

#[test]
fn test_tree_display() {
    let tree = tree("f(1, 'a')");
    assert_eq!(
        tree.to_string(),
        indoc! {"
            Program
                Call
                    Identifier: f
                    Tuple
                        Integer: 1
                        String: 'a'
        "}
    );
}

#[test]
fn test_region_errors() {
    let error = parse_error("(1]");
    assert_eq!(
        error.kind,
        ParseErrorKind::MismatchedRegion {
            expected: Region::Tuple.closer(),
            found: Region::List.closer(),
        }
    );
    assert_eq!(error.token, "]");
    assert_eq!(error.location, Location::new(1, 3));

    let error = parse_error("a)");
    assert_eq!(error.kind, ParseErrorKind::UnexpectedRegionClose { found: ")" });

    let error = parse_error("f(1, [2");
    assert_eq!(error.kind, ParseErrorKind::UnclosedRegion { opener: "[" });
    assert_eq!(error.location, Location::new(1, 6));
}

#[test]
fn test_separator_and_terminator_placement() {
    assert_eq!(parse_error("a, b").kind, ParseErrorKind::InvalidSeparator);
    assert_eq!(parse_error("{ a, b }").kind, ParseErrorKind::InvalidSeparator);
    assert_eq!(parse_error("(a; b)").kind, ParseErrorKind::InvalidTerminator);
    assert_eq!(parse_error("(,1)").kind, ParseErrorKind::EmptyElement);
    assert_eq!(parse_error("(1,,2)").kind, ParseErrorKind::EmptyElement);
}

#[test]
fn test_resolution_errors() {
    let error = parse_error("a b");
    assert_eq!(error.kind, ParseErrorKind::UnexpectedIdentifier);
    assert_eq!(error.token, "b");

    let error = parse_error("a +");
    assert_eq!(
        error.kind,
        ParseErrorKind::MissingOperand {
            operator: "+".to_string()
        }
    );

    assert_eq!(parse_error("a + b c").kind, ParseErrorKind::TooManyOperands);
}

#[test]
fn test_literal_and_member_errors() {
    assert_eq!(parse_error("0xZZ").kind, ParseErrorKind::InvalidNumber);
    assert!(matches!(
        parse_error(r"'\q'").kind,
        ParseErrorKind::InvalidString(_)
    ));
    assert_eq!(parse_error("a.").kind, ParseErrorKind::MissingMember);
    assert_eq!(parse_error("a.)").kind, ParseErrorKind::MissingMember);
}

#[test]
fn test_error_diagnostic() {
    let diagnostic = parse_error("(1]").to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("P001"));
    assert_eq!(diagnostic.message, "mismatched ']', expected ')'");
    assert!(diagnostic.help.is_some());
}

#[test]
fn test_recovering_parse_keeps_going() {
    let tokens = tokenize("a b; c = 1; (2]").unwrap();
    let (tree, errors) = parse_recovering(&tokens);
    let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ParseErrorKind::UnexpectedIdentifier,
            ParseErrorKind::MismatchedRegion {
                expected: ")",
                found: "]"
            },
            ParseErrorKind::UnclosedRegion { opener: "(" },
        ]
    );
    let statements: Vec<_> = tree
        .children(tree.root())
        .iter()
        .map(|id| tree.to_sexpr(*id))
        .collect();
    assert_eq!(statements, vec!["(= c 1)", "(tuple 2)"]);
    assert_eq!(tree.check_parents(), Ok(()));
}
