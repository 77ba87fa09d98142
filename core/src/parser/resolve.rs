//! Operator resolution for a closed statement (shunting-yard).

use smallvec::SmallVec;
use tracing::debug;

use super::error::{ParseError, ParseErrorKind};
use super::operators::{self, Notation, Operator};
use super::syntax_tree::{Instruction, NodeId, SyntaxTree};
use crate::syntax::Span;

#[derive(Debug, Clone, Copy)]
enum Item {
    Operand(NodeId),
    Operator(NodeId, Operator),
}

fn error_at(tree: &SyntaxTree, id: NodeId, kind: ParseErrorKind) -> ParseError {
    let node = tree.node(id);
    ParseError::new(kind, node.instruction.to_string(), node.location, node.span.clone())
}

/// A one-element tuple used for grouping is replaced by its element, unless
/// the element is a `:` definition (then the tuple is a keyed literal).
fn unwrap_grouping(tree: &mut SyntaxTree, id: NodeId) -> NodeId {
    if *tree.instruction(id) != Instruction::Tuple || tree.children(id).len() != 1 {
        return id;
    }
    let inner = tree.children(id)[0];
    if is_definition(tree, inner) {
        return id;
    }
    tree.take_children(id);
    inner
}

fn is_definition(tree: &SyntaxTree, id: NodeId) -> bool {
    *tree.instruction(id) == Instruction::Operation
        && tree
            .child(id, 0)
            .and_then(|op| tree.instruction(op).identifier())
            == Some(operators::DEFINE)
}

/// Classify the statement's children into operands and operators, choosing
/// each operator's notation from its position.
fn classify(tree: &SyntaxTree, children: &[NodeId]) -> SmallVec<[Item; 8]> {
    let mut items = SmallVec::new();
    let mut expect_operand = true;
    for &child in children {
        let name = tree.instruction(child).identifier().filter(|n| operators::is_operator(n));
        let entry = name.and_then(|name| {
            if expect_operand {
                operators::lookup(name, Notation::Prefix)
            } else {
                operators::lookup(name, Notation::Infix)
                    .or_else(|| operators::lookup(name, Notation::Postfix))
            }
        });
        match entry {
            Some(operator) => {
                expect_operand = operator.notation != Notation::Postfix;
                items.push(Item::Operator(child, operator));
            }
            // An operator name with no entry for this position is a value.
            None => {
                expect_operand = false;
                items.push(Item::Operand(child));
            }
        }
    }
    items
}

/// Resolve the children of `statement` into a single operator tree and
/// return its root. The statement is left empty.
pub(crate) fn resolve_statement(
    tree: &mut SyntaxTree,
    statement: NodeId,
) -> Result<NodeId, ParseError> {
    let children = tree.take_children(statement);
    let items = classify(tree, &children);

    if !items.iter().any(|item| matches!(item, Item::Operator(..))) {
        return Err(error_at(tree, children[1], ParseErrorKind::UnexpectedIdentifier));
    }

    // Reorder into reverse polish notation.
    let mut output: Vec<Item> = Vec::with_capacity(items.len());
    let mut stack: SmallVec<[(NodeId, Operator); 8]> = SmallVec::new();
    for item in items {
        match item {
            Item::Operand(id) => output.push(Item::Operand(id)),
            Item::Operator(id, operator) => {
                if operator.notation != Notation::Prefix {
                    while let Some(&(top, top_op)) = stack.last() {
                        if !top_op.binds_before(&operator) {
                            break;
                        }
                        stack.pop();
                        output.push(Item::Operator(top, top_op));
                    }
                }
                if operator.notation == Notation::Postfix {
                    output.push(Item::Operator(id, operator));
                } else {
                    stack.push((id, operator));
                }
            }
        }
    }
    while let Some((id, operator)) = stack.pop() {
        output.push(Item::Operator(id, operator));
    }

    // Fold the RPN sequence into Operation nodes.
    let mut operands: Vec<NodeId> = Vec::new();
    for item in output {
        match item {
            Item::Operand(id) => {
                let id = unwrap_grouping(tree, id);
                operands.push(id);
            }
            Item::Operator(id, operator) => {
                let arity = operator.notation.arity();
                if operands.len() < arity {
                    let name = tree.instruction(id).to_string();
                    return Err(error_at(
                        tree,
                        id,
                        ParseErrorKind::MissingOperand { operator: name },
                    ));
                }
                let args = operands.split_off(operands.len() - arity);
                let node = tree.node(id);
                let (location, op_span) = (node.location, node.span.clone());
                let first = tree.node(args[0]).span.clone();
                let last = tree.node(args[arity - 1]).span.clone();
                let span = Span::new(
                    first.0.start.min(op_span.0.start),
                    last.0.end.max(op_span.0.end),
                );

                let operation = tree.add(Instruction::Operation, location, span);
                tree.append(operation, id);
                for arg in args {
                    tree.append(operation, arg);
                }
                operands.push(operation);
            }
        }
    }

    match operands.as_slice() {
        [root] => {
            debug!(tree = %tree.to_sexpr(*root), "resolved statement");
            Ok(*root)
        }
        [_, extra, ..] => Err(error_at(tree, *extra, ParseErrorKind::TooManyOperands)),
        [] => Err(error_at(tree, children[0], ParseErrorKind::MissingOperand {
            operator: tree.instruction(children[0]).to_string(),
        })),
    }
}
