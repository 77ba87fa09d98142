//! Token stream to syntax tree.
//!
//! Parsing happens in two stages: a structural pass that builds regions,
//! calls, accessors and statements, and a per-statement shunting-yard pass
//! that groups operators by the static [`operators`] table.

pub mod error;
pub mod operators;
#[allow(clippy::module_inception)]
pub mod parser;
mod resolve;
pub mod syntax_tree;

pub use error::{ParseError, ParseErrorKind};
pub use operators::{Associativity, Notation, Operator};
pub use parser::{parse, parse_recovering};
pub use syntax_tree::{Directive, Instruction, Node, NodeId, SyntaxTree};

#[cfg(test)]
mod parse_test;
