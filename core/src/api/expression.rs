//! Compiled Plang programs.

use std::rc::Rc;

use crate::parser::SyntaxTree;
use crate::values::{ConstructRef, Script};

/// A parsed program ready for execution.
///
/// The tree is shared: scripts created while running the program keep it
/// alive through their body references, so a compiled program can be run
/// any number of times.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    source: Rc<str>,
    tree: Rc<SyntaxTree>,
}

impl CompiledProgram {
    pub(crate) fn new(source: &str, tree: SyntaxTree) -> Self {
        Self {
            source: Rc::from(source),
            tree: Rc::new(tree),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// The whole program as a zero-parameter script closed over `context`.
    pub fn script(&self, context: Option<ConstructRef>) -> Script {
        Script::program(self.tree.clone(), context)
    }
}
