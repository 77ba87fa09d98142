//! Arena-backed syntax tree.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Each node
//! records its parent index so the parser can walk upward while it is still
//! building and rewriting the tree. Nodes detached by a rewrite stay in the
//! arena, unreachable, until the tree is dropped.

use core::fmt;

use crate::syntax::{Location, Span, escape_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node means. Literal payloads are carried inline.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Unknown,
    Program,
    /// Only exists while parsing; replaced by its resolved content.
    Statement,
    Block,
    Identifier(String),
    Accessor,
    Integer(i64),
    Float(f64),
    String(String),
    Tuple,
    List,
    Array,
    /// `[callee, Tuple]`
    Call,
    /// `[operator Identifier, operands...]`
    Operation,
    /// `[parameter Tuple, Block]`: an anonymous function.
    Expression,
    /// `[callee, Tuple, Block]`
    ControlStructure,
}

impl Instruction {
    pub fn type_name(&self) -> &'static str {
        match self {
            Instruction::Unknown => "Unknown",
            Instruction::Program => "Program",
            Instruction::Statement => "[Statement]",
            Instruction::Block => "Block",
            Instruction::Identifier(_) => "Identifier",
            Instruction::Accessor => "Accessor",
            Instruction::Integer(_) => "Integer",
            Instruction::Float(_) => "Float",
            Instruction::String(_) => "String",
            Instruction::Tuple => "Tuple",
            Instruction::List => "List",
            Instruction::Array => "Array",
            Instruction::Call => "Call",
            Instruction::Operation => "Operation",
            Instruction::Expression => "Expression",
            Instruction::ControlStructure => "ControlStructure",
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            Instruction::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Identifier(name) => f.write_str(name),
            Instruction::Integer(value) => write!(f, "{}", value),
            Instruction::Float(value) => write!(f, "{:?}", value),
            Instruction::String(value) => escape_string(f, value),
            other => f.write_str(other.type_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub instruction: Instruction,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub location: Location,
    pub span: Span,
}

/// A `#command args...` line collected while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub command: String,
    pub arguments: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    pub directives: Vec<Directive>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// A tree holding only an empty `Program` root.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            directives: Vec::new(),
        };
        tree.root = tree.add(Instruction::Program, Location::new(1, 1), Span::default());
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn instruction(&self, id: NodeId) -> &Instruction {
        &self.nodes[id.index()].instruction
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id.index()].children.get(index).copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].children.last().copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Allocate a detached node.
    pub fn add(&mut self, instruction: Instruction, location: Location, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            instruction,
            children: Vec::new(),
            parent: None,
            location,
            span,
        });
        id
    }

    pub(crate) fn set_instruction(&mut self, id: NodeId, instruction: Instruction) {
        self.nodes[id.index()].instruction = instruction;
    }

    pub(crate) fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    /// Append `child` to `parent`, re-stamping the child's parent index.
    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Put `new` where `old` sits in its parent's children. `old` becomes
    /// detached.
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        if let Some(slot) = self.nodes[parent.index()]
            .children
            .iter_mut()
            .find(|c| **c == old)
        {
            *slot = new;
        }
        self.nodes[new.index()].parent = Some(parent);
        self.nodes[old.index()].parent = None;
    }

    /// Remove `id` from its parent's children.
    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    /// Take every child out of `id`, leaving it empty. The returned nodes are
    /// detached.
    pub(crate) fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = core::mem::take(&mut self.nodes[id.index()].children);
        for child in &children {
            self.nodes[child.index()].parent = None;
        }
        children
    }

    /// Verify that every node reachable from the root names its actual
    /// parent. Returns the first offending node.
    pub fn check_parents(&self) -> Result<(), NodeId> {
        if self.parent(self.root).is_some() {
            return Err(self.root);
        }
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            for &child in self.children(id) {
                if self.parent(child) != Some(id) {
                    return Err(child);
                }
                pending.push(child);
            }
        }
        Ok(())
    }

    /// Compact single-line rendering, e.g. `(+ 1 (* 2 3))`.
    ///
    /// Operations print as `(op operands...)`, other composite nodes as
    /// `(kind children...)`.
    pub fn to_sexpr(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_sexpr(&mut out, id);
        out
    }

    fn write_sexpr(&self, out: &mut String, id: NodeId) {
        let node = self.node(id);
        let head = match &node.instruction {
            Instruction::Operation => None,
            Instruction::Identifier(name) if name.is_empty() => {
                out.push_str("<>");
                return;
            }
            leaf if node.children.is_empty() && is_leaf(leaf) => {
                out.push_str(&leaf.to_string());
                return;
            }
            other => Some(other.type_name().to_ascii_lowercase()),
        };
        out.push('(');
        let mut first = true;
        if let Some(head) = head {
            out.push_str(&head);
            first = false;
        }
        for &child in &node.children {
            if !first {
                out.push(' ');
            }
            first = false;
            self.write_sexpr(out, child);
        }
        out.push(')');
    }
}

fn is_leaf(instruction: &Instruction) -> bool {
    matches!(
        instruction,
        Instruction::Identifier(_)
            | Instruction::Integer(_)
            | Instruction::Float(_)
            | Instruction::String(_)
    )
}

/// Indented dump, one node per line. Iterative so deep trees print safely.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![(self.root, 0usize)];
        while let Some((id, depth)) = pending.pop() {
            let node = self.node(id);
            write!(f, "{}{}", "    ".repeat(depth), node.instruction.type_name())?;
            if is_leaf(&node.instruction) {
                write!(f, ": {}", node.instruction)?;
            }
            writeln!(f)?;
            for &child in node.children.iter().rev() {
                pending.push((child, depth + 1));
            }
        }
        Ok(())
    }
}
