//! Static operator table used by statement resolution.
//!
//! Operators are plain identifiers; the table only says how they group.
//! Smaller precedence binds tighter.

use hashbrown::HashMap;
use lazy_static::lazy_static;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    Prefix,
    Infix,
    Postfix,
}

impl Notation {
    pub fn arity(self) -> usize {
        match self {
            Notation::Infix => 2,
            Notation::Prefix | Notation::Postfix => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub notation: Notation,
    pub associativity: Associativity,
    pub precedence: u8,
}

impl Operator {
    /// Whether `self`, already on the stack, is applied before `incoming`.
    pub fn binds_before(&self, incoming: &Operator) -> bool {
        self.precedence < incoming.precedence
            || (self.precedence == incoming.precedence
                && incoming.associativity == Associativity::LeftToRight)
    }
}

const fn op(notation: Notation, associativity: Associativity, precedence: u8) -> Operator {
    Operator {
        notation,
        associativity,
        precedence,
    }
}

use Associativity::{LeftToRight, RightToLeft};
use Notation::{Infix, Postfix, Prefix};

#[rustfmt::skip]
const DEFAULT_OPERATORS: &[(&str, Operator)] = &[
    ("++", op(Postfix, LeftToRight, 1)),
    ("--", op(Postfix, LeftToRight, 1)),

    ("^",  op(Infix, RightToLeft, 2)),

    ("-",  op(Prefix, RightToLeft, 3)),
    ("!",  op(Prefix, RightToLeft, 3)),
    ("~",  op(Prefix, RightToLeft, 3)),
    ("++", op(Prefix, RightToLeft, 3)),
    ("--", op(Prefix, RightToLeft, 3)),

    ("*",  op(Infix, LeftToRight, 4)),
    ("/",  op(Infix, LeftToRight, 4)),
    ("%",  op(Infix, LeftToRight, 4)),

    ("+",  op(Infix, LeftToRight, 5)),
    ("-",  op(Infix, LeftToRight, 5)),

    ("<<", op(Infix, LeftToRight, 6)),
    (">>", op(Infix, LeftToRight, 6)),

    ("<",  op(Infix, LeftToRight, 7)),
    ("<=", op(Infix, LeftToRight, 7)),
    (">",  op(Infix, LeftToRight, 7)),
    (">=", op(Infix, LeftToRight, 7)),

    ("==", op(Infix, LeftToRight, 8)),
    ("!=", op(Infix, LeftToRight, 8)),

    ("&",  op(Infix, LeftToRight, 9)),
    ("|",  op(Infix, LeftToRight, 10)),
    ("&&", op(Infix, LeftToRight, 11)),
    ("||", op(Infix, LeftToRight, 12)),

    ("=",  op(Infix, RightToLeft, 13)),
    (":",  op(Infix, RightToLeft, 14)),
];

lazy_static! {
    static ref OPERATORS: HashMap<&'static str, Vec<Operator>> = {
        let mut table: HashMap<&'static str, Vec<Operator>> = HashMap::new();
        for (name, operator) in DEFAULT_OPERATORS {
            table.entry(*name).or_default().push(*operator);
        }
        table
    };
}

pub fn is_operator(name: &str) -> bool {
    OPERATORS.contains_key(name)
}

/// The entry for `name` in the given notation, if there is one.
pub fn lookup(name: &str, notation: Notation) -> Option<Operator> {
    OPERATORS
        .get(name)?
        .iter()
        .find(|entry| entry.notation == notation)
        .copied()
}

/// The name `=` assigns through the scope chain or into an accessor holder.
pub const ASSIGN: &str = "=";
/// The name `:` defines a property on the enclosing tuple or block.
pub const DEFINE: &str = ":";
