//! Parameter lists and argument binding.

use core::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use super::construct::{Construct, ConstructRef, Value};
use crate::parser::{Instruction, NodeId, SyntaxTree, operators};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid parameter '{0}'")]
pub struct InvalidParameter(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Takes one positional value, or a keyed value of the same name.
    Single,
    /// Takes a share of the positional values left over by the singles.
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: SmallVec<[Parameter; 4]>,
}

impl Signature {
    pub fn new(parameters: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            parameters: parameters.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            kind: ParameterKind::Single,
        });
        self
    }

    pub fn list(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            kind: ParameterKind::List,
        });
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parse a host-side signature such as `"a, b, [rest]"`.
    pub fn parse_str(text: &str) -> Result<Self, InvalidParameter> {
        let mut signature = Signature::empty();
        for raw in text.split(',').map(str::trim) {
            if raw.is_empty() {
                if text.trim().is_empty() {
                    break;
                }
                return Err(InvalidParameter(raw.to_string()));
            }
            signature = match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                Some(inner) if is_parameter_name(inner.trim()) => signature.list(inner.trim()),
                None if is_parameter_name(raw) => signature.single(raw),
                _ => return Err(InvalidParameter(raw.to_string())),
            };
        }
        Ok(signature)
    }

    /// Build a signature from an expression's parameter tuple: identifiers
    /// are singles, one-identifier lists are list parameters.
    pub fn from_tuple_node(tree: &SyntaxTree, tuple: NodeId) -> Result<Self, InvalidParameter> {
        let mut signature = Signature::empty();
        for &child in tree.children(tuple) {
            signature = match tree.instruction(child) {
                Instruction::Identifier(name) if is_parameter_name(name) => signature.single(name),
                Instruction::List => match tree.children(child) {
                    [inner] => match tree.instruction(*inner) {
                        Instruction::Identifier(name) if is_parameter_name(name) => {
                            signature.list(name)
                        }
                        other => return Err(InvalidParameter(format!("[{}]", other))),
                    },
                    _ => return Err(InvalidParameter(tree.to_sexpr(child))),
                },
                _ => return Err(InvalidParameter(tree.to_sexpr(child))),
            };
        }
        Ok(signature)
    }

    /// Bind an argument tuple to a fresh scope holding one property per
    /// parameter. The caller installs the scope's prototype.
    ///
    /// Singles take positional values in order, padded with `Undefined`;
    /// a keyed value of the same name wins over the positional one. Lists
    /// share the positional values left over after the singles, each taking
    /// at most `ceil(remaining / lists)` of what is still unclaimed.
    pub fn bind(&self, args: &Construct) -> ConstructRef {
        let positional = args.elements();
        let singles = self
            .parameters
            .iter()
            .filter(|p| p.kind == ParameterKind::Single)
            .count();
        let lists = self.parameters.len() - singles;
        let remaining = positional.len().saturating_sub(singles);
        let per_list = if lists > 0 { remaining.div_ceil(lists) } else { 0 };

        let scope = Construct::object();
        let mut cursor = 0;
        let mut list_budget = remaining;
        for parameter in &self.parameters {
            let value = match parameter.kind {
                ParameterKind::Single => {
                    let value = positional.get(cursor).cloned().unwrap_or_default();
                    cursor += 1;
                    if args.has(&parameter.name, false) {
                        args.get(&parameter.name, false)
                    } else {
                        value
                    }
                }
                ParameterKind::List => {
                    let start = cursor.min(positional.len());
                    let end = (start + per_list.min(list_budget)).min(positional.len());
                    list_budget -= end - start;
                    cursor = end;
                    Value::list(positional[start..end].to_vec())
                }
            };
            scope.set(&parameter.name, value, false);
        }
        scope
    }
}

fn is_parameter_name(name: &str) -> bool {
    !name.is_empty() && !operators::is_operator(name) && !name.contains(['[', ']', ' '])
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match parameter.kind {
                ParameterKind::Single => f.write_str(&parameter.name)?,
                ParameterKind::List => write!(f, "[{}]", parameter.name)?,
            }
        }
        Ok(())
    }
}
