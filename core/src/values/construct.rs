//! The universal runtime value.
//!
//! Every value is a [`Construct`]: a property map plus an optional prototype
//! link, tagged with a [`ConstructKind`] that carries the variant payload.
//! Constructs are shared through [`ConstructRef`] (`Rc`) and mutated through
//! interior mutability. Reference cycles (a list holding itself, an object
//! whose property points back at it) are not collected.

use core::cell::{Ref, RefCell};
use core::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use thiserror::Error;

use super::function::{Function, Script};
use crate::syntax::escape_string;

pub type ConstructRef = Rc<Construct>;

/// Upper bound on prototype links followed by any chain walk.
pub const MAX_PROTOTYPE_DEPTH: usize = 1024;

/// Rendering stops descending into nested values past this depth.
const MAX_DISPLAY_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("prototype link would create a cycle")]
    PrototypeCycle,
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("{type_name} has no elements")]
    NotIndexable { type_name: &'static str },
    #[error("cannot modify the elements of a {type_name}")]
    Immutable { type_name: &'static str },
}

/// Either the `Undefined` sentinel or a shared construct.
///
/// Equality is identity: two `Ref`s are equal only when they point at the
/// same construct.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Ref(ConstructRef),
}

impl Value {
    pub const UNDEFINED: Value = Value::Undefined;

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn construct(&self) -> Option<&ConstructRef> {
        match self {
            Value::Undefined => None,
            Value::Ref(construct) => Some(construct),
        }
    }

    pub fn kind(&self) -> Option<&ConstructKind> {
        self.construct().map(|c| c.kind())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "Undefined",
            Value::Ref(construct) => construct.type_name(),
        }
    }

    pub fn object() -> Value {
        Value::Ref(Construct::object())
    }
    pub fn bool(value: bool) -> Value {
        Value::Ref(Construct::new(ConstructKind::Bool(value)))
    }
    pub fn int(value: i64) -> Value {
        Value::Ref(Construct::new(ConstructKind::Int(value)))
    }
    pub fn float(value: f64) -> Value {
        Value::Ref(Construct::new(ConstructKind::Float(value)))
    }
    pub fn string(value: impl Into<String>) -> Value {
        Value::Ref(Construct::new(ConstructKind::String(value.into())))
    }
    pub fn tuple(elements: Vec<Value>) -> Value {
        Value::Ref(Construct::new(ConstructKind::Tuple(elements)))
    }
    pub fn list(elements: Vec<Value>) -> Value {
        Value::Ref(Construct::new(ConstructKind::List(RefCell::new(elements))))
    }
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Ref(Construct::new(ConstructKind::Array(RefCell::new(elements))))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind()? {
            ConstructKind::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.kind()? {
            ConstructKind::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Float value, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self.kind()? {
            ConstructKind::Float(value) => Some(*value),
            ConstructKind::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.kind()? {
            ConstructKind::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Ref(a), Value::Ref(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl From<ConstructRef> for Value {
    fn from(construct: ConstructRef) -> Self {
        Value::Ref(construct)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Variant payload of a construct.
pub enum ConstructKind {
    /// Plain object; also used for scopes.
    Object,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Fixed positional values. Keyed values live in the property map.
    Tuple(Vec<Value>),
    /// Fixed length, mutable elements.
    Array(RefCell<Vec<Value>>),
    List(RefCell<Vec<Value>>),
    Function(Function),
    Script(Script),
}

pub struct Construct {
    properties: RefCell<HashMap<String, Value>>,
    prototype: RefCell<Option<ConstructRef>>,
    kind: ConstructKind,
}

impl Construct {
    pub fn new(kind: ConstructKind) -> ConstructRef {
        Self::with_prototype(kind, None)
    }

    pub fn with_prototype(kind: ConstructKind, prototype: Option<ConstructRef>) -> ConstructRef {
        Rc::new(Construct {
            properties: RefCell::new(HashMap::new()),
            prototype: RefCell::new(prototype),
            kind,
        })
    }

    pub fn object() -> ConstructRef {
        Self::new(ConstructKind::Object)
    }

    pub fn kind(&self) -> &ConstructKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ConstructKind::Object => "Object",
            ConstructKind::Bool(_) => "Bool",
            ConstructKind::Int(_) => "Int",
            ConstructKind::Float(_) => "Float",
            ConstructKind::String(_) => "String",
            ConstructKind::Tuple(_) => "Tuple",
            ConstructKind::Array(_) => "Array",
            ConstructKind::List(_) => "List",
            ConstructKind::Function(_) => "Function",
            ConstructKind::Script(_) => "Script",
        }
    }

    pub fn prototype(&self) -> Option<ConstructRef> {
        self.prototype.borrow().clone()
    }

    /// Replace the prototype link. Refuses a link that would make this
    /// construct its own ancestor.
    pub fn set_prototype(&self, prototype: Option<ConstructRef>) -> Result<(), ValueError> {
        if let Some(proto) = &prototype {
            let mut current = Some(proto.clone());
            let mut depth = 0;
            while let Some(c) = current {
                if core::ptr::eq(c.as_ref(), self) {
                    return Err(ValueError::PrototypeCycle);
                }
                depth += 1;
                if depth > MAX_PROTOTYPE_DEPTH {
                    break;
                }
                current = c.prototype();
            }
        }
        *self.prototype.borrow_mut() = prototype;
        Ok(())
    }

    /// Ancestors of this construct, nearest first, bounded by
    /// [`MAX_PROTOTYPE_DEPTH`].
    fn ancestors(&self) -> impl Iterator<Item = ConstructRef> {
        let mut next = self.prototype();
        let mut depth = 0;
        core::iter::from_fn(move || {
            if depth >= MAX_PROTOTYPE_DEPTH {
                return None;
            }
            let current = next.take()?;
            next = current.prototype();
            depth += 1;
            Some(current)
        })
    }

    fn own(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }

    /// Look `name` up on this construct, then along the prototype chain when
    /// `search_parents` is set. `Undefined` when nothing owns it.
    pub fn get(&self, name: &str, search_parents: bool) -> Value {
        if let Some(value) = self.own(name) {
            return value;
        }
        if search_parents {
            for ancestor in self.ancestors() {
                if let Some(value) = ancestor.own(name) {
                    return value;
                }
            }
        }
        Value::UNDEFINED
    }

    /// Write `name`. With `search_parents`, the nearest construct in the
    /// chain that already owns `name` receives the write; otherwise (or when
    /// nobody owns it) this construct does.
    pub fn set(&self, name: &str, value: Value, search_parents: bool) {
        if search_parents && !self.properties.borrow().contains_key(name) {
            if let Some(owner) = self
                .ancestors()
                .find(|a| a.properties.borrow().contains_key(name))
            {
                owner.properties.borrow_mut().insert(name.to_string(), value);
                return;
            }
        }
        self.properties.borrow_mut().insert(name.to_string(), value);
    }

    pub fn has(&self, name: &str, search_parents: bool) -> bool {
        if self.properties.borrow().contains_key(name) {
            return true;
        }
        search_parents
            && self
                .ancestors()
                .any(|a| a.properties.borrow().contains_key(name))
    }

    /// Remove an own property. Inherited properties are untouched.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.properties.borrow_mut().remove(name)
    }

    /// Copy `other`'s own properties onto this construct.
    pub fn merge(&self, other: &Construct, overwrite: bool) {
        if core::ptr::eq(self, other) {
            return;
        }
        let source = other.properties.borrow();
        let mut target = self.properties.borrow_mut();
        for (name, value) in source.iter() {
            if overwrite || !target.contains_key(name) {
                target.insert(name.clone(), value.clone());
            }
        }
    }

    /// Number of own properties.
    pub fn count(&self) -> usize {
        self.properties.borrow().len()
    }

    /// Own property names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.properties.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn properties(&self) -> Ref<'_, HashMap<String, Value>> {
        self.properties.borrow()
    }

    /// Number of positional elements, for sequences.
    pub fn len(&self) -> Option<usize> {
        match &self.kind {
            ConstructKind::Tuple(elements) => Some(elements.len()),
            ConstructKind::Array(elements) | ConstructKind::List(elements) => {
                Some(elements.borrow().len())
            }
            ConstructKind::String(s) => Some(s.chars().count()),
            _ => None,
        }
    }

    /// Snapshot of the positional elements. Empty for non-sequences.
    pub fn elements(&self) -> Vec<Value> {
        match &self.kind {
            ConstructKind::Tuple(elements) => elements.clone(),
            ConstructKind::Array(elements) | ConstructKind::List(elements) => {
                elements.borrow().clone()
            }
            _ => Vec::new(),
        }
    }

    /// Positional element `index`; negative indices count from the end.
    /// `Undefined` when out of range or not a sequence.
    pub fn index(&self, index: i64) -> Value {
        let lookup = |elements: &[Value]| {
            resolve_index(index, elements.len())
                .map(|i| elements[i].clone())
                .unwrap_or_default()
        };
        match &self.kind {
            ConstructKind::Tuple(elements) => lookup(elements),
            ConstructKind::Array(elements) | ConstructKind::List(elements) => {
                lookup(&elements.borrow())
            }
            _ => Value::UNDEFINED,
        }
    }

    pub fn set_index(&self, index: i64, value: Value) -> Result<(), ValueError> {
        match &self.kind {
            ConstructKind::Array(elements) | ConstructKind::List(elements) => {
                let mut elements = elements.borrow_mut();
                let len = elements.len();
                let i = resolve_index(index, len)
                    .ok_or(ValueError::IndexOutOfBounds { index, len })?;
                elements[i] = value;
                Ok(())
            }
            ConstructKind::Tuple(_) => Err(ValueError::Immutable {
                type_name: self.type_name(),
            }),
            _ => Err(ValueError::NotIndexable {
                type_name: self.type_name(),
            }),
        }
    }

    /// Append to a List.
    pub fn push(&self, value: Value) -> Result<(), ValueError> {
        match &self.kind {
            ConstructKind::List(elements) => {
                elements.borrow_mut().push(value);
                Ok(())
            }
            ConstructKind::Array(_) | ConstructKind::Tuple(_) => Err(ValueError::Immutable {
                type_name: self.type_name(),
            }),
            _ => Err(ValueError::NotIndexable {
                type_name: self.type_name(),
            }),
        }
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let i = if index < 0 {
        len.checked_sub(index.unsigned_abs() as usize)?
    } else {
        index as usize
    };
    (i < len).then_some(i)
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_construct(f, self, &mut Vec::new())
    }
}

impl fmt::Debug for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self)
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, seen: &mut Vec<*const Construct>) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Ref(construct) => write_construct(f, construct, seen),
    }
}

fn write_construct(
    f: &mut fmt::Formatter<'_>,
    construct: &Construct,
    seen: &mut Vec<*const Construct>,
) -> fmt::Result {
    let ptr = construct as *const Construct;
    if seen.contains(&ptr) || seen.len() >= MAX_DISPLAY_DEPTH {
        return f.write_str("...");
    }
    match &construct.kind {
        ConstructKind::Bool(value) => return write!(f, "{}", value),
        ConstructKind::Int(value) => return write!(f, "{}", value),
        ConstructKind::Float(value) => return write!(f, "{:?}", value),
        ConstructKind::String(value) => return escape_string(f, value),
        ConstructKind::Function(_) => return f.write_str("<function>"),
        ConstructKind::Script(_) => return f.write_str("<script>"),
        _ => {}
    }

    seen.push(ptr);
    let result = match &construct.kind {
        ConstructKind::Tuple(elements) => {
            write_sequence(f, "(", ")", elements, Some(construct), seen)
        }
        ConstructKind::List(elements) => write_sequence(f, "[", "]", &elements.borrow(), None, seen),
        ConstructKind::Array(elements) => {
            write_sequence(f, "[|", "|]", &elements.borrow(), None, seen)
        }
        _ => write_properties(f, construct, seen),
    };
    seen.pop();
    result
}

fn write_sequence(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    close: &str,
    elements: &[Value],
    keyed: Option<&Construct>,
    seen: &mut Vec<*const Construct>,
) -> fmt::Result {
    f.write_str(open)?;
    let mut first = true;
    for element in elements {
        if !first {
            f.write_str(",")?;
        }
        first = false;
        write_value(f, element, seen)?;
    }
    if let Some(construct) = keyed {
        for key in construct.keys() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{}:", key)?;
            write_value(f, &construct.get(&key, false), seen)?;
        }
    }
    f.write_str(close)
}

fn write_properties(
    f: &mut fmt::Formatter<'_>,
    construct: &Construct,
    seen: &mut Vec<*const Construct>,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, key) in construct.keys().iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}:", key)?;
        write_value(f, &construct.get(key, false), seen)?;
    }
    f.write_str("}")
}
