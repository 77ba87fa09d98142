//! Explicit-frame stack machine.
//!
//! Nodes with children are evaluated by pushing a [`Frame`] and scanning its
//! children left to right; leaves push straight onto the register stack.
//! When a frame runs out of children it is folded: every register above the
//! frame's base is drained and combined into (at most) one result. Script
//! calls push the callee's body as another frame on the same machine, so
//! script-to-script recursion never recurses on the host stack.

use std::rc::Rc;

use tracing::{debug, trace};

use super::EvaluatorOptions;
use super::error::{EvalError, ResourceExceeded};
use crate::parser::{Instruction, NodeId, SyntaxTree, operators};
use crate::values::{
    Completion, Construct, ConstructKind, ConstructRef, Continuation, Script, Signature, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Program body: the result is the last value produced.
    Sequence,
    /// A non-block script body: the frame's only child is the node itself.
    Thunk,
    Block,
    Tuple,
    List,
    Array,
    /// Evaluates the base, then walks the segments before `segments_end`.
    Accessor { segments_end: usize },
    Call,
    Operation,
    /// `target = value`
    Assign,
    /// `name : value`
    Define,
    ControlStructure,
    /// Waits for a callee's result and hands it to a native continuation.
    Resume,
}

struct Frame {
    tree: Rc<SyntaxTree>,
    node: NodeId,
    kind: FrameKind,
    next: usize,
    end: usize,
    base: usize,
    scope_height: usize,
    dot_height: usize,
    /// Outermost frame of a script invocation.
    call: bool,
    resume: Option<Continuation>,
}

impl Frame {
    fn child(&self, index: usize) -> NodeId {
        match self.kind {
            FrameKind::Thunk => self.node,
            _ => self.tree.children(self.node)[index],
        }
    }
}

pub struct Evaluator {
    options: EvaluatorOptions,
    frames: Vec<Frame>,
    registers: Vec<Value>,
    scopes: Vec<ConstructRef>,
    /// Targets for `:` and reflexive access. `None` entries (lists, arrays)
    /// hide outer targets.
    dots: Vec<Option<ConstructRef>>,
    call_depth: usize,
}

impl Evaluator {
    pub fn new(options: EvaluatorOptions) -> Self {
        Self {
            options,
            frames: Vec::new(),
            registers: Vec::new(),
            scopes: Vec::new(),
            dots: Vec::new(),
            call_depth: 0,
        }
    }

    /// Bind `args` against the script's signature and evaluate its body.
    ///
    /// The argument scope's prototype is `lexical` when given, else the
    /// script's captured context.
    pub fn run(
        &mut self,
        script: &Script,
        args: &Value,
        lexical: Option<ConstructRef>,
    ) -> Result<Value, EvalError> {
        let scope = bind(&script.signature, args);
        scope.set_prototype(lexical.or_else(|| script.context.clone()))?;
        self.run_in_scope(script, scope)
    }

    /// Evaluate the script's body directly in `scope`, without binding
    /// arguments. Top-level bindings land on `scope`.
    pub fn run_in_scope(&mut self, script: &Script, scope: ConstructRef) -> Result<Value, EvalError> {
        self.frames.clear();
        self.registers.clear();
        self.scopes.clear();
        self.dots.clear();
        self.call_depth = 0;

        self.enter_script(script, scope)?;
        self.execute()?;

        match self.registers.len() {
            0 => Ok(Value::UNDEFINED),
            1 => Ok(self.registers.pop().unwrap_or_default()),
            n => Err(EvalError::Internal(format!(
                "{} values left on the register stack",
                n
            ))),
        }
    }

    fn execute(&mut self) -> Result<(), EvalError> {
        while let Some(frame) = self.frames.last_mut() {
            if frame.next < frame.end {
                let index = frame.next;
                frame.next += 1;
                let tree = frame.tree.clone();
                let child = frame.child(index);
                if frame.kind == FrameKind::Assign && index == 1 {
                    // Accessor target: evaluate everything but the last segment.
                    let segments_end = tree.children(child).len() - 1;
                    self.push_frame(tree, child, FrameKind::Accessor { segments_end }, 0, 1)?;
                } else {
                    self.evaluate(tree, child)?;
                }
            } else if let Some(frame) = self.frames.pop() {
                self.fold(frame)?;
            }
        }
        Ok(())
    }

    fn scope(&self) -> Result<ConstructRef, EvalError> {
        self.scopes
            .last()
            .cloned()
            .ok_or_else(|| EvalError::Internal("no active scope".to_string()))
    }

    /// Innermost `:` target, if the nearest tuple/block frame provides one.
    fn dot(&self) -> Option<ConstructRef> {
        self.dots.last().cloned().flatten()
    }

    fn push_frame(
        &mut self,
        tree: Rc<SyntaxTree>,
        node: NodeId,
        kind: FrameKind,
        next: usize,
        end: usize,
    ) -> Result<(), EvalError> {
        if self.frames.len() >= self.options.max_frames {
            return Err(ResourceExceeded::FrameStack {
                depth: self.frames.len() + 1,
                max_depth: self.options.max_frames,
            }
            .into());
        }
        trace!(?kind, depth = self.frames.len(), "push frame");
        self.frames.push(Frame {
            tree,
            node,
            kind,
            next,
            end,
            base: self.registers.len(),
            scope_height: self.scopes.len(),
            dot_height: self.dots.len(),
            call: false,
            resume: None,
        });
        Ok(())
    }

    fn enter_script(&mut self, script: &Script, scope: ConstructRef) -> Result<(), EvalError> {
        if self.call_depth >= self.options.max_call_depth {
            return Err(ResourceExceeded::CallDepth {
                depth: self.call_depth + 1,
                max_depth: self.options.max_call_depth,
            }
            .into());
        }
        let tree = script.tree.clone();
        let body = script.body;
        let count = tree.children(body).len();
        let kind = match tree.instruction(body) {
            Instruction::Block => FrameKind::Block,
            Instruction::Program => FrameKind::Sequence,
            _ => FrameKind::Thunk,
        };
        let end = if kind == FrameKind::Thunk { 1 } else { count };
        self.push_frame(tree, body, kind, 0, end)?;

        // The bound scope doubles as the block object of a block body.
        self.scopes.push(scope.clone());
        if kind == FrameKind::Block {
            self.dots.push(Some(scope));
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.call = true;
        }
        self.call_depth += 1;
        Ok(())
    }

    /// Start evaluating `id`: leaves push a value, composite nodes a frame.
    fn evaluate(&mut self, tree: Rc<SyntaxTree>, id: NodeId) -> Result<(), EvalError> {
        let count = tree.children(id).len();
        match tree.instruction(id) {
            Instruction::Integer(value) => self.registers.push(Value::int(*value)),
            Instruction::Float(value) => self.registers.push(Value::float(*value)),
            Instruction::String(value) => self.registers.push(Value::string(value.clone())),
            Instruction::Identifier(name) if name.is_empty() => {
                let target = match self.dot() {
                    Some(dot) => dot,
                    None => self.scope()?,
                };
                self.registers.push(Value::Ref(target));
            }
            Instruction::Identifier(name) => {
                let value = self.scope()?.get(name, true);
                self.registers.push(value);
            }
            Instruction::Program => self.push_frame(tree, id, FrameKind::Sequence, 0, count)?,
            Instruction::Block => {
                let block = Construct::with_prototype(ConstructKind::Object, Some(self.scope()?));
                self.push_frame(tree, id, FrameKind::Block, 0, count)?;
                self.scopes.push(block.clone());
                self.dots.push(Some(block));
            }
            Instruction::Tuple => {
                self.push_frame(tree, id, FrameKind::Tuple, 0, count)?;
                self.dots.push(Some(Construct::object()));
            }
            Instruction::List => {
                self.push_frame(tree, id, FrameKind::List, 0, count)?;
                self.dots.push(None);
            }
            Instruction::Array => {
                self.push_frame(tree, id, FrameKind::Array, 0, count)?;
                self.dots.push(None);
            }
            Instruction::Accessor => {
                let kind = FrameKind::Accessor {
                    segments_end: count,
                };
                self.push_frame(tree, id, kind, 0, 1)?;
            }
            Instruction::Call => self.push_frame(tree, id, FrameKind::Call, 0, count)?,
            Instruction::Operation => self.evaluate_operation(tree, id)?,
            Instruction::Expression => {
                let (params, body) = match tree.children(id) {
                    [params, body] => (*params, *body),
                    _ => return Err(malformed(&tree, id)),
                };
                let signature = Signature::from_tuple_node(&tree, params)
                    .map_err(|e| EvalError::from(e).with_span(&tree.node(params).span))?;
                let context = Some(self.scope()?);
                let script = Script::new(signature, tree, body, context);
                self.registers.push(script.into_value());
            }
            Instruction::ControlStructure => {
                self.push_frame(tree, id, FrameKind::ControlStructure, 0, 1)?
            }
            Instruction::Statement | Instruction::Unknown => return Err(malformed(&tree, id)),
        }
        Ok(())
    }

    fn evaluate_operation(&mut self, tree: Rc<SyntaxTree>, id: NodeId) -> Result<(), EvalError> {
        let children = tree.children(id);
        let operator = children
            .first()
            .and_then(|op| tree.instruction(*op).identifier());
        let target = children.get(1).map(|t| tree.instruction(*t));
        match (operator, target) {
            (Some(operators::ASSIGN), Some(target)) if children.len() == 3 => match target {
                Instruction::Identifier(name) if !name.is_empty() => {
                    self.push_frame(tree, id, FrameKind::Assign, 2, 3)
                }
                Instruction::Accessor => self.push_frame(tree, id, FrameKind::Assign, 1, 3),
                _ => Err(invalid_target(&tree, children[1])),
            },
            (Some(operators::DEFINE), Some(target)) if children.len() == 3 => match target {
                Instruction::Identifier(name) if !name.is_empty() => {
                    self.push_frame(tree, id, FrameKind::Define, 2, 3)
                }
                Instruction::String(_) => self.push_frame(tree, id, FrameKind::Define, 2, 3),
                _ => Err(invalid_target(&tree, children[1])),
            },
            _ => {
                let count = children.len();
                self.push_frame(tree, id, FrameKind::Operation, 0, count)
            }
        }
    }

    /// Combine a finished frame's registers into its result.
    fn fold(&mut self, frame: Frame) -> Result<(), EvalError> {
        trace!(kind = ?frame.kind, depth = self.frames.len(), "fold frame");
        let mut values = self.registers.split_off(frame.base);
        let block = self.scopes.get(frame.scope_height).cloned();
        let dot = self.dots.get(frame.dot_height).cloned().flatten();
        self.scopes.truncate(frame.scope_height);
        self.dots.truncate(frame.dot_height);
        if frame.call {
            self.call_depth = self.call_depth.saturating_sub(1);
        }

        let tree = &frame.tree;
        let span = &tree.node(frame.node).span;
        let result = match frame.kind {
            FrameKind::Sequence | FrameKind::Thunk => values.pop().unwrap_or_default(),
            FrameKind::Block => match (values.pop(), block) {
                (Some(last), _) => last,
                (None, Some(block)) => Value::Ref(block),
                (None, None) => Value::UNDEFINED,
            },
            FrameKind::Tuple => {
                let tuple = Construct::new(ConstructKind::Tuple(values));
                if let Some(keyed) = dot {
                    tuple.merge(&keyed, true);
                }
                Value::Ref(tuple)
            }
            FrameKind::List => Value::list(values),
            FrameKind::Array => Value::array(values),
            FrameKind::Accessor { segments_end } => {
                let base = values.pop().unwrap_or_default();
                walk_segments(tree, frame.node, base, segments_end)
            }
            FrameKind::Call => {
                let mut values = values.into_iter();
                let callee = values.next().unwrap_or_default();
                let args = values.next().unwrap_or_else(|| Value::tuple(Vec::new()));
                return self.invoke(callee, args, tree, frame.node);
            }
            FrameKind::Operation => {
                let callee = if values.is_empty() {
                    Value::UNDEFINED
                } else {
                    values.remove(0)
                };
                return self.invoke(callee, Value::tuple(values), tree, frame.node);
            }
            FrameKind::Assign => {
                let value = values.pop().unwrap_or_default();
                let target = tree.children(frame.node)[1];
                match tree.instruction(target) {
                    Instruction::Identifier(name) => self.scope()?.set(name, value.clone(), true),
                    _ => {
                        let holder = values.pop().unwrap_or_default();
                        assign_member(tree, target, &holder, value.clone())
                            .map_err(|e| e.with_span(span))?;
                    }
                }
                value
            }
            FrameKind::Define => {
                let value = values.pop().unwrap_or_default();
                let target = tree.children(frame.node)[1];
                let name = match tree.instruction(target) {
                    Instruction::Identifier(name) | Instruction::String(name) => name,
                    _ => return Err(invalid_target(tree, target)),
                };
                let Some(dot) = self.dot() else {
                    return Err(EvalError::InvalidAssignment {
                        span: Some(span.clone()),
                    });
                };
                dot.set(name, value, false);
                return Ok(());
            }
            FrameKind::ControlStructure => {
                let callee = values.pop().unwrap_or_default();
                let children = tree.children(frame.node);
                let (args_node, body_node) = match children {
                    [_, args, body] => (*args, *body),
                    _ => return Err(malformed(tree, frame.node)),
                };
                let context = Some(self.scope()?);
                let thunk = |node: NodeId| {
                    Script::new(Signature::empty(), tree.clone(), node, context.clone()).into_value()
                };
                let mut thunks: Vec<Value> = tree.children(args_node).iter().map(|n| thunk(*n)).collect();
                thunks.push(thunk(body_node));
                return self.invoke(callee, Value::tuple(thunks), tree, frame.node);
            }
            FrameKind::Resume => {
                let value = values.pop().unwrap_or_default();
                let Some(then) = frame.resume else {
                    return Err(malformed(tree, frame.node));
                };
                return match then(value).map_err(|e| e.with_span(span))? {
                    Completion::Value(value) => {
                        self.registers.push(value);
                        Ok(())
                    }
                    Completion::Call { callee, args } => self.invoke(callee, args, tree, frame.node),
                    Completion::Then { callee, args, then } => {
                        self.push_resume(tree, frame.node, then)?;
                        self.invoke(callee, args, tree, frame.node)
                    }
                };
            }
        };
        self.registers.push(result);
        Ok(())
    }

    /// Park `then` until the next value is produced above the current
    /// registers.
    fn push_resume(
        &mut self,
        tree: &Rc<SyntaxTree>,
        node: NodeId,
        then: Continuation,
    ) -> Result<(), EvalError> {
        self.push_frame(tree.clone(), node, FrameKind::Resume, 0, 0)?;
        if let Some(frame) = self.frames.last_mut() {
            frame.resume = Some(then);
        }
        Ok(())
    }

    /// Call `callee` with the argument tuple `args` on behalf of the call
    /// site `node`. Native results are pushed; script calls push the body
    /// frame.
    fn invoke(
        &mut self,
        callee: Value,
        args: Value,
        tree: &Rc<SyntaxTree>,
        node: NodeId,
    ) -> Result<(), EvalError> {
        let name = tree
            .children(node)
            .first()
            .map(|callee| describe(tree, *callee))
            .unwrap_or_default();
        let name = name.as_str();
        let span = &tree.node(node).span;
        let mut callee = callee;
        let mut args = args;
        loop {
            let Some(construct) = callee.construct().cloned() else {
                return Err(EvalError::UndefinedCallee {
                    name: name.to_string(),
                    span: Some(span.clone()),
                });
            };
            let caller = self.scope()?;
            match construct.kind() {
                ConstructKind::Function(function) => {
                    let scope = bind(&function.signature, &args);
                    scope.set_prototype(Some(caller))?;
                    match (function.native)(&scope).map_err(|e| e.with_span(span))? {
                        Completion::Value(value) => {
                            self.registers.push(value);
                            return Ok(());
                        }
                        Completion::Call {
                            callee: next,
                            args: next_args,
                        } => {
                            callee = next;
                            args = next_args;
                        }
                        Completion::Then {
                            callee: next,
                            args: next_args,
                            then,
                        } => {
                            self.push_resume(tree, node, then)?;
                            callee = next;
                            args = next_args;
                        }
                    }
                }
                ConstructKind::Script(script) => {
                    debug!(callee = name, depth = self.call_depth, "invoking script");
                    let scope = bind(&script.signature, &args);
                    scope.set_prototype(Some(caller))?;
                    return self.enter_script(script, scope);
                }
                _ => {
                    return Err(EvalError::NotCallable {
                        name: name.to_string(),
                        type_name: construct.type_name(),
                        span: Some(span.clone()),
                    });
                }
            }
        }
    }
}

fn bind(signature: &Signature, args: &Value) -> ConstructRef {
    match args.construct() {
        Some(args) => signature.bind(args),
        None => signature.bind(&Construct::object()),
    }
}

fn walk_segments(tree: &SyntaxTree, accessor: NodeId, base: Value, segments_end: usize) -> Value {
    let segments = &tree.children(accessor)[1..segments_end.max(1)];
    segments.iter().fold(base, |current, segment| {
        let Some(construct) = current.construct() else {
            return Value::UNDEFINED;
        };
        match tree.instruction(*segment) {
            Instruction::Identifier(name) if name.is_empty() => {
                construct.prototype().map(Value::Ref).unwrap_or_default()
            }
            Instruction::Identifier(name) | Instruction::String(name) => construct.get(name, true),
            Instruction::Integer(index) => construct.index(*index),
            _ => Value::UNDEFINED,
        }
    })
}

/// Store `value` through the last segment of an accessor target.
fn assign_member(
    tree: &SyntaxTree,
    target: NodeId,
    holder: &Value,
    value: Value,
) -> Result<(), EvalError> {
    let Some(holder) = holder.construct() else {
        return Err(invalid_target(tree, target));
    };
    let Some(&segment) = tree.children(target).last() else {
        return Err(invalid_target(tree, target));
    };
    match tree.instruction(segment) {
        Instruction::Identifier(name) | Instruction::String(name) if !name.is_empty() => {
            holder.set(name, value, false);
        }
        Instruction::Integer(index) => holder.set_index(*index, value)?,
        _ => return Err(invalid_target(tree, target)),
    }
    Ok(())
}

/// Human-readable name of a callee or target node.
fn describe(tree: &SyntaxTree, id: NodeId) -> String {
    match tree.instruction(id) {
        Instruction::Identifier(name) => name.clone(),
        Instruction::Accessor => tree
            .children(id)
            .iter()
            .map(|segment| match tree.instruction(*segment) {
                Instruction::Identifier(name) | Instruction::String(name) => name.clone(),
                Instruction::Integer(index) => index.to_string(),
                _ => describe(tree, *segment),
            })
            .collect::<Vec<_>>()
            .join("."),
        _ => tree.to_sexpr(id),
    }
}

fn invalid_target(tree: &SyntaxTree, id: NodeId) -> EvalError {
    EvalError::InvalidAssignmentTarget {
        target: describe(tree, id),
        span: Some(tree.node(id).span.clone()),
    }
}

fn malformed(tree: &SyntaxTree, id: NodeId) -> EvalError {
    EvalError::Internal(format!(
        "malformed {} node",
        tree.instruction(id).type_name()
    ))
}
