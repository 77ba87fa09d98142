//! Structural pass: token stream to syntax tree.
//!
//! Tokens are consumed one at a time against a cursor (the open statement,
//! or the open accessor chain inside it). Statements are resolved into
//! operator trees as they close.

use tracing::{trace, warn};

use super::error::{ParseError, ParseErrorKind};
use super::operators;
use super::resolve::resolve_statement;
use super::syntax_tree::{Directive, Instruction, NodeId, SyntaxTree};
use crate::lexer::{Region, Token, TokenKind};
use crate::syntax::{Location, Number, Span, parse_number, unescape_string};

/// Parse a token stream, failing on the first error.
pub fn parse(tokens: &[Token]) -> Result<SyntaxTree, ParseError> {
    let mut parser = Parser::new(true);
    for token in tokens {
        parser.next(token)?;
    }
    parser.finish()?;
    Ok(parser.tree)
}

/// Parse a token stream, recording errors and carrying on.
///
/// A statement that fails to resolve is dropped, a stray or mismatched
/// closer is skipped and unclosed regions are closed at end of input.
pub fn parse_recovering(tokens: &[Token]) -> (SyntaxTree, Vec<ParseError>) {
    let mut parser = Parser::new(false);
    for token in tokens {
        // Errors are recorded, never returned, when not failing fast.
        let _ = parser.next(token);
    }
    let _ = parser.finish();
    (parser.tree, parser.errors)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Program,
    Region(Region),
}

#[derive(Debug)]
struct OpenRegion {
    scope: Scope,
    /// The node whose children are this region's statements.
    node: NodeId,
    /// The statement to return to once the region closes.
    outer: NodeId,
    location: Location,
    span: Span,
}

struct Parser {
    tree: SyntaxTree,
    regions: Vec<OpenRegion>,
    statement: NodeId,
    accessor: Option<NodeId>,
    previous: Option<TokenKind>,
    fail_fast: bool,
    errors: Vec<ParseError>,
}

impl Parser {
    fn new(fail_fast: bool) -> Self {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let statement = tree.add(Instruction::Statement, Location::new(1, 1), Span::default());
        tree.append(root, statement);
        Self {
            tree,
            regions: vec![OpenRegion {
                scope: Scope::Program,
                node: root,
                outer: root,
                location: Location::new(1, 1),
                span: Span::default(),
            }],
            statement,
            accessor: None,
            previous: None,
            fail_fast,
            errors: Vec::new(),
        }
    }

    fn report(&mut self, error: ParseError) -> Result<(), ParseError> {
        if self.fail_fast {
            return Err(error);
        }
        warn!(%error, "recovered from parse error");
        self.errors.push(error);
        Ok(())
    }

    fn current(&self) -> &OpenRegion {
        // The program entry is never popped.
        &self.regions[self.regions.len() - 1]
    }

    fn next(&mut self, token: &Token) -> Result<(), ParseError> {
        trace!(%token, "structural pass");
        match token.kind {
            TokenKind::Comment => return Ok(()),
            TokenKind::PreprocessorCommand => {
                self.tree.directives.push(Directive {
                    command: token.text.clone(),
                    arguments: Vec::new(),
                    location: token.location,
                });
                return Ok(());
            }
            TokenKind::PreprocessorArgument => {
                if let Some(directive) = self.tree.directives.last_mut() {
                    directive.arguments.push(token.text.clone());
                }
                return Ok(());
            }
            _ => {}
        }

        let previous = self.previous.replace(token.kind);
        let after_accessor = previous == Some(TokenKind::Accessor);

        match token.kind {
            TokenKind::Accessor => self.accessor(token, after_accessor),
            TokenKind::Identifier | TokenKind::Number | TokenKind::String if after_accessor => {
                let leaf = self.leaf(token)?;
                if let (Some(leaf), Some(accessor)) = (leaf, self.accessor) {
                    self.tree.append(accessor, leaf);
                    self.extend_span(accessor, &token.span);
                }
                Ok(())
            }
            _ => {
                self.end_accessor(token, after_accessor)?;
                match token.kind {
                    TokenKind::Identifier | TokenKind::Number | TokenKind::String => {
                        self.literal(token, previous)
                    }
                    TokenKind::RegionOpen(region) => self.open(token, region),
                    TokenKind::RegionClose(region) => self.close(token, region),
                    TokenKind::Separator => self.separator(token),
                    TokenKind::Terminator => self.terminator(token),
                    _ => Ok(()),
                }
            }
        }
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        let after_accessor = self.previous == Some(TokenKind::Accessor);
        let end = self.tree.node(self.statement).span.clone();
        let eof = Token::new(TokenKind::Terminator, "", self.current().location, end);
        self.end_accessor(&eof, after_accessor)?;

        while self.regions.len() > 1 {
            let open = &self.regions[self.regions.len() - 1];
            let opener = match open.scope {
                Scope::Region(region) => region.opener(),
                Scope::Program => "",
            };
            let error = ParseError::new(
                ParseErrorKind::UnclosedRegion { opener },
                opener,
                open.location,
                open.span.clone(),
            );
            self.report(error)?;
            self.pop_region()?;
        }
        self.close_statement(self.statement)
    }

    fn extend_span(&mut self, id: NodeId, span: &Span) {
        let current = self.tree.node(id).span.clone();
        self.tree.set_span(id, Span::combine(&current, span));
    }

    /// Build the leaf node for a literal or identifier token. `None` when the
    /// literal was invalid and the error was recorded.
    fn leaf(&mut self, token: &Token) -> Result<Option<NodeId>, ParseError> {
        let instruction = match token.kind {
            TokenKind::Number => match parse_number(&token.text) {
                Some(Number::Integer(value)) => Instruction::Integer(value),
                Some(Number::Float(value)) => Instruction::Float(value),
                None => {
                    self.report(self.token_error(ParseErrorKind::InvalidNumber, token))?;
                    return Ok(None);
                }
            },
            TokenKind::String => match unescape_string(&token.text) {
                Ok(value) => Instruction::String(value),
                Err(e) => {
                    self.report(self.token_error(ParseErrorKind::InvalidString(e), token))?;
                    return Ok(None);
                }
            },
            _ => Instruction::Identifier(token.text.clone()),
        };
        Ok(Some(self.tree.add(instruction, token.location, token.span.clone())))
    }

    fn token_error(&self, kind: ParseErrorKind, token: &Token) -> ParseError {
        ParseError::new(kind, token.text.clone(), token.location, token.span.clone())
    }

    fn literal(&mut self, token: &Token, previous: Option<TokenKind>) -> Result<(), ParseError> {
        let Some(leaf) = self.leaf(token)? else {
            return Ok(());
        };
        // Adjacent strings concatenate.
        if token.kind == TokenKind::String && previous == Some(TokenKind::String) {
            if let Some(last) = self.tree.last_child(self.statement) {
                if let (Instruction::String(head), Instruction::String(tail)) =
                    (self.tree.instruction(last), self.tree.instruction(leaf))
                {
                    let joined = format!("{}{}", head, tail);
                    self.tree.set_instruction(last, Instruction::String(joined));
                    self.extend_span(last, &token.span);
                    return Ok(());
                }
            }
        }
        self.tree.append(self.statement, leaf);
        Ok(())
    }

    fn accessor(&mut self, token: &Token, after_accessor: bool) -> Result<(), ParseError> {
        if let Some(accessor) = self.accessor {
            if after_accessor {
                // `a..b`: an empty segment steps to the prototype.
                let empty = self.tree.add(
                    Instruction::Identifier(String::new()),
                    token.location,
                    token.span.clone(),
                );
                self.tree.append(accessor, empty);
            }
            self.extend_span(accessor, &token.span);
            return Ok(());
        }

        let base = match self.tree.last_child(self.statement) {
            Some(last) if !self.is_operator(last) => {
                self.tree.detach(last);
                last
            }
            // No value to the left: access starts from the enclosing object.
            _ => self.tree.add(
                Instruction::Identifier(String::new()),
                token.location,
                Span::new(token.span.0.start, token.span.0.start),
            ),
        };
        let base_node = self.tree.node(base);
        let (location, span) = (base_node.location, Span::combine(&base_node.span, &token.span));
        let accessor = self.tree.add(Instruction::Accessor, location, span);
        self.tree.append(accessor, base);
        self.tree.append(self.statement, accessor);
        self.accessor = Some(accessor);
        Ok(())
    }

    /// Close the accessor chain, if any, before a token that cannot extend it.
    fn end_accessor(&mut self, token: &Token, after_accessor: bool) -> Result<(), ParseError> {
        let Some(_) = self.accessor.take() else {
            return Ok(());
        };
        if after_accessor {
            self.report(self.token_error(ParseErrorKind::MissingMember, token))?;
        }
        Ok(())
    }

    fn is_operator(&self, id: NodeId) -> bool {
        self.tree
            .instruction(id)
            .identifier()
            .is_some_and(operators::is_operator)
    }

    fn is_callable(&self, id: NodeId) -> bool {
        match self.tree.instruction(id) {
            Instruction::Identifier(name) => !name.is_empty() && !operators::is_operator(name),
            Instruction::Accessor | Instruction::Call | Instruction::Expression => true,
            _ => false,
        }
    }

    fn open(&mut self, token: &Token, region: Region) -> Result<(), ParseError> {
        let location = token.location;
        let span = token.span.clone();
        let node = self.tree.add(region_instruction(region), location, span.clone());
        let last = self.tree.last_child(self.statement);

        match (region, last) {
            (Region::Tuple, Some(callee)) if self.is_callable(callee) => {
                let call = self.wrap(callee, Instruction::Call);
                self.tree.append(call, node);
            }
            (Region::Block, Some(params)) if *self.tree.instruction(params) == Instruction::Tuple => {
                let expression = self.wrap(params, Instruction::Expression);
                self.tree.append(expression, node);
            }
            (Region::Block, Some(call)) if *self.tree.instruction(call) == Instruction::Call => {
                self.tree.set_instruction(call, Instruction::ControlStructure);
                self.tree.append(call, node);
            }
            _ => self.tree.append(self.statement, node),
        }

        let statement = self.tree.add(Instruction::Statement, location, span.clone());
        self.tree.append(node, statement);
        self.regions.push(OpenRegion {
            scope: Scope::Region(region),
            node,
            outer: self.statement,
            location,
            span,
        });
        self.statement = statement;
        Ok(())
    }

    /// Replace `inner` in its statement with a new `instruction` node that
    /// holds `inner` as first child.
    fn wrap(&mut self, inner: NodeId, instruction: Instruction) -> NodeId {
        let node = self.tree.node(inner);
        let (location, span) = (node.location, node.span.clone());
        let wrapper = self.tree.add(instruction, location, span);
        self.tree.replace(inner, wrapper);
        self.tree.append(wrapper, inner);
        wrapper
    }

    fn close(&mut self, token: &Token, region: Region) -> Result<(), ParseError> {
        let open = self.current().scope;
        match open {
            Scope::Program => {
                let kind = ParseErrorKind::UnexpectedRegionClose {
                    found: region.closer(),
                };
                self.report(self.token_error(kind, token))
            }
            Scope::Region(expected) if expected != region => {
                let kind = ParseErrorKind::MismatchedRegion {
                    expected: expected.closer(),
                    found: region.closer(),
                };
                self.report(self.token_error(kind, token))
            }
            Scope::Region(_) => {
                let node = self.current().node;
                self.extend_span(node, &token.span);
                self.pop_region()
            }
        }
    }

    fn pop_region(&mut self) -> Result<(), ParseError> {
        let result = self.close_statement(self.statement);
        if self.regions.len() > 1 {
            if let Some(open) = self.regions.pop() {
                self.statement = open.outer;
            }
        }
        result
    }

    fn separator(&mut self, token: &Token) -> Result<(), ParseError> {
        let (scope, node) = (self.current().scope, self.current().node);
        if !matches!(
            scope,
            Scope::Region(Region::Tuple | Region::List | Region::Array)
        ) {
            return self.report(self.token_error(ParseErrorKind::InvalidSeparator, token));
        }
        if self.tree.children(self.statement).is_empty() {
            self.report(self.token_error(ParseErrorKind::EmptyElement, token))?;
        }
        let result = self.close_statement(self.statement);
        self.new_statement(node, token);
        result
    }

    fn terminator(&mut self, token: &Token) -> Result<(), ParseError> {
        let (scope, node) = (self.current().scope, self.current().node);
        if !matches!(scope, Scope::Program | Scope::Region(Region::Block)) {
            return self.report(self.token_error(ParseErrorKind::InvalidTerminator, token));
        }
        let result = self.close_statement(self.statement);
        self.new_statement(node, token);
        result
    }

    fn new_statement(&mut self, parent: NodeId, token: &Token) {
        let statement = self.tree.add(Instruction::Statement, token.location, token.span.clone());
        self.tree.append(parent, statement);
        self.statement = statement;
    }

    /// Replace a statement with its resolved content, or drop it when empty.
    /// The statement is dropped on a resolution error too.
    fn close_statement(&mut self, statement: NodeId) -> Result<(), ParseError> {
        match self.tree.children(statement).len() {
            0 => {
                self.tree.detach(statement);
                Ok(())
            }
            1 => {
                let child = self.tree.children(statement)[0];
                self.tree.replace(statement, child);
                Ok(())
            }
            _ => match resolve_statement(&mut self.tree, statement) {
                Ok(root) => {
                    self.tree.replace(statement, root);
                    Ok(())
                }
                Err(error) => {
                    self.tree.detach(statement);
                    self.report(error)
                }
            },
        }
    }
}

fn region_instruction(region: Region) -> Instruction {
    match region {
        Region::Tuple => Instruction::Tuple,
        Region::List => Instruction::List,
        Region::Array => Instruction::Array,
        Region::Block => Instruction::Block,
    }
}
