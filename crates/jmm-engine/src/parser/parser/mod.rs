//! Parser for Java--
//!
//! A recursive descent parser that turns the lexer's token stream into the
//! arena [`Ast`]. Node kinds and attribute names follow the contract the
//! checker and the OLLIR lowering consume.

pub mod decl;
pub mod expr;
pub mod recovery;
pub mod stmt;

use crate::parser::ast::{Ast, NodeId, NodeKind};
use crate::parser::error::ParseError;
use crate::parser::lexer::Lexer;
use crate::parser::token::{Span, Token};

/// Parser state for Java--.
///
/// Uses up to three tokens of lookahead to tell declarations
/// (`Foo[] x;`) apart from statements (`foo[i] = x;`).
pub struct Parser {
    /// Pre-tokenized input
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Tree under construction
    ast: Ast,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<ParseError>> {
        let tokens = Lexer::new(source)
            .tokenize()
            .map_err(|errors| errors.into_iter().map(ParseError::from).collect::<Vec<_>>())?;

        Ok(Self {
            tokens,
            pos: 0,
            ast: Ast::new(),
            errors: Vec::new(),
        })
    }

    /// Parse the whole compilation unit.
    ///
    /// Returns the tree on success, or all accumulated errors on failure.
    pub fn parse(mut self) -> Result<Ast, Vec<ParseError>> {
        let program = self.node(NodeKind::Program, self.current_span());
        self.ast.set_root(program);

        while self.check(&Token::Import) {
            match decl::parse_import(&mut self) {
                Ok(import) => self.ast.append_child(program, import),
                Err(err) => {
                    self.errors.push(err);
                    recovery::sync_past(&mut self, &Token::Semicolon);
                }
            }
        }

        match decl::parse_class(&mut self) {
            Ok(class) => {
                self.ast.append_child(program, class);
                if !self.at_eof() {
                    let err = self.unexpected_token(&[Token::Eof]);
                    self.errors.push(err);
                }
            }
            Err(err) => self.errors.push(err),
        }

        log::debug!(
            "parsed {} nodes with {} errors",
            self.ast.len(),
            self.errors.len()
        );

        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        Ok(self.ast)
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Peek `n` tokens ahead of the current one.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index].0
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> &Token {
        self.peek_nth(1)
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Current token index, used to detect recovery loops that do not advance.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume an identifier and return its name and span.
    pub fn expect_identifier(&mut self) -> Result<(String, Span), ParseError> {
        let span = self.current_span();
        match self.current() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.unexpected_token(&[Token::Identifier(String::new())])),
        }
    }

    // ========================================================================
    // Tree Construction
    // ========================================================================

    pub(crate) fn node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.ast.add_node(kind, span)
    }

    pub(crate) fn node_with(
        &mut self,
        kind: NodeKind,
        span: Span,
        attr: &'static str,
        value: impl Into<String>,
    ) -> NodeId {
        let id = self.ast.add_node(kind, span);
        self.ast.set_attr(id, attr, value);
        id
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.ast.append_child(parent, child);
    }

    pub(crate) fn ast(&self) -> &Ast {
        &self.ast
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    pub(crate) fn record(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Create an "unexpected token" error at the current position.
    pub(crate) fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }
}
