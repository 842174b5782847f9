//! Java-- front end
//!
//! This module provides:
//! - **Lexer**: tokenization using logos
//! - **Parser**: recursive descent parser producing the arena AST
//! - **AST**: node kinds, attributes and parent-aware cursors
//! - **Checker**: symbol table construction and semantic analysis

pub mod ast;
pub mod checker;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Ast, NodeId, NodeKind, NodeRef};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{LexError, Lexer};
pub use parser::Parser;
pub use token::{Span, Token};

/// Tokenize and parse a whole compilation unit.
pub fn parse_source(source: &str) -> Result<Ast, Vec<ParseError>> {
    Parser::new(source)?.parse()
}
