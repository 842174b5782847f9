//! Parse error types and error reporting

use crate::parser::lexer::LexError;
use crate::parser::token::{Span, Token};
use std::fmt;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken { expected: Vec<Token>, found: Token },

    /// Unexpected end of file
    UnexpectedEof { expected: Vec<Token> },

    /// Invalid syntax
    InvalidSyntax { reason: String },

    /// Integer literal outside the 32-bit range
    InvalidNumber { value: String },

    /// Error raised while tokenizing
    Lex(LexError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.span.line, self.span.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

fn describe(expected: &[Token]) -> String {
    let names: Vec<String> = expected.iter().map(|t| format!("'{}'", t)).collect();
    names.join(", ")
}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: Vec<Token>, found: Token, span: Span) -> Self {
        let message = if expected.len() == 1 {
            format!("Expected {}, found '{}'", describe(&expected), found)
        } else if expected.is_empty() {
            format!("Unexpected token '{}'", found)
        } else {
            format!("Expected one of {}, found '{}'", describe(&expected), found)
        };

        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
        }
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(expected: Vec<Token>, span: Span) -> Self {
        let message = if expected.is_empty() {
            "Unexpected end of file".to_string()
        } else {
            format!("Unexpected end of file, expected {}", describe(&expected))
        };

        Self {
            kind: ParseErrorKind::UnexpectedEof { expected },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            message: format!("Invalid syntax: {}", reason),
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
        }
    }

    /// Create an "integer out of range" error.
    pub fn invalid_number(value: impl Into<String>, span: Span) -> Self {
        let value = value.into();
        Self {
            message: format!("Integer literal {} does not fit in 32 bits", value),
            kind: ParseErrorKind::InvalidNumber { value },
            span,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self {
            span: error.span(),
            message: error.to_string(),
            kind: ParseErrorKind::Lex(error),
        }
    }
}
