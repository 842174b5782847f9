//! Token definitions for Java--.
//!
//! This module defines all tokens that can appear in Java-- source code,
//! including keywords, operators, literals, and special tokens.

use std::fmt;

/// A token in the Java-- language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Declarations
    Import,
    Class,
    Extends,
    Implements,

    // Modifiers
    Public,
    Private,
    Protected,
    Static,
    Final,

    // Primitive and builtin types
    Int,
    Boolean,
    StringType,
    Void,

    // Control flow
    If,
    Else,
    While,
    Return,

    // Expressions
    New,
    This,
    Length,
    True,
    False,

    // Literals
    IntLiteral(i64),
    StringLiteral(String),
    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    AmpAmp,
    PipePipe,
    Bang,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    Equal,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,

    /// End of input
    Eof,
}

impl Token {
    /// Binding power of a binary operator token, or `None` when the token
    /// does not start a binary operation. Higher binds tighter.
    pub fn binary_precedence(&self) -> Option<u8> {
        let prec = match self {
            Token::PipePipe => 1,
            Token::AmpAmp => 2,
            Token::Pipe => 3,
            Token::Caret => 4,
            Token::Amp => 5,
            Token::EqualEqual | Token::BangEqual => 6,
            Token::Less | Token::Greater | Token::LessEqual | Token::GreaterEqual => 7,
            Token::Plus | Token::Minus => 8,
            Token::Star | Token::Slash | Token::Percent => 9,
            _ => return None,
        };
        Some(prec)
    }

    /// Check if this token names a type keyword.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            Token::Int | Token::Boolean | Token::StringType | Token::Void
        )
    }

    /// Check if this token is a method modifier.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Token::Public | Token::Private | Token::Protected | Token::Static | Token::Final
        )
    }
}

/// Source location of a token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Span covering both `self` and `other`, keeping the earlier position.
    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if self.start <= other.start {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Import => write!(f, "import"),
            Token::Class => write!(f, "class"),
            Token::Extends => write!(f, "extends"),
            Token::Implements => write!(f, "implements"),
            Token::Public => write!(f, "public"),
            Token::Private => write!(f, "private"),
            Token::Protected => write!(f, "protected"),
            Token::Static => write!(f, "static"),
            Token::Final => write!(f, "final"),
            Token::Int => write!(f, "int"),
            Token::Boolean => write!(f, "boolean"),
            Token::StringType => write!(f, "String"),
            Token::Void => write!(f, "void"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Return => write!(f, "return"),
            Token::New => write!(f, "new"),
            Token::This => write!(f, "this"),
            Token::Length => write!(f, "length"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "\"{}\"", s),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Amp => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::AmpAmp => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::LessEqual => write!(f, "<="),
            Token::GreaterEqual => write!(f, ">="),
            Token::EqualEqual => write!(f, "=="),
            Token::BangEqual => write!(f, "!="),
            Token::Equal => write!(f, "="),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "end of file"),
        }
    }
}
