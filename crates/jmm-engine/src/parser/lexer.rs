//! Lexer for Java--.
//!
//! Built on the logos library. Converts source code into a stream of tokens
//! with line and column information for every token.

use crate::parser::token::{Span, Token};
use logos::Logos;
use thiserror::Error;

/// Logos-based token enum for lexing.
///
/// Used internally by logos and converted to [`Token`] after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum LogosToken {
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("int")]
    Int,
    #[token("boolean")]
    Boolean,
    #[token("String")]
    StringType,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("length")]
    Length,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    IntLiteral(i64),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    StringLiteral(String),

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
}

fn lex_block_comment(lex: &mut logos::Lexer<'_, LogosToken>) -> logos::Skip {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => lex.bump(end + 2),
        // Unterminated comment runs to the end of input
        None => lex.bump(remainder.len()),
    }
    logos::Skip
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, span: Span },

    #[error("integer literal '{text}' is out of range")]
    InvalidNumber { text: String, span: Span },

    /// `$` followed only by digits names a parameter slot in the IR.
    #[error("identifier '{name}' is reserved")]
    ReservedIdentifier { name: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::InvalidNumber { span, .. }
            | LexError::ReservedIdentifier { span, .. } => *span,
        }
    }
}

/// Byte offsets of line starts, for offset to line/column conversion.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn position(&self, source: &str, offset: usize) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = source[self.starts[line]..offset].chars().count() + 1;
        (line as u32 + 1, column as u32)
    }
}

/// Tokenizer over a single source file.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the whole source, appending a trailing [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let index = LineIndex::new(self.source);
        let mut lexer = LogosToken::lexer(self.source);

        while let Some(result) = lexer.next() {
            let range = lexer.span();
            let (line, column) = index.position(self.source, range.start);
            let span = Span::new(range.start, range.end, line, column);

            match result {
                Ok(LogosToken::Identifier(name)) if is_reserved_identifier(&name) => {
                    self.errors.push(LexError::ReservedIdentifier { name, span });
                }
                Ok(token) => self.tokens.push((convert_token(token), span)),
                Err(()) => {
                    let text = &self.source[range.clone()];
                    if text.bytes().all(|b| b.is_ascii_digit()) && !text.is_empty() {
                        self.errors.push(LexError::InvalidNumber {
                            text: text.to_string(),
                            span,
                        });
                    } else {
                        let ch = text.chars().next().unwrap_or('\0');
                        self.errors.push(LexError::UnexpectedCharacter { ch, span });
                    }
                }
            }
        }

        let end = self.source.len();
        let (line, column) = index.position(self.source, end);
        self.tokens.push((Token::Eof, Span::new(end, end, line, column)));

        log::debug!("lexed {} tokens", self.tokens.len());

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }
}

fn is_reserved_identifier(name: &str) -> bool {
    name.len() > 1
        && name.starts_with('$')
        && name[1..].bytes().all(|b| b.is_ascii_digit())
}

fn convert_token(token: LogosToken) -> Token {
    match token {
        LogosToken::Import => Token::Import,
        LogosToken::Class => Token::Class,
        LogosToken::Extends => Token::Extends,
        LogosToken::Implements => Token::Implements,
        LogosToken::Public => Token::Public,
        LogosToken::Private => Token::Private,
        LogosToken::Protected => Token::Protected,
        LogosToken::Static => Token::Static,
        LogosToken::Final => Token::Final,
        LogosToken::Int => Token::Int,
        LogosToken::Boolean => Token::Boolean,
        LogosToken::StringType => Token::StringType,
        LogosToken::Void => Token::Void,
        LogosToken::If => Token::If,
        LogosToken::Else => Token::Else,
        LogosToken::While => Token::While,
        LogosToken::Return => Token::Return,
        LogosToken::New => Token::New,
        LogosToken::This => Token::This,
        LogosToken::Length => Token::Length,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::IntLiteral(n) => Token::IntLiteral(n),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::Identifier(name) => Token::Identifier(name),
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Amp => Token::Amp,
        LogosToken::Pipe => Token::Pipe,
        LogosToken::Caret => Token::Caret,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::PipePipe => Token::PipePipe,
        LogosToken::Bang => Token::Bang,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::Equal => Token::Equal,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
        LogosToken::Dot => Token::Dot,
        // Comment variants are always skipped by their callbacks
        LogosToken::LineComment | LogosToken::BlockComment => Token::Eof,
    }
}
