//! Parser for the textual IR
//!
//! Reads the three-address text produced by the lowering pass back into a
//! [`ClassUnit`]. Built on logos like the source lexer; the grammar is
//! small enough that the parser works directly on the token vector.

use super::instr::{CallInstruction, CallKind, Instruction, OpType};
use super::method::{AccessModifier, Method};
use super::module::{ClassUnit, Field};
use super::types::ElementType;
use super::value::Element;
use crate::compiler::error::{CompileError, CompileResult};
use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum IrToken {
    #[regex(r"-?[0-9]+", |lex| lex.slice().to_string())]
    Integer(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    Str(String),

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Parameter ordinal written before an array parameter, `$1.`
    #[regex(r"\$[0-9]+\.")]
    ParamPrefix,

    #[regex(r"\+|-|\*|/|%|&&|\|\||&|\||\^|<=|>=|<|>|==|!=|!", |lex| lex.slice().to_string())]
    Operator(String),

    #[token(":=")]
    Assign,
    #[token(":")]
    Colon,
    #[token("=")]
    Equal,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
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
    #[token(".")]
    Dot,
}

/// Parse IR text into a class unit.
pub fn parse(source: &str) -> CompileResult<ClassUnit> {
    let mut tokens = Vec::new();
    for (token, span) in IrToken::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push((token, span.start)),
            Err(()) => {
                let ch = source[span.start..].chars().next().unwrap_or('?');
                return Err(CompileError::ir_syntax(
                    line_of(source, span.start),
                    format!("unexpected character '{}'", ch),
                ));
            }
        }
    }

    let unit = IrParser {
        source,
        tokens,
        pos: 0,
    }
    .parse_unit()?;
    log::debug!(
        "parsed IR class '{}' with {} methods",
        unit.name,
        unit.methods.len()
    );
    Ok(unit)
}

fn line_of(source: &str, offset: usize) -> u32 {
    source[..offset.min(source.len())].matches('\n').count() as u32 + 1
}

fn is_call_keyword(word: &str) -> bool {
    CallKind::from_keyword(word).is_some() || word == "getfield" || word == "putfield"
}

struct IrParser<'a> {
    source: &'a str,
    tokens: Vec<(IrToken, usize)>,
    pos: usize,
}

impl<'a> IrParser<'a> {
    // ========================================================================
    // Token helpers
    // ========================================================================

    fn peek(&self) -> Option<&IrToken> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&IrToken> {
        self.tokens.get(self.pos + n).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<IrToken> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, expected: &IrToken) -> bool {
        self.peek() == Some(expected)
    }

    fn eat(&mut self, expected: &IrToken) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: IrToken, what: &str) -> CompileResult<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn expect_ident(&mut self) -> CompileResult<String> {
        match self.peek() {
            Some(IrToken::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn peek_ident(&self) -> Option<&str> {
        match self.peek() {
            Some(IrToken::Ident(name)) => Some(name),
            _ => None,
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek_ident() == Some(keyword)
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        let offset = match self.tokens.get(self.pos) {
            Some((_, offset)) => *offset,
            None => self.source.len(),
        };
        let found = match self.peek() {
            Some(token) => format!("{:?}", token),
            None => "end of input".to_string(),
        };
        CompileError::ir_syntax(
            line_of(self.source, offset),
            format!("{}, found {}", message.into(), found),
        )
    }

    // ========================================================================
    // Class structure
    // ========================================================================

    fn parse_unit(mut self) -> CompileResult<ClassUnit> {
        let mut unit = ClassUnit::default();

        while self.at_keyword("import") {
            self.advance();
            let path = self.parse_dotted()?;
            self.expect(IrToken::Semicolon, "';' after import")?;
            unit.imports.push(path);
        }

        if let Some(access) = self.peek_ident().and_then(AccessModifier::from_keyword) {
            unit.access = access;
            self.advance();
        }
        unit.name = self.expect_ident()?;
        if self.at_keyword("extends") {
            self.advance();
            unit.super_class = Some(self.parse_dotted()?);
        }
        self.expect(IrToken::LeftBrace, "'{' after class name")?;

        while !self.check(&IrToken::RightBrace) {
            self.expect(IrToken::Dot, "member directive")?;
            let directive = self.expect_ident()?;
            match directive.as_str() {
                "field" => unit.fields.push(self.parse_field()?),
                "construct" => unit.methods.push(self.parse_method(true)?),
                "method" => unit.methods.push(self.parse_method(false)?),
                other => return Err(self.error(format!("unknown directive '.{}'", other))),
            }
        }
        self.expect(IrToken::RightBrace, "'}' closing the class")?;

        if self.peek().is_some() {
            return Err(self.error("expected end of input"));
        }
        Ok(unit)
    }

    fn parse_dotted(&mut self) -> CompileResult<String> {
        let mut path = self.expect_ident()?;
        while self.eat(&IrToken::Dot) {
            path.push('.');
            path.push_str(&self.expect_ident()?);
        }
        Ok(path)
    }

    /// Access and `static`/`final` keywords.
    fn parse_modifiers(&mut self) -> (AccessModifier, bool, bool) {
        let mut access = AccessModifier::Default;
        let mut is_static = false;
        let mut is_final = false;
        while let Some(word) = self.peek_ident() {
            match word {
                "static" => is_static = true,
                "final" => is_final = true,
                other => match AccessModifier::from_keyword(other) {
                    Some(modifier) => access = modifier,
                    None => break,
                },
            }
            self.advance();
        }
        (access, is_static, is_final)
    }

    fn parse_field(&mut self) -> CompileResult<Field> {
        let (access, is_static, is_final) = self.parse_modifiers();
        let (name, ty) = match self.parse_element()? {
            Element::Operand { name, ty } => (name, ty),
            _ => return Err(self.error("expected typed field name")),
        };

        let initial_value = if self.eat(&IrToken::Equal) {
            match self.advance() {
                Some(IrToken::Integer(value)) => {
                    if self.eat(&IrToken::Dot) {
                        self.parse_type()?;
                    }
                    Some(value)
                }
                _ => return Err(self.error("expected literal field initializer")),
            }
        } else {
            None
        };

        self.expect(IrToken::Semicolon, "';' after field")?;
        Ok(Field {
            access,
            is_static,
            is_final,
            name,
            ty,
            initial_value,
        })
    }

    fn parse_method(&mut self, is_constructor: bool) -> CompileResult<Method> {
        let (access, is_static, is_final) = self.parse_modifiers();
        let name = self.expect_ident()?;

        self.expect(IrToken::LeftParen, "'(' after method name")?;
        let mut params = Vec::new();
        if !self.check(&IrToken::RightParen) {
            params.push(self.parse_element()?);
            while self.eat(&IrToken::Comma) {
                params.push(self.parse_element()?);
            }
        }
        self.expect(IrToken::RightParen, "')' after parameters")?;
        self.expect(IrToken::Dot, "return type")?;
        let return_type = self.parse_type()?;

        let mut method = Method::new(name, return_type);
        method.access = if access == AccessModifier::Default && is_constructor {
            AccessModifier::Public
        } else {
            access
        };
        method.is_static = is_static;
        method.is_final = is_final;
        method.is_constructor = is_constructor;
        method.params = params;

        self.expect(IrToken::LeftBrace, "'{' before method body")?;
        while !self.check(&IrToken::RightBrace) {
            if self.peek().is_none() {
                return Err(self.error("unterminated method body"));
            }
            if matches!(self.peek(), Some(IrToken::Ident(_)))
                && self.peek_nth(1) == Some(&IrToken::Colon)
            {
                let label = self.expect_ident()?;
                self.advance();
                method.add_label(label);
                continue;
            }
            let instruction = self.parse_statement()?;
            self.expect(IrToken::Semicolon, "';' after instruction")?;
            method.push(instruction);
        }
        self.expect(IrToken::RightBrace, "'}' after method body")?;
        Ok(method)
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    fn parse_statement(&mut self) -> CompileResult<Instruction> {
        let word = self.peek_ident().unwrap_or("").to_string();
        let next = self.peek_nth(1).cloned();

        match (word.as_str(), next) {
            ("if", Some(IrToken::LeftParen)) => {
                self.advance();
                self.advance();
                let condition = self.parse_expression()?;
                self.expect(IrToken::RightParen, "')' after condition")?;
                if !self.at_keyword("goto") {
                    return Err(self.error("expected 'goto'"));
                }
                self.advance();
                let label = self.expect_ident()?;
                Ok(Instruction::Branch {
                    condition: Box::new(condition),
                    label,
                })
            }
            ("goto", Some(IrToken::Ident(_))) => {
                self.advance();
                Ok(Instruction::Goto(self.expect_ident()?))
            }
            ("ret", Some(IrToken::Dot)) => {
                let start = self.pos;
                self.advance();
                self.advance();
                let ty = self.parse_type()?;
                if self.check(&IrToken::Assign) {
                    // A variable that happens to be called `ret`
                    self.pos = start;
                    return self.parse_assignment();
                }
                let value = if self.check(&IrToken::Semicolon) {
                    None
                } else {
                    Some(self.parse_element()?)
                };
                Ok(Instruction::Return { ty, value })
            }
            (keyword, Some(IrToken::LeftParen)) if is_call_keyword(keyword) => {
                self.parse_call_like()
            }
            _ => self.parse_assignment(),
        }
    }

    fn parse_assignment(&mut self) -> CompileResult<Instruction> {
        let dest = self.parse_element()?;
        self.expect(IrToken::Assign, "':='")?;
        self.expect(IrToken::Dot, "assignment type")?;
        let ty = self.parse_type()?;
        let rhs = self.parse_expression()?;
        Ok(Instruction::Assign {
            dest,
            ty,
            rhs: Box::new(rhs),
        })
    }

    /// Right-hand side of an assignment or a branch condition.
    fn parse_expression(&mut self) -> CompileResult<Instruction> {
        if let Some(IrToken::Operator(op)) = self.peek() {
            if op == "!" {
                self.advance();
                self.expect(IrToken::Dot, "operator type")?;
                self.parse_type()?;
                let operand = self.parse_element()?;
                return Ok(Instruction::UnaryOp {
                    op: OpType::NotB,
                    operand,
                });
            }
        }

        if let Some(word) = self.peek_ident() {
            if is_call_keyword(word) && self.peek_nth(1) == Some(&IrToken::LeftParen) {
                return self.parse_call_like();
            }
        }

        let left = self.parse_element()?;
        let symbol = match self.peek() {
            Some(IrToken::Operator(symbol)) => symbol.clone(),
            _ => return Ok(Instruction::NoOp(left)),
        };
        let op = OpType::from_symbol(&symbol)
            .filter(|op| *op != OpType::NotB)
            .ok_or_else(|| self.error(format!("'{}' is not a binary operator", symbol)))?;
        self.advance();
        self.expect(IrToken::Dot, "operator type")?;
        let ty = self.parse_type()?;
        let right = self.parse_element()?;
        Ok(Instruction::BinaryOp {
            op,
            left,
            right,
            ty,
        })
    }

    fn parse_call_like(&mut self) -> CompileResult<Instruction> {
        let keyword = self.expect_ident()?;
        self.expect(IrToken::LeftParen, "'('")?;

        match keyword.as_str() {
            "getfield" => {
                let object = self.parse_element()?;
                self.expect(IrToken::Comma, "','")?;
                let field = self.parse_element()?;
                self.finish_call()?;
                Ok(Instruction::GetField { object, field })
            }
            "putfield" => {
                let object = self.parse_element()?;
                self.expect(IrToken::Comma, "','")?;
                let field = self.parse_element()?;
                self.expect(IrToken::Comma, "','")?;
                let value = self.parse_element()?;
                self.finish_call()?;
                Ok(Instruction::PutField {
                    object,
                    field,
                    value,
                })
            }
            _ => {
                let kind = CallKind::from_keyword(&keyword)
                    .ok_or_else(|| self.error(format!("unknown call '{}'", keyword)))?;
                let receiver = self.parse_element()?;
                let method = if kind.is_invoke() {
                    self.expect(IrToken::Comma, "',' before method name")?;
                    match self.advance() {
                        Some(IrToken::Str(name)) => Some(name),
                        _ => return Err(self.error("expected quoted method name")),
                    }
                } else {
                    None
                };
                let mut args = Vec::new();
                while self.eat(&IrToken::Comma) {
                    args.push(self.parse_element()?);
                }
                let return_type = self.finish_call()?;
                Ok(Instruction::Call(CallInstruction {
                    kind,
                    receiver,
                    method,
                    args,
                    return_type,
                }))
            }
        }
    }

    /// `).type` closing a call-like form.
    fn finish_call(&mut self) -> CompileResult<ElementType> {
        self.expect(IrToken::RightParen, "')'")?;
        self.expect(IrToken::Dot, "result type")?;
        self.parse_type()
    }

    // ========================================================================
    // Elements and types
    // ========================================================================

    fn parse_element(&mut self) -> CompileResult<Element> {
        if self.eat(&IrToken::ParamPrefix) && !matches!(self.peek(), Some(IrToken::Ident(_))) {
            return Err(self.error("expected parameter name after '$N.'"));
        }

        match self.advance() {
            Some(IrToken::Integer(value)) => {
                self.expect(IrToken::Dot, "literal type")?;
                let ty = self.parse_type()?;
                Ok(Element::Literal { value, ty })
            }
            Some(IrToken::Str(value)) => {
                self.expect(IrToken::Dot, "literal type")?;
                let ty = self.parse_type()?;
                Ok(Element::Literal { value, ty })
            }
            Some(IrToken::Ident(name)) => {
                if self.eat(&IrToken::LeftBracket) {
                    let mut indices = vec![self.parse_element()?];
                    while self.eat(&IrToken::Comma) {
                        indices.push(self.parse_element()?);
                    }
                    self.expect(IrToken::RightBracket, "']'")?;
                    self.expect(IrToken::Dot, "element type")?;
                    let ty = self.parse_type()?;
                    return Ok(Element::ArrayOperand { name, indices, ty });
                }
                let ty = if self.eat(&IrToken::Dot) {
                    self.parse_type()?
                } else {
                    ElementType::Class(name.clone())
                };
                if name == "this" {
                    return Ok(Element::operand(name, ElementType::This));
                }
                Ok(Element::Operand { name, ty })
            }
            other => {
                if other.is_some() {
                    self.pos -= 1;
                }
                Err(self.error("expected operand"))
            }
        }
    }

    /// Type name following a consumed `.`.
    fn parse_type(&mut self) -> CompileResult<ElementType> {
        let name = self.expect_ident()?;
        let ty = match name.as_str() {
            "array" => {
                self.expect(IrToken::Dot, "array element type")?;
                ElementType::array_of(self.parse_type()?)
            }
            "i32" => ElementType::Int32,
            "bool" => ElementType::Boolean,
            "V" => ElementType::Void,
            "String" => ElementType::String,
            "this" => ElementType::This,
            _ => ElementType::Object(name),
        };
        Ok(ty)
    }
}
