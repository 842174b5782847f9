//! Expression parsing
//!
//! Binary operators are parsed by precedence climbing over
//! [`Token::binary_precedence`]; all binary operators are left associative.

use super::{ParseError, Parser};
use crate::parser::ast::{NodeId, NodeKind};
use crate::parser::token::Token;

/// Parse an expression.
pub fn parse_expression(parser: &mut Parser) -> Result<NodeId, ParseError> {
    parse_binary(parser, 0)
}

fn parse_binary(parser: &mut Parser, min_prec: u8) -> Result<NodeId, ParseError> {
    let mut left = parse_unary(parser)?;

    while let Some(prec) = parser.current().binary_precedence() {
        if prec <= min_prec {
            break;
        }
        let op = parser.advance().to_string();
        let right = parse_binary(parser, prec)?;

        let span = parser.ast().node(left).span();
        let node = parser.node_with(NodeKind::BinaryOp, span, "op", op);
        parser.attach(node, left);
        parser.attach(node, right);
        left = node;
    }

    Ok(left)
}

fn parse_unary(parser: &mut Parser) -> Result<NodeId, ParseError> {
    if parser.check(&Token::Bang) {
        let span = parser.current_span();
        parser.advance();
        let operand = parse_unary(parser)?;
        let node = parser.node_with(NodeKind::UnaryOp, span, "op", "!");
        parser.attach(node, operand);
        return Ok(node);
    }
    parse_postfix(parser)
}

/// Array indexing, `.length` and method calls chained after a primary.
fn parse_postfix(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let mut expr = parse_primary(parser)?;

    loop {
        let span = parser.ast().node(expr).span();
        match parser.current() {
            Token::LeftBracket => {
                parser.advance();
                let index = parse_expression(parser)?;
                parser.expect(Token::RightBracket)?;
                let node = parser.node(NodeKind::ArrayAccess, span);
                parser.attach(node, expr);
                parser.attach(node, index);
                expr = node;
            }
            Token::Dot => {
                parser.advance();
                if parser.check(&Token::Length) {
                    parser.advance();
                    let node = parser.node(NodeKind::Length, span);
                    parser.attach(node, expr);
                    expr = node;
                    continue;
                }

                let (method, _) = parser.expect_identifier()?;
                parser.expect(Token::LeftParen)?;
                let call = parser.node_with(NodeKind::MethodCalls, span, "methodName", method);
                parser.attach(call, expr);
                if !parser.check(&Token::RightParen) {
                    loop {
                        let arg = parse_expression(parser)?;
                        parser.attach(call, arg);
                        if !parser.check(&Token::Comma) {
                            break;
                        }
                        parser.advance();
                    }
                }
                parser.expect(Token::RightParen)?;
                expr = call;
            }
            _ => break,
        }
    }

    Ok(expr)
}

fn parse_primary(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    match parser.current().clone() {
        Token::IntLiteral(n) => {
            parser.advance();
            if n > i64::from(i32::MAX) {
                return Err(ParseError::invalid_number(n.to_string(), span));
            }
            Ok(parser.node_with(NodeKind::Integer, span, "value", n.to_string()))
        }
        Token::True => {
            parser.advance();
            Ok(parser.node_with(NodeKind::Boolean, span, "value", "true"))
        }
        Token::False => {
            parser.advance();
            Ok(parser.node_with(NodeKind::Boolean, span, "value", "false"))
        }
        Token::This => {
            parser.advance();
            Ok(parser.node_with(NodeKind::Self_, span, "value", "this"))
        }
        Token::Identifier(name) => {
            parser.advance();
            Ok(parser.node_with(NodeKind::Identifier, span, "value", name))
        }
        Token::StringLiteral(text) => {
            parser.advance();
            Ok(parser.node_with(NodeKind::String, span, "value", text))
        }
        Token::LeftParen => {
            parser.advance();
            let inner = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            let scope = parser.node(NodeKind::Scope, span);
            parser.attach(scope, inner);
            Ok(scope)
        }
        Token::New => parse_new(parser),
        _ => Err(parser.unexpected_token(&[])),
    }
}

/// `new int[len]` or `new Name()`
fn parse_new(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    parser.expect(Token::New)?;
    let node = parser.node(NodeKind::NewObject, span);
    let ty_span = parser.current_span();

    if parser.check(&Token::Int) {
        parser.advance();
        let ty = parser.node_with(NodeKind::Type, ty_span, "type", "int");
        parser.expect(Token::LeftBracket)?;
        let len = parse_expression(parser)?;
        parser.expect(Token::RightBracket)?;
        parser.attach(node, ty);
        parser.attach(node, len);
        return Ok(node);
    }

    let (class, _) = parser.expect_identifier()?;
    parser.expect(Token::LeftParen)?;
    parser.expect(Token::RightParen)?;
    let ty = parser.node_with(NodeKind::Type, ty_span, "type", class);
    parser.attach(node, ty);
    Ok(node)
}
