//! Statement parsing

use super::{expr, ParseError, Parser};
use crate::parser::ast::{NodeId, NodeKind};
use crate::parser::token::Token;

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser) -> Result<NodeId, ParseError> {
    match parser.current() {
        Token::LeftBrace => parse_block(parser),
        Token::If => parse_if(parser),
        Token::While => parse_while(parser),
        Token::Return => parse_return(parser),
        _ => parse_expression_statement(parser),
    }
}

/// `{ stmt* }`
fn parse_block(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let block = parser.node(NodeKind::NestedStatements, span);

    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let stmt = parse_statement(parser)?;
        parser.attach(block, stmt);
    }
    parser.expect(Token::RightBrace)?;
    Ok(block)
}

/// `if (cond) stmt else stmt`. The else branch is optional.
fn parse_if(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    parser.expect(Token::If)?;
    parser.expect(Token::LeftParen)?;
    let cond = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let then_branch = parse_statement(parser)?;

    let node = parser.node(NodeKind::IfElse, span);
    parser.attach(node, cond);
    parser.attach(node, then_branch);

    if parser.check(&Token::Else) {
        parser.advance();
        let else_branch = parse_statement(parser)?;
        parser.attach(node, else_branch);
    }
    Ok(node)
}

/// `while (cond) stmt`
fn parse_while(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    parser.expect(Token::While)?;
    parser.expect(Token::LeftParen)?;
    let cond = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let body = parse_statement(parser)?;

    let node = parser.node(NodeKind::While, span);
    parser.attach(node, cond);
    parser.attach(node, body);
    Ok(node)
}

/// `return expr?;`
fn parse_return(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    parser.expect(Token::Return)?;
    let node = parser.node(NodeKind::Return, span);

    if !parser.check(&Token::Semicolon) {
        let value = expr::parse_expression(parser)?;
        parser.attach(node, value);
    }
    parser.expect(Token::Semicolon)?;
    Ok(node)
}

/// Expression statement, or an assignment when the expression is followed
/// by `=`.
fn parse_expression_statement(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    let target = expr::parse_expression(parser)?;

    if !parser.check(&Token::Equal) {
        parser.expect(Token::Semicolon)?;
        let node = parser.node(NodeKind::ExprStmt, span);
        parser.attach(node, target);
        return Ok(node);
    }

    let eq_span = parser.current_span();
    parser.advance();
    let value = expr::parse_expression(parser)?;
    parser.expect(Token::Semicolon)?;

    let target_ref = parser.ast().node(target);
    match target_ref.kind() {
        NodeKind::Identifier => {
            let var = target_ref.get("value").to_string();
            let node = parser.node_with(NodeKind::Assignment, span, "var", var);
            parser.attach(node, value);
            Ok(node)
        }
        NodeKind::ArrayAccess => {
            let base = target_ref.child(0).filter(|b| b.is(NodeKind::Identifier));
            let index = target_ref.child(1).map(|i| i.id());
            match (base, index) {
                (Some(base), Some(index)) => {
                    let var = base.get("value").to_string();
                    let node = parser.node_with(NodeKind::ArrayAssignment, span, "var", var);
                    parser.attach(node, index);
                    parser.attach(node, value);
                    Ok(node)
                }
                _ => Err(ParseError::invalid_syntax(
                    "only named arrays can be assigned to",
                    eq_span,
                )),
            }
        }
        _ => Err(ParseError::invalid_syntax("invalid assignment target", eq_span)),
    }
}
