//! Error recovery strategies for the parser.
//!
//! When the parser encounters an error, it uses these strategies to
//! resynchronize and continue parsing to find more errors.

use super::Parser;
use crate::parser::token::Token;

/// Skip tokens up to and including the next `terminator`.
pub fn sync_past(parser: &mut Parser, terminator: &Token) {
    while !parser.at_eof() {
        if parser.check(terminator) {
            parser.advance();
            return;
        }
        parser.advance();
    }
}

/// Synchronize to the next statement boundary.
///
/// Stops before a statement keyword or a closing brace, or after a
/// semicolon.
pub fn sync_to_statement_boundary(parser: &mut Parser) {
    let start = parser.position();
    while !parser.at_eof() {
        match parser.current() {
            Token::If | Token::While | Token::Return | Token::LeftBrace
                if parser.position() != start =>
            {
                return;
            }
            Token::Semicolon => {
                parser.advance();
                return;
            }
            Token::RightBrace => return,
            _ => {
                parser.advance();
            }
        }
    }
}

/// Synchronize to the next class member.
///
/// Skips a whole method body when the error happened inside its header, and
/// stops before the brace that closes the class.
pub fn sync_to_member_boundary(parser: &mut Parser) {
    let mut depth = 0usize;
    while !parser.at_eof() {
        match parser.current() {
            Token::Semicolon if depth == 0 => {
                parser.advance();
                return;
            }
            Token::LeftBrace => {
                depth += 1;
                parser.advance();
            }
            Token::RightBrace => {
                if depth == 0 {
                    return;
                }
                depth -= 1;
                parser.advance();
                if depth == 0 {
                    return;
                }
            }
            _ => {
                parser.advance();
            }
        }
    }
}
