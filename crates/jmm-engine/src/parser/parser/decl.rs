//! Declaration parsing: imports, the class, its fields and methods.

use super::{expr, recovery, stmt, ParseError, Parser};
use crate::parser::ast::{NodeId, NodeKind};
use crate::parser::token::Token;

/// `import a.b.c;`
pub fn parse_import(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    parser.expect(Token::Import)?;
    let import = parser.node(NodeKind::ImportPackage, span);

    loop {
        let (name, name_span) = parser.expect_identifier()?;
        let segment = parser.node_with(NodeKind::Identifier, name_span, "value", name);
        parser.attach(import, segment);
        if !parser.check(&Token::Dot) {
            break;
        }
        parser.advance();
    }

    parser.expect(Token::Semicolon)?;
    Ok(import)
}

/// `class A extends B implements C, D { members }`
pub fn parse_class(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    parser.expect(Token::Class)?;
    let class = parser.node(NodeKind::ClassDeclaration, span);

    let (name, name_span) = parser.expect_identifier()?;
    let class_name = parser.node_with(NodeKind::ClassName, name_span, "value", name);
    parser.attach(class, class_name);

    if parser.check(&Token::Extends) {
        parser.advance();
        let (sup, sup_span) = parser.expect_identifier()?;
        let node = parser.node_with(NodeKind::SuperclassName, sup_span, "value", sup);
        parser.attach(class, node);
    }

    if parser.check(&Token::Implements) {
        parser.advance();
        loop {
            let (iface, iface_span) = parser.expect_identifier()?;
            let node = parser.node_with(NodeKind::ImplementedClass, iface_span, "value", iface);
            parser.attach(class, node);
            if !parser.check(&Token::Comma) {
                break;
            }
            parser.advance();
        }
    }

    let body_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let body = parser.node(NodeKind::ClassBody, body_span);
    parser.attach(class, body);

    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        match parse_member(parser) {
            Ok(member) => parser.attach(body, member),
            Err(err) => {
                parser.record(err);
                recovery::sync_to_member_boundary(parser);
            }
        }
    }
    parser.expect(Token::RightBrace)?;

    Ok(class)
}

/// A field or a method, told apart by the `(` after the name.
fn parse_member(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    let mut modifiers = Vec::new();
    while parser.current().is_modifier() {
        let mod_span = parser.current_span();
        let value = parser.advance().to_string();
        modifiers.push(parser.node_with(NodeKind::Modifier, mod_span, "value", value));
    }

    let ty = parse_type(parser)?;
    let (name, name_span) = parser.expect_identifier()?;

    if !parser.check(&Token::LeftParen) {
        parser.expect(Token::Semicolon)?;
        let field = parser.node(NodeKind::ClassField, span);
        let decl = parser.node_with(NodeKind::Declaration, name_span, "var", name);
        parser.attach(decl, ty);
        parser.attach(field, decl);
        return Ok(field);
    }

    let kind = if parser.ast().node(ty).is(NodeKind::ArrayType) {
        NodeKind::ClassArrayMethod
    } else {
        NodeKind::ClassMethod
    };
    let method = parser.node_with(kind, span, "name", name);
    for modifier in modifiers {
        parser.attach(method, modifier);
    }
    parser.attach(method, ty);

    parser.expect(Token::LeftParen)?;
    if !parser.check(&Token::RightParen) {
        loop {
            let arg_span = parser.current_span();
            let arg_ty = parse_type(parser)?;
            let (arg_name, _) = parser.expect_identifier()?;
            let arg = parser.node_with(NodeKind::Argument, arg_span, "var", arg_name);
            parser.attach(arg, arg_ty);
            parser.attach(method, arg);
            if !parser.check(&Token::Comma) {
                break;
            }
            parser.advance();
        }
    }
    parser.expect(Token::RightParen)?;

    let body_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let body = parser.node(NodeKind::MethodBody, body_span);
    parser.attach(method, body);

    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let item = if is_declaration_start(parser) {
            parse_local_declaration(parser)
        } else {
            stmt::parse_statement(parser)
        };
        match item {
            Ok(node) => parser.attach(body, node),
            Err(err) => {
                parser.record(err);
                recovery::sync_to_statement_boundary(parser);
            }
        }
    }
    parser.expect(Token::RightBrace)?;

    Ok(method)
}

/// `int`, `boolean`, `String`, `void`, a class name, optionally followed by `[]`.
pub fn parse_type(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let span = parser.current_span();
    let name = match parser.current() {
        Token::Int => "int".to_string(),
        Token::Boolean => "boolean".to_string(),
        Token::StringType => "String".to_string(),
        Token::Void => "void".to_string(),
        Token::Identifier(name) => name.clone(),
        _ => {
            return Err(parser.unexpected_token(&[
                Token::Int,
                Token::Boolean,
                Token::StringType,
                Token::Identifier(String::new()),
            ]))
        }
    };
    parser.advance();

    if parser.check(&Token::LeftBracket) && matches!(parser.peek(), Token::RightBracket) {
        parser.advance();
        parser.advance();
        return Ok(parser.node_with(NodeKind::ArrayType, span, "type", name));
    }
    Ok(parser.node_with(NodeKind::Type, span, "type", name))
}

/// Whether the upcoming tokens start a local variable declaration.
fn is_declaration_start(parser: &Parser) -> bool {
    match parser.current() {
        token if token.is_type_keyword() => true,
        Token::Identifier(_) => match parser.peek() {
            Token::Identifier(_) => true,
            Token::LeftBracket => matches!(parser.peek_nth(2), Token::RightBracket),
            _ => false,
        },
        _ => false,
    }
}

/// `T x;` or `T x = expr;`
fn parse_local_declaration(parser: &mut Parser) -> Result<NodeId, ParseError> {
    let ty = parse_type(parser)?;
    let (name, name_span) = parser.expect_identifier()?;
    let decl = parser.node_with(NodeKind::Declaration, name_span, "var", name);
    parser.attach(decl, ty);

    if parser.check(&Token::Equal) {
        parser.advance();
        let init = expr::parse_expression(parser)?;
        parser.attach(decl, init);
    }
    parser.expect(Token::Semicolon)?;
    Ok(decl)
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{Ast, NodeKind};
    use crate::parser::parser::Parser;

    fn parse(source: &str) -> Ast {
        Parser::new(source).unwrap().parse().unwrap()
    }

    #[test]
    fn test_imports_keep_segments() {
        let ast = parse("import java.io.File; import Foo; class A {}");
        let root = ast.root();
        let first = root.child(0).unwrap();
        assert_eq!(first.kind(), NodeKind::ImportPackage);
        let segments: Vec<&str> = first.children().map(|c| c.get("value")).collect();
        assert_eq!(segments, vec!["java", "io", "File"]);
        assert_eq!(root.child(1).unwrap().num_children(), 1);
    }

    #[test]
    fn test_class_header() {
        let ast = parse("class A extends B implements C, D {}");
        let class = ast.root().child(0).unwrap();
        let kinds: Vec<NodeKind> = class.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::ClassName,
                NodeKind::SuperclassName,
                NodeKind::ImplementedClass,
                NodeKind::ImplementedClass,
                NodeKind::ClassBody,
            ]
        );
    }

    #[test]
    fn test_field_shape() {
        let ast = parse("class A { int[] xs; }");
        let field = ast.root().child(0).unwrap().child(1).unwrap().child(0).unwrap();
        assert_eq!(field.kind(), NodeKind::ClassField);
        let decl = field.child(0).unwrap();
        assert_eq!(decl.kind(), NodeKind::Declaration);
        assert_eq!(decl.get("var"), "xs");
        let ty = decl.child(0).unwrap();
        assert_eq!(ty.kind(), NodeKind::ArrayType);
        assert_eq!(ty.get("type"), "int");
    }

    #[test]
    fn test_method_shape() {
        let ast = parse("class A { public static void main(String[] args) { int x; x = 1; } }");
        let method = ast.root().child(0).unwrap().child(1).unwrap().child(0).unwrap();
        assert_eq!(method.kind(), NodeKind::ClassMethod);
        assert_eq!(method.get("name"), "main");
        let kinds: Vec<NodeKind> = method.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Modifier,
                NodeKind::Modifier,
                NodeKind::Type,
                NodeKind::Argument,
                NodeKind::MethodBody,
            ]
        );
        let arg = method.child(3).unwrap();
        assert_eq!(arg.get("var"), "args");
        assert_eq!(arg.child(0).unwrap().kind(), NodeKind::ArrayType);
        let body = method.child(4).unwrap();
        assert_eq!(body.child(0).unwrap().kind(), NodeKind::Declaration);
        assert_eq!(body.child(1).unwrap().kind(), NodeKind::Assignment);
    }

    #[test]
    fn test_array_returning_method() {
        let ast = parse("class A { int[] f() { return new int[2]; } }");
        let method = ast.root().child(0).unwrap().child(1).unwrap().child(0).unwrap();
        assert_eq!(method.kind(), NodeKind::ClassArrayMethod);
    }

    #[test]
    fn test_class_typed_declarations() {
        let ast = parse("class A { void f() { A a; A[] many; many[0] = a; } }");
        let body = ast
            .root()
            .child(0)
            .unwrap()
            .child(1)
            .unwrap()
            .child(0)
            .unwrap()
            .child_of_kind(NodeKind::MethodBody)
            .unwrap();
        let kinds: Vec<NodeKind> = body.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Declaration,
                NodeKind::Declaration,
                NodeKind::ArrayAssignment
            ]
        );
    }

    #[test]
    fn test_declaration_with_initializer() {
        let ast = parse("class A { int f() { int x = 3; return x; } }");
        let body = ast.root().descendants().into_iter().find(|n| n.is(NodeKind::MethodBody)).unwrap();
        let decl = body.child(0).unwrap();
        assert_eq!(decl.num_children(), 2);
        assert_eq!(decl.child(1).unwrap().get("value"), "3");
    }
}
