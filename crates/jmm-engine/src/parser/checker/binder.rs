//! Name binding - builds the symbol table from the AST
//!
//! One pre-order walk dispatching on node kind. The binder never fails:
//! duplicate declarations are recorded as written and left for the type
//! checker to report.

use super::symbols::{Symbol, SymbolTable, Type};
use crate::parser::ast::{Ast, NodeKind, NodeRef};

/// Binder - builds a [`SymbolTable`] from a parsed program
pub struct Binder {
    table: SymbolTable,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    pub fn new() -> Self {
        Binder {
            table: SymbolTable::new(),
        }
    }

    /// Walk the whole tree and return the finished table.
    pub fn bind(mut self, ast: &Ast) -> SymbolTable {
        if !ast.is_empty() {
            self.visit(ast.root());
        }
        log::debug!(
            "bound class '{}' with {} fields and {} methods",
            self.table.class_name(),
            self.table.fields().len(),
            self.table.methods().len()
        );
        self.table
    }

    fn visit(&mut self, node: NodeRef<'_>) {
        match node.kind() {
            NodeKind::Program | NodeKind::ClassDeclaration | NodeKind::ClassBody => {
                for child in node.children() {
                    self.visit(child);
                }
            }
            NodeKind::ImportPackage => self.bind_import(node),
            NodeKind::ClassName => self.table.set_class_name(node.get("value")),
            NodeKind::SuperclassName => self.table.set_super_class(node.get("value")),
            NodeKind::ImplementedClass => self.table.add_interface(node.get("value")),
            NodeKind::ClassField => self.bind_field(node),
            NodeKind::ClassMethod | NodeKind::ClassArrayMethod => self.bind_method(node),
            _ => {}
        }
    }

    fn bind_import(&mut self, node: NodeRef<'_>) {
        let segments: Vec<&str> = node
            .descendants()
            .into_iter()
            .filter(|n| n.is(NodeKind::Identifier))
            .map(|n| n.get("value"))
            .collect();
        if !segments.is_empty() {
            self.table.add_import(segments.join("."));
        }
    }

    fn bind_field(&mut self, node: NodeRef<'_>) {
        let decl = node.child_of_kind(NodeKind::Declaration).unwrap_or(node);
        if let Some(symbol) = declared_symbol(decl) {
            self.table.add_field(symbol);
        }
    }

    fn bind_method(&mut self, node: NodeRef<'_>) {
        let name = node.get("name");
        let return_type = node
            .children()
            .find(|c| c.kind().is_type())
            .map(type_of_node)
            .unwrap_or_else(Type::void);
        let modifiers = node
            .children()
            .filter(|c| c.is(NodeKind::Modifier))
            .map(|c| c.get("value").to_string())
            .collect();
        self.table.add_method(name, return_type, modifiers);

        for arg in node.children().filter(|c| c.is(NodeKind::Argument)) {
            if let Some(symbol) = declared_symbol(arg) {
                self.table.add_parameter(name, symbol);
            }
        }

        if let Some(body) = node.child_of_kind(NodeKind::MethodBody) {
            for decl in body
                .descendants()
                .into_iter()
                .filter(|n| n.is(NodeKind::Declaration))
            {
                if let Some(symbol) = declared_symbol(decl) {
                    self.table.add_local(name, symbol);
                }
            }
        }
    }
}

/// Type described by a `Type` or `ArrayType` node.
pub fn type_of_node(node: NodeRef<'_>) -> Type {
    Type::new(node.get("type"), node.is(NodeKind::ArrayType))
}

/// Symbol declared by a node carrying a `var` attribute and a type child.
fn declared_symbol(node: NodeRef<'_>) -> Option<Symbol> {
    let ty = node.children().find(|c| c.kind().is_type())?;
    Some(Symbol::new(node.get("var"), type_of_node(ty)))
}

/// Build the symbol table of a parsed program.
pub fn build_symbol_table(ast: &Ast) -> SymbolTable {
    Binder::new().bind(ast)
}
