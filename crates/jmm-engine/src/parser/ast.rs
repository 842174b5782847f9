//! Arena-allocated syntax tree.
//!
//! Nodes live in a single `Vec` owned by [`Ast`] and refer to each other by
//! [`NodeId`]. Parent links are plain indices, so the tree can be walked in
//! both directions without shared ownership. Read access goes through the
//! copyable [`NodeRef`] cursor.

use crate::parser::token::Span;
use std::fmt::{self, Write};

/// Index of a node inside its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind tag of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ImportPackage,
    ClassDeclaration,
    ClassName,
    SuperclassName,
    ImplementedClass,
    ClassBody,
    ClassField,
    ClassMethod,
    ClassArrayMethod,
    MethodBody,
    Declaration,
    Type,
    ArrayType,
    Argument,
    Modifier,
    Assignment,
    ArrayAssignment,
    ArrayAccess,
    Identifier,
    Integer,
    Boolean,
    String,
    Self_,
    NewObject,
    BinaryOp,
    UnaryOp,
    MethodCalls,
    ExprStmt,
    IfElse,
    While,
    Return,
    Scope,
    NestedStatements,
    Length,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::ImportPackage => "ImportPackage",
            NodeKind::ClassDeclaration => "ClassDeclaration",
            NodeKind::ClassName => "ClassName",
            NodeKind::SuperclassName => "SuperclassName",
            NodeKind::ImplementedClass => "ImplementedClass",
            NodeKind::ClassBody => "ClassBody",
            NodeKind::ClassField => "ClassField",
            NodeKind::ClassMethod => "ClassMethod",
            NodeKind::ClassArrayMethod => "ClassArrayMethod",
            NodeKind::MethodBody => "MethodBody",
            NodeKind::Declaration => "Declaration",
            NodeKind::Type => "Type",
            NodeKind::ArrayType => "ArrayType",
            NodeKind::Argument => "Argument",
            NodeKind::Modifier => "Modifier",
            NodeKind::Assignment => "Assignment",
            NodeKind::ArrayAssignment => "ArrayAssignment",
            NodeKind::ArrayAccess => "ArrayAccess",
            NodeKind::Identifier => "Identifier",
            NodeKind::Integer => "Integer",
            NodeKind::Boolean => "Boolean",
            NodeKind::String => "String",
            NodeKind::Self_ => "Self",
            NodeKind::NewObject => "NewObject",
            NodeKind::BinaryOp => "BinaryOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::MethodCalls => "MethodCalls",
            NodeKind::ExprStmt => "ExprStmt",
            NodeKind::IfElse => "IfElse",
            NodeKind::While => "While",
            NodeKind::Return => "Return",
            NodeKind::Scope => "Scope",
            NodeKind::NestedStatements => "NestedStatements",
            NodeKind::Length => "Length",
        }
    }

    /// Method declaration kinds.
    pub fn is_method(self) -> bool {
        matches!(self, NodeKind::ClassMethod | NodeKind::ClassArrayMethod)
    }

    /// Type annotation kinds.
    pub fn is_type(self) -> bool {
        matches!(self, NodeKind::Type | NodeKind::ArrayType)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    attrs: Vec<(&'static str, String)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    span: Span,
}

/// Owner of every node of one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached node. `lineStart` and `colStart` are recorded
    /// from the span.
    pub fn add_node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            attrs: vec![
                ("lineStart", span.line.to_string()),
                ("colStart", span.column.to_string()),
            ],
            children: Vec::new(),
            parent: None,
            span,
        });
        id
    }

    /// Set or overwrite an attribute.
    pub fn set_attr(&mut self, id: NodeId, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        let attrs = &mut self.nodes[id.index()].attrs;
        match attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name, value)),
        }
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// The root node, or the first allocated node when no root was set.
    pub fn root(&self) -> NodeRef<'_> {
        let id = self.root.unwrap_or(NodeId(0));
        self.node(id)
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { ast: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indented dump of the tree, one node per line.
    pub fn to_tree_string(&self) -> String {
        let mut output = String::new();
        if !self.nodes.is_empty() {
            self.write_node(&mut output, self.root(), 0);
        }
        output
    }

    fn write_node(&self, output: &mut String, node: NodeRef<'_>, depth: usize) {
        write!(output, "{:indent$}{}", "", node.kind(), indent = depth * 2).unwrap();
        let attrs: Vec<String> = node
            .attrs()
            .filter(|(key, _)| *key != "lineStart" && *key != "colStart")
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        if !attrs.is_empty() {
            write!(output, " ({})", attrs.join(", ")).unwrap();
        }
        writeln!(output).unwrap();
        for child in node.children() {
            self.write_node(output, child, depth + 1);
        }
    }
}

/// Borrowed cursor over one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a Node {
        &self.ast.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, or the empty string when absent.
    pub fn get(&self, name: &str) -> &'a str {
        self.attr(name).unwrap_or("")
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&'static str, &'a str)> + 'a {
        self.data()
            .attrs
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let ast = self.ast;
        self.data()
            .children
            .iter()
            .map(move |&id| NodeRef { ast, id })
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.data()
            .children
            .get(index)
            .map(|&id| NodeRef { ast: self.ast, id })
    }

    pub fn num_children(&self) -> usize {
        self.data().children.len()
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, kind: NodeKind) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| NodeRef { ast: self.ast, id })
    }

    /// Nearest proper ancestor of the given kind.
    pub fn ancestor(&self, kind: NodeKind) -> Option<NodeRef<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.kind() == kind {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Nearest enclosing method declaration.
    pub fn enclosing_method(&self) -> Option<NodeRef<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.kind().is_method() {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// All descendants in pre-order, excluding `self`.
    pub fn descendants(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeRef<'a>> = self.children().collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            out.push(node);
            let start = stack.len();
            stack.extend(node.children());
            stack[start..].reverse();
        }
        out
    }

    /// Strip any number of enclosing parentheses.
    pub fn unwrap_scope(self) -> NodeRef<'a> {
        let mut node = self;
        while node.kind() == NodeKind::Scope {
            match node.child(0) {
                Some(inner) => node = inner,
                None => break,
            }
        }
        node
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn line(&self) -> u32 {
        self.data().span.line
    }

    pub fn col(&self) -> u32 {
        self.data().span.column
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}
