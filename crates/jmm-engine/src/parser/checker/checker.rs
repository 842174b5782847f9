//! Type checker - semantic analysis over the AST
//!
//! Walks every method body with a per-method context and accumulates
//! reports. Nothing is fatal: after each problem the checker carries on,
//! and expressions whose type could not be established evaluate to
//! [`ExprType::Invalid`] so the same cause is reported once.

use super::binder::type_of_node;
use super::report::{dedup_reports, Report, Stage};
use super::symbols::{Symbol, SymbolTable, Type, VarOrigin};
use crate::parser::ast::{Ast, NodeKind, NodeRef};
use rustc_hash::FxHashSet;

/// Result of type-checking one expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprType {
    Known(Type),
    /// Produced by imported or inherited code the checker cannot see.
    /// Accepted wherever a value is expected.
    Trusted,
    /// Already reported; propagates silently.
    Invalid,
}

/// Output of [`analyze`]: the symbol table, handed back unchanged, and the
/// deduplicated reports.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub symbol_table: SymbolTable,
    pub reports: Vec<Report>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(|r| r.is_error())
    }
}

/// Context reset before each method body.
#[derive(Debug, Clone, Default)]
struct MethodContext {
    name: String,
    return_type: Option<Type>,
    is_static: bool,
    is_private: bool,
    /// Locals, then parameters, then fields; first match wins
    relevant_vars: Vec<(Symbol, VarOrigin)>,
}

/// Type checker over a bound program
pub struct TypeChecker<'a> {
    table: &'a SymbolTable,
    reports: Vec<Report>,
    ctx: MethodContext,
}

impl<'a> TypeChecker<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        TypeChecker {
            table,
            reports: Vec::new(),
            ctx: MethodContext::default(),
        }
    }

    /// Check the whole program and return the deduplicated reports.
    pub fn check(mut self, ast: &Ast) -> Vec<Report> {
        if ast.is_empty() {
            return Vec::new();
        }

        let nodes = ast.root().descendants();
        self.check_duplicate_members(&nodes);
        for method in nodes.iter().filter(|n| n.kind().is_method()) {
            self.check_method(*method);
        }

        let reports = dedup_reports(self.reports);
        log::debug!("semantic analysis produced {} reports", reports.len());
        reports
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn check_duplicate_members(&mut self, nodes: &[NodeRef<'_>]) {
        let mut fields = FxHashSet::default();
        let mut methods = FxHashSet::default();

        for node in nodes {
            match node.kind() {
                NodeKind::ClassField => {
                    let Some(decl) = node.child_of_kind(NodeKind::Declaration) else {
                        continue;
                    };
                    let name = decl.get("var");
                    if !fields.insert(name) {
                        self.report(*node, format!("Field {} is already defined.", name));
                    }
                }
                NodeKind::ClassMethod | NodeKind::ClassArrayMethod => {
                    let name = node.get("name");
                    if !methods.insert(name) {
                        self.report(*node, format!("Method {} is already defined.", name));
                    }
                }
                _ => {}
            }
        }
    }

    fn check_method(&mut self, method: NodeRef<'_>) {
        let name = method.get("name");
        let table = self.table;
        let signature = table.signature(name);

        let mut relevant_vars: Vec<(Symbol, VarOrigin)> = table
            .locals(name)
            .iter()
            .map(|s| (s.clone(), VarOrigin::Local))
            .collect();
        relevant_vars.extend(
            table
                .parameters(name)
                .iter()
                .enumerate()
                .map(|(i, s)| (s.clone(), VarOrigin::Parameter(i))),
        );
        relevant_vars.extend(table.fields().iter().map(|s| (s.clone(), VarOrigin::Field)));

        self.ctx = MethodContext {
            name: name.to_string(),
            return_type: table.return_type(name).cloned(),
            is_static: table.is_static_method(name),
            is_private: signature.is_some_and(|s| s.is_private()),
            relevant_vars,
        };
        log::trace!(
            "checking method '{}' (static: {}, private: {})",
            self.ctx.name,
            self.ctx.is_static,
            self.ctx.is_private
        );

        let mut params = FxHashSet::default();
        for arg in method.children().filter(|c| c.is(NodeKind::Argument)) {
            let var = arg.get("var");
            if !params.insert(var) {
                self.report(
                    arg,
                    format!("Parameter {} is already defined in method {}.", var, name),
                );
            }
        }

        let Some(body) = method.child_of_kind(NodeKind::MethodBody) else {
            return;
        };
        let mut locals = FxHashSet::default();
        for decl in body
            .descendants()
            .into_iter()
            .filter(|n| n.is(NodeKind::Declaration))
        {
            let var = decl.get("var");
            if !locals.insert(var) {
                self.report(
                    decl,
                    format!("Variable {} is already defined in method {}.", var, name),
                );
            }
        }

        for stmt in body.children() {
            self.check_statement(stmt);
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn check_statement(&mut self, node: NodeRef<'_>) {
        match node.kind() {
            NodeKind::Declaration => {
                if let (Some(ty), Some(init)) = (node.child(0), node.child(1)) {
                    let declared = type_of_node(ty);
                    self.check_assignment(node, &declared, init);
                }
            }
            NodeKind::Assignment => self.check_assignment_stmt(node),
            NodeKind::ArrayAssignment => self.check_array_assignment(node),
            NodeKind::ExprStmt => {
                if let Some(expr) = node.child(0) {
                    self.type_of(expr);
                }
            }
            NodeKind::IfElse => {
                if let Some(cond) = node.child(0) {
                    if let ExprType::Known(ty) = self.type_of(cond) {
                        if !ty.is_boolean() {
                            self.report(
                                cond,
                                format!(
                                    "Expected a 'boolean' inside If condition but received a '{}'.",
                                    ty
                                ),
                            );
                        }
                    }
                }
                for branch in node.children().skip(1) {
                    self.check_statement(branch);
                }
            }
            NodeKind::While => {
                if let Some(cond) = node.child(0) {
                    if let ExprType::Known(ty) = self.type_of(cond) {
                        if !ty.is_boolean() {
                            self.report(cond, "Condition should be 'boolean'.");
                        }
                    }
                }
                if let Some(body) = node.child(1) {
                    self.check_statement(body);
                }
            }
            NodeKind::Return => self.check_return(node),
            NodeKind::NestedStatements => {
                for stmt in node.children() {
                    self.check_statement(stmt);
                }
            }
            _ => {
                self.type_of(node);
            }
        }
    }

    fn check_assignment_stmt(&mut self, node: NodeRef<'_>) {
        let var = node.get("var");
        let Some(rhs) = node.child(0) else {
            return;
        };

        match self.resolve(var) {
            Some((_, VarOrigin::Field)) if self.ctx.is_static => {
                self.report(node, "Cannot use fields in a static method.");
                self.type_of(rhs);
            }
            Some((ty, _)) => self.check_assignment(node, &ty, rhs),
            None => {
                self.report(node, format!("Variable {} is not declared.", var));
                self.type_of(rhs);
            }
        }
    }

    fn check_array_assignment(&mut self, node: NodeRef<'_>) {
        let var = node.get("var");
        let (Some(index), Some(value)) = (node.child(0), node.child(1)) else {
            return;
        };

        let target = match self.resolve(var) {
            Some((_, VarOrigin::Field)) if self.ctx.is_static => {
                self.report(node, "Cannot use fields in a static method.");
                None
            }
            Some((ty, _)) if ty.is_array => Some(ty.element()),
            Some(_) => {
                self.report(
                    node,
                    format!("Array Access over variable {} which is not an array.", var),
                );
                None
            }
            None => {
                self.report(node, format!("Variable {} was not declared.", var));
                None
            }
        };

        self.check_index(index);
        match target {
            Some(element) => self.check_assignment(node, &element, value),
            None => {
                self.type_of(value);
            }
        }
    }

    fn check_return(&mut self, node: NodeRef<'_>) {
        let expected = self.ctx.return_type.clone().unwrap_or_else(Type::void);
        let actual = match node.child(0) {
            Some(value) => self.type_of(value),
            None => ExprType::Known(Type::void()),
        };

        if let ExprType::Known(actual) = actual {
            if !self.compatible(&expected, &actual) {
                let message = format!(
                    "Method {} should return {} but is returning '{}'.",
                    self.ctx.name, expected, actual
                );
                self.report(node, message);
            }
        }
    }

    /// Check `rhs` against the declared type `lhs`, reporting at `at`.
    fn check_assignment(&mut self, at: NodeRef<'_>, lhs: &Type, rhs: NodeRef<'_>) {
        if let ExprType::Known(actual) = self.type_of(rhs) {
            if !self.compatible(lhs, &actual) {
                self.report(
                    at,
                    format!("Assignment between a '{}' and a '{}'.", lhs, actual),
                );
            }
        }
    }

    fn check_index(&mut self, index: NodeRef<'_>) {
        if let ExprType::Known(ty) = self.type_of(index) {
            if !ty.is_int() {
                self.report(index, "Array Access Index should be of type 'int'.");
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Type of an expression, reporting any problem found inside it.
    pub fn type_of(&mut self, node: NodeRef<'_>) -> ExprType {
        match node.kind() {
            NodeKind::Integer => ExprType::Known(Type::int()),
            NodeKind::Boolean => ExprType::Known(Type::boolean()),
            NodeKind::String => ExprType::Known(Type::string()),
            NodeKind::Scope => match node.child(0) {
                Some(inner) => self.type_of(inner),
                None => ExprType::Invalid,
            },
            NodeKind::Identifier => self.identifier_type(node),
            NodeKind::Self_ => self.self_type(node),
            NodeKind::NewObject => self.new_object_type(node),
            NodeKind::BinaryOp => self.binary_type(node),
            NodeKind::UnaryOp => self.unary_type(node),
            NodeKind::ArrayAccess => self.array_access_type(node),
            NodeKind::Length => self.length_type(node),
            NodeKind::MethodCalls => self.call_type(node),
            _ => ExprType::Invalid,
        }
    }

    fn identifier_type(&mut self, node: NodeRef<'_>) -> ExprType {
        let name = node.get("value");
        match self.resolve(name) {
            Some((_, VarOrigin::Field)) if self.ctx.is_static => {
                self.report(node, "Cannot use fields in a static method.");
                ExprType::Invalid
            }
            Some((ty, _)) => ExprType::Known(ty),
            None => {
                self.report(node, format!("Variable {} is not declared.", name));
                ExprType::Invalid
            }
        }
    }

    fn self_type(&mut self, node: NodeRef<'_>) -> ExprType {
        if self.ctx.is_static {
            self.report(node, "'this' cannot be used in a static method.");
            return ExprType::Invalid;
        }
        ExprType::Known(Type::class(self.table.class_name()))
    }

    fn new_object_type(&mut self, node: NodeRef<'_>) -> ExprType {
        let name = node.child(0).map(|t| t.get("type")).unwrap_or("");

        if let Some(len) = node.child(1) {
            if let ExprType::Known(ty) = self.type_of(len) {
                if !ty.is_int() {
                    self.report(len, "Array size should be of type 'int'.");
                }
            }
            return ExprType::Known(Type::int_array());
        }

        if self.is_known_class(name) {
            ExprType::Known(Type::class(name))
        } else {
            self.report(
                node,
                format!(
                    "{} doesn't exist. Maybe you forgot to import a class or define a variable?",
                    name
                ),
            );
            ExprType::Invalid
        }
    }

    fn binary_type(&mut self, node: NodeRef<'_>) -> ExprType {
        let op = node.get("op");
        let (Some(left), Some(right)) = (node.child(0), node.child(1)) else {
            return ExprType::Invalid;
        };
        let lt = self.type_of(left);
        let rt = self.type_of(right);
        if lt == ExprType::Invalid || rt == ExprType::Invalid {
            return ExprType::Invalid;
        }

        let both = |pred: fn(&Type) -> bool| {
            [&lt, &rt].iter().all(|t| match t {
                ExprType::Known(ty) => pred(ty),
                _ => true,
            })
        };

        let (ok, result, hint) = match op {
            "+" | "-" | "*" | "/" | "%" | "&" | "|" | "^" => {
                (both(Type::is_int), Type::int(), Some("int"))
            }
            "<" | ">" | "<=" | ">=" => (both(Type::is_int), Type::boolean(), Some("int")),
            "&&" | "||" => (both(Type::is_boolean), Type::boolean(), Some("boolean")),
            "==" | "!=" => {
                let ok = match (&lt, &rt) {
                    (ExprType::Known(a), ExprType::Known(b)) => self.compatible(a, b),
                    _ => true,
                };
                (ok, Type::boolean(), None)
            }
            _ => {
                self.report(node, format!("Unknown operator '{}'.", op));
                return ExprType::Invalid;
            }
        };

        if ok {
            return ExprType::Known(result);
        }

        let mut message = format!(
            "Cannot use '{}' between '{}' and '{}'.",
            op,
            describe(&lt),
            describe(&rt)
        );
        if let Some(hint) = hint {
            message.push_str(&format!(" Both should be '{}'.", hint));
        }
        self.report(node, message);
        ExprType::Invalid
    }

    fn unary_type(&mut self, node: NodeRef<'_>) -> ExprType {
        let Some(operand) = node.child(0) else {
            return ExprType::Invalid;
        };
        match self.type_of(operand) {
            ExprType::Known(ty) if ty.is_boolean() => ExprType::Known(Type::boolean()),
            ExprType::Known(ty) => {
                self.report(node, format!("Cannot use '!' on a '{}'.", ty));
                ExprType::Invalid
            }
            ExprType::Trusted => ExprType::Known(Type::boolean()),
            ExprType::Invalid => ExprType::Invalid,
        }
    }

    fn array_access_type(&mut self, node: NodeRef<'_>) -> ExprType {
        let (Some(base), Some(index)) = (node.child(0), node.child(1)) else {
            return ExprType::Invalid;
        };

        let base_name = match base.kind() {
            NodeKind::Identifier => base.get("value"),
            _ => "expression",
        };
        let base_type = if base.is(NodeKind::Identifier) {
            match self.resolve(base_name) {
                Some((_, VarOrigin::Field)) if self.ctx.is_static => {
                    self.report(base, "Cannot use fields in a static method.");
                    ExprType::Invalid
                }
                Some((ty, _)) => ExprType::Known(ty),
                None => {
                    self.report(node, format!("Variable {} was not declared.", base_name));
                    ExprType::Invalid
                }
            }
        } else {
            self.type_of(base)
        };

        self.check_index(index);

        match base_type {
            ExprType::Known(ty) if ty.is_array => ExprType::Known(ty.element()),
            ExprType::Known(_) => {
                self.report(
                    node,
                    format!(
                        "Array Access over variable {} which is not an array.",
                        base_name
                    ),
                );
                ExprType::Invalid
            }
            other => other,
        }
    }

    fn length_type(&mut self, node: NodeRef<'_>) -> ExprType {
        let Some(base) = node.child(0) else {
            return ExprType::Invalid;
        };
        match self.type_of(base) {
            ExprType::Known(ty) if ty.is_array => ExprType::Known(Type::int()),
            ExprType::Known(ty) => {
                self.report(node, format!("Cannot read 'length' of a '{}'.", ty));
                ExprType::Invalid
            }
            ExprType::Trusted => ExprType::Known(Type::int()),
            ExprType::Invalid => ExprType::Invalid,
        }
    }

    fn call_type(&mut self, node: NodeRef<'_>) -> ExprType {
        let method = node.get("methodName");
        let Some(base) = node.child(0).map(|b| b.unwrap_scope()) else {
            return ExprType::Invalid;
        };
        let table = self.table;

        let target = match base.kind() {
            NodeKind::Identifier => {
                let name = base.get("value");
                match self.resolve(name) {
                    Some((_, VarOrigin::Field)) if self.ctx.is_static => {
                        self.report(base, "Cannot use fields in a static method.");
                        ExprType::Invalid
                    }
                    Some((ty, _)) => ExprType::Known(ty),
                    None if name == table.class_name() => ExprType::Known(Type::class(name)),
                    None if table.is_imported(name) => ExprType::Trusted,
                    None => {
                        self.report(
                            base,
                            format!(
                                "{} doesn't exist. Maybe you forgot to import a class or define a variable?",
                                name
                            ),
                        );
                        ExprType::Invalid
                    }
                }
            }
            _ => self.type_of(base),
        };

        let args: Vec<NodeRef<'_>> = node.children().skip(1).collect();
        let arg_types: Vec<ExprType> = args.iter().map(|arg| self.type_of(*arg)).collect();

        let ty = match target {
            ExprType::Known(ty) => ty,
            other => return other,
        };
        if ty.is_array || ty.is_primitive() || ty.name == "String" {
            self.report(node, format!("Method {} is not declared.", method));
            return ExprType::Invalid;
        }
        if ty.name != table.class_name() {
            return ExprType::Trusted;
        }

        let Some(signature) = table.signature(method) else {
            if table.super_class().is_some() {
                return ExprType::Trusted;
            }
            self.report(node, format!("Method {} is not declared.", method));
            return ExprType::Invalid;
        };

        let params = &signature.parameters;
        if params.len() != args.len() {
            self.report(
                node,
                format!(
                    "{} expected {} arguments but received {}.",
                    method,
                    params.len(),
                    args.len()
                ),
            );
        } else {
            for ((param, arg), arg_ty) in params.iter().zip(&args).zip(&arg_types) {
                if let ExprType::Known(actual) = arg_ty {
                    if !self.compatible(&param.ty, actual) {
                        self.report(
                            *arg,
                            format!(
                                "Argument {} of {} expected a {} but received {}",
                                param.name, method, param.ty, actual
                            ),
                        );
                    }
                }
            }
        }

        ExprType::Known(signature.return_type.clone().unwrap_or_else(Type::void))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn resolve(&self, name: &str) -> Option<(Type, VarOrigin)> {
        self.ctx
            .relevant_vars
            .iter()
            .find(|(symbol, _)| symbol.name == name)
            .map(|(symbol, origin)| (symbol.ty.clone(), *origin))
    }

    fn is_known_class(&self, name: &str) -> bool {
        name == self.table.class_name()
            || self.table.super_class() == Some(name)
            || self.table.is_imported(name)
    }

    /// Whether a value of type `actual` may be used where `expected` is
    /// declared: equal types, the declared class and its superclass in
    /// either order, or two imported types.
    fn compatible(&self, expected: &Type, actual: &Type) -> bool {
        if expected == actual {
            return true;
        }
        if expected.is_array || actual.is_array {
            return false;
        }
        let class = self.table.class_name();
        let related = self.table.super_class().is_some_and(|sup| {
            (expected.name == class && actual.name == sup)
                || (expected.name == sup && actual.name == class)
        });
        related || (self.table.is_imported(&expected.name) && self.table.is_imported(&actual.name))
    }

    fn report(&mut self, node: NodeRef<'_>, message: impl Into<String>) {
        self.reports.push(Report::error(
            Stage::Semantic,
            node.line(),
            node.col(),
            message,
        ));
    }
}

fn describe(ty: &ExprType) -> String {
    match ty {
        ExprType::Known(ty) => ty.to_string(),
        ExprType::Trusted => "unknown".to_string(),
        ExprType::Invalid => "invalid".to_string(),
    }
}

/// Run semantic analysis over a bound program.
pub fn analyze(ast: &Ast, symbol_table: SymbolTable) -> CheckResult {
    let reports = TypeChecker::new(&symbol_table).check(ast);
    CheckResult {
        symbol_table,
        reports,
    }
}
