//! Expression Lowering
//!
//! Expressions are lowered post-order. Every compound sub-expression is
//! materialized into a fresh `temp_N` so that each emitted line holds at
//! most one operation.

use super::{ir_type, Lowerer, Rhs, Value};
use crate::parser::ast::{NodeKind, NodeRef};
use crate::parser::checker::{Type, VarOrigin};

/// Type of a call result when nothing in the context says otherwise.
fn default_value_type() -> Type {
    Type::int()
}

impl<'a> Lowerer<'a> {
    /// Lower an expression to a single element, spilling compound
    /// expressions into a temporary.
    pub(super) fn lower_value(&mut self, node: NodeRef<'_>, hint: Option<Type>) -> Value {
        let node = node.unwrap_scope();
        match node.kind() {
            NodeKind::Integer => Value::literal(format!("{}.i32", node.get("value")), Type::int()),
            NodeKind::Boolean => {
                let bit = if node.get("value") == "true" { 1 } else { 0 };
                Value::literal(format!("{}.bool", bit), Type::boolean())
            }
            NodeKind::String => {
                Value::literal(format!("\"{}\".String", node.get("value")), Type::string())
            }
            NodeKind::Self_ => {
                let class = Type::class(self.table.class_name());
                Value::literal(format!("this{}", ir_type(&class)), class)
            }
            NodeKind::Identifier => self.lower_identifier(node),
            _ => {
                let rhs = self.lower_rhs(node, hint);
                self.materialize(rhs)
            }
        }
    }

    /// Lower an expression to anything allowed right of `:=`.
    pub(super) fn lower_rhs(&mut self, node: NodeRef<'_>, hint: Option<Type>) -> Rhs {
        let node = node.unwrap_scope();
        match node.kind() {
            NodeKind::BinaryOp => {
                let (left, op, right, ty) = self.lower_binary_parts(node);
                let text = format!("{} {}{} {}", left.text, op, ir_type(&ty), right.text);
                Rhs::compound(text, ty)
            }
            NodeKind::UnaryOp => {
                let operand = match node.child(0) {
                    Some(operand) => self.lower_value(operand, Some(Type::boolean())),
                    None => Value::literal("0.bool".to_string(), Type::boolean()),
                };
                Rhs::compound(format!("!.bool {}", operand.text), Type::boolean())
            }
            NodeKind::ArrayAccess => self.lower_array_access(node),
            NodeKind::Length => {
                let array = match node.child(0) {
                    Some(base) => self.lower_value(base, Some(Type::int_array())),
                    None => Value::literal("0.i32".to_string(), Type::int()),
                };
                Rhs::compound(format!("arraylength({}).i32", array.text), Type::int())
            }
            NodeKind::MethodCalls => {
                let hint = hint.unwrap_or_else(default_value_type);
                self.lower_call(node, Some(hint))
            }
            NodeKind::NewObject => self.lower_new(node),
            _ => self.lower_value(node, hint).into(),
        }
    }

    /// Spill a compound right-hand side into a fresh temporary.
    fn materialize(&mut self, rhs: Rhs) -> Value {
        if rhs.simple {
            return Value {
                text: rhs.text,
                ty: rhs.ty,
                var: None,
            };
        }
        let temp = self.new_temp();
        let value = Value::variable(&temp, rhs.ty.clone());
        self.emit(format!("{} :={} {};", value.text, ir_type(&rhs.ty), rhs.text));
        if rhs.needs_init {
            self.emit(format!("invokespecial({}, \"<init>\").V;", value.text));
        }
        value
    }

    fn lower_identifier(&mut self, node: NodeRef<'_>) -> Value {
        let name = node.get("value");
        match self.resolve(name) {
            Some((ty, origin)) if self.is_instance_field(origin) => {
                let field = format!("{}{}", name, ir_type(&ty));
                let rhs = Rhs::compound(format!("getfield(this, {}){}", field, ir_type(&ty)), ty);
                self.materialize(rhs)
            }
            Some((ty, _)) => Value::variable(name, ty),
            // A class or import name, meaningful only as a call target
            None => Value::literal(name.to_string(), Type::class(name)),
        }
    }

    /// Bare name under which an array variable is indexed. Parameters carry
    /// their `$N.` ordinal; fields are read into a temporary first.
    pub(super) fn array_base(&mut self, var: &str, ty: &Type, origin: VarOrigin) -> String {
        match origin {
            VarOrigin::Parameter(index) => format!("{}{}", self.param_prefix(index), var),
            VarOrigin::Field if !self.is_static => {
                let field = format!("{}{}", var, ir_type(ty));
                let rhs = Rhs::compound(format!("getfield(this, {}){}", field, ir_type(ty)), ty.clone());
                let value = self.materialize(rhs);
                value.var.unwrap_or_else(|| var.to_string())
            }
            _ => var.to_string(),
        }
    }

    fn lower_array_access(&mut self, node: NodeRef<'_>) -> Rhs {
        let (Some(base), Some(index)) = (node.child(0), node.child(1)) else {
            return Rhs::compound("0.i32".to_string(), Type::int());
        };
        let base = base.unwrap_scope();

        let index = self.lower_value(index, Some(Type::int()));

        let resolved = if base.is(NodeKind::Identifier) {
            let var = base.get("value");
            self.resolve(var).map(|(ty, origin)| (var, ty, origin))
        } else {
            None
        };
        let (base_text, array_ty) = match resolved {
            Some((var, ty, origin)) => (self.array_base(var, &ty, origin), ty),
            None => {
                let value = self.lower_value(base, Some(Type::int_array()));
                let value = match value.var {
                    Some(_) => value,
                    None => self.materialize(Rhs::compound(value.text, value.ty)),
                };
                let name = value.var.unwrap_or_default();
                (name, value.ty)
            }
        };

        let element = array_ty.element();
        let text = format!("{}[{}]{}", base_text, index.text, ir_type(&element));
        Rhs::compound(text, element)
    }

    fn lower_new(&mut self, node: NodeRef<'_>) -> Rhs {
        if let Some(length) = node.child(1) {
            let length = self.lower_value(length, Some(Type::int()));
            return Rhs::compound(
                format!("new(array, {}).array.i32", length.text),
                Type::int_array(),
            );
        }
        let class = node.child(0).map(|t| t.get("type")).unwrap_or("");
        let ty = Type::class(class);
        let mut rhs = Rhs::compound(format!("new({}){}", class, ir_type(&ty)), ty);
        rhs.needs_init = true;
        rhs
    }

    /// Operands, operator and result type of a binary operation.
    pub(super) fn lower_binary_parts(&mut self, node: NodeRef<'_>) -> (Value, String, Value, Type) {
        let op = node.get("op").to_string();
        let (operand_hint, result) = match op.as_str() {
            "&&" | "||" => (Some(Type::boolean()), Type::boolean()),
            "==" | "!=" => (None, Type::boolean()),
            "<" | ">" | "<=" | ">=" => (Some(Type::int()), Type::boolean()),
            _ => (Some(Type::int()), Type::int()),
        };

        let left = match node.child(0) {
            Some(left) => self.lower_value(left, operand_hint.clone()),
            None => Value::literal("0.i32".to_string(), Type::int()),
        };
        let right = match node.child(1) {
            Some(right) => self.lower_value(right, operand_hint),
            None => Value::literal("0.i32".to_string(), Type::int()),
        };
        (left, op, right, result)
    }

    /// Lower a method call. `expected` is the type the context needs, or
    /// `None` at statement position.
    pub(super) fn lower_call(&mut self, node: NodeRef<'_>, expected: Option<Type>) -> Rhs {
        let table = self.table;
        let method = node.get("methodName");
        let class = table.class_name();

        let (kind, receiver, receiver_class) = match node.child(0).map(|b| b.unwrap_scope()) {
            Some(base) if base.is(NodeKind::Self_) => {
                ("invokevirtual", "this".to_string(), Some(class.to_string()))
            }
            Some(base) if base.is(NodeKind::Identifier) && self.resolve(base.get("value")).is_none() => {
                // Class or imported name: a static call
                let name = base.get("value");
                ("invokestatic", name.to_string(), Some(name.to_string()))
            }
            Some(base) => {
                let value = self.lower_value(base, None);
                let owner = (!value.ty.is_primitive()).then(|| value.ty.name.clone());
                ("invokevirtual", value.text, owner)
            }
            None => ("invokestatic", class.to_string(), Some(class.to_string())),
        };

        let own = receiver_class.as_deref() == Some(class) && table.has_method(method);
        let params = if own { table.parameters(method) } else { &[] };

        let mut args = Vec::new();
        for (i, arg) in node.children().skip(1).enumerate() {
            let hint = params.get(i).map(|p| p.ty.clone());
            args.push(self.lower_value(arg, hint).text);
        }

        let ret = if own {
            table.return_type(method).cloned().unwrap_or_else(Type::void)
        } else {
            expected.unwrap_or_else(Type::void)
        };

        let mut text = format!("{}({}, \"{}\"", kind, receiver, method);
        for arg in &args {
            text.push_str(", ");
            text.push_str(arg);
        }
        text.push(')');
        text.push_str(&ir_type(&ret));
        Rhs::compound(text, ret)
    }
}
