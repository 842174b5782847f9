//! Statement Lowering

use super::{ir_type, Lowerer};
use crate::parser::ast::{NodeKind, NodeRef};
use crate::parser::checker::{Type, VarOrigin};

impl<'a> Lowerer<'a> {
    /// Lower a statement
    pub(super) fn lower_statement(&mut self, node: NodeRef<'_>) {
        match node.kind() {
            NodeKind::Declaration => {
                // Only declarations with an initializer produce code
                if let Some(init) = node.child(1) {
                    self.lower_store(node.get("var"), init);
                }
            }
            NodeKind::Assignment => {
                if let Some(value) = node.child(0) {
                    self.lower_store(node.get("var"), value);
                }
            }
            NodeKind::ArrayAssignment => self.lower_array_store(node),
            NodeKind::ExprStmt => {
                if let Some(expr) = node.child(0) {
                    self.lower_expr_stmt(expr);
                }
            }
            NodeKind::IfElse => self.lower_if(node),
            NodeKind::While => self.lower_while(node),
            NodeKind::Return => self.lower_return(node),
            NodeKind::NestedStatements => {
                for stmt in node.children() {
                    self.lower_statement(stmt);
                }
            }
            _ => self.lower_expr_stmt(node),
        }
    }

    /// `var = value`, written straight into the variable.
    fn lower_store(&mut self, var: &str, value: NodeRef<'_>) {
        match self.resolve(var) {
            Some((ty, origin)) if self.is_instance_field(origin) => {
                let value = self.lower_value(value, Some(ty.clone()));
                self.emit(format!(
                    "putfield(this, {}{}, {}).V;",
                    var,
                    ir_type(&ty),
                    value.text
                ));
            }
            resolved => {
                let hint = resolved.map(|(ty, _)| ty);
                let rhs = self.lower_rhs(value, hint.clone());
                let ty = hint.unwrap_or_else(|| rhs.ty.clone());
                let target = format!("{}{}", var, ir_type(&ty));
                self.emit(format!("{} :={} {};", target, ir_type(&ty), rhs.text));
                if rhs.needs_init {
                    self.emit(format!("invokespecial({}, \"<init>\").V;", target));
                }
            }
        }
    }

    /// `a[i] = v` as a single array-element assignment.
    fn lower_array_store(&mut self, node: NodeRef<'_>) {
        let (Some(index), Some(value)) = (node.child(0), node.child(1)) else {
            return;
        };
        let var = node.get("var");
        let (array_ty, origin) = self
            .resolve(var)
            .unwrap_or((Type::int_array(), VarOrigin::Local));

        let index = self.lower_value(index, Some(Type::int()));
        let base = self.array_base(var, &array_ty, origin);
        let element = array_ty.element();
        let value = self.lower_value(value, Some(element.clone()));
        let element_ty = ir_type(&element);
        self.emit(format!(
            "{}[{}]{} :={} {};",
            base, index.text, element_ty, element_ty, value.text
        ));
    }

    /// Expression evaluated for its side effects only.
    fn lower_expr_stmt(&mut self, node: NodeRef<'_>) {
        let node = node.unwrap_scope();
        match node.kind() {
            NodeKind::MethodCalls => {
                let call = self.lower_call(node, None);
                self.emit(format!("{};", call.text));
            }
            // Literals and names have no effect
            NodeKind::Integer
            | NodeKind::Boolean
            | NodeKind::String
            | NodeKind::Self_
            | NodeKind::Identifier => {}
            _ => {
                self.lower_value(node, None);
            }
        }
    }

    fn lower_return(&mut self, node: NodeRef<'_>) {
        let ret = self
            .table
            .return_type(&self.method)
            .cloned()
            .unwrap_or_else(Type::void);
        match node.child(0) {
            Some(expr) if !ret.is_void() => {
                let value = self.lower_value(expr, Some(ret.clone()));
                self.emit(format!("ret{} {};", ir_type(&ret), value.text));
            }
            _ => self.emit("ret.V;"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::lower_source;

    #[test]
    fn test_literal_assignment() {
        let ir = lower_source("class A { int f() { int x; x = 5; return x; } }");
        assert!(ir.contains("\t\tx.i32 :=.i32 5.i32;\n"));
        assert!(ir.contains("\t\tret.i32 x.i32;\n"));
    }

    #[test]
    fn test_declaration_initializer() {
        let ir = lower_source("class A { boolean f() { boolean b = true; return b; } }");
        assert!(ir.contains("b.bool :=.bool 1.bool;"));
    }

    #[test]
    fn test_binary_assignment_writes_target_directly() {
        let ir = lower_source("class A { int g(int x) { x = x + 1; return x; } }");
        assert!(ir.contains("\t\tx.i32 :=.i32 x.i32 +.i32 1.i32;\n"));
        assert!(!ir.contains("temp_"));
    }

    #[test]
    fn test_new_object_is_initialized() {
        let ir = lower_source("class A { void f() { A a; a = new A(); } }");
        assert!(ir.contains("a.A :=.A new(A).A;\n\t\tinvokespecial(a.A, \"<init>\").V;"));
    }

    #[test]
    fn test_new_array() {
        let ir = lower_source("class A { int h() { int[] a; a = new int[5]; return a.length; } }");
        assert!(ir.contains("a.array.i32 :=.array.i32 new(array, 5.i32).array.i32;"));
        assert!(ir.contains("arraylength(a.array.i32).i32"));
    }

    #[test]
    fn test_array_store() {
        let ir = lower_source("class A { void f(int[] a, int i) { a[i] = 3; } }");
        assert!(ir.contains("$1.a[i.i32].i32 :=.i32 3.i32;"));
    }

    #[test]
    fn test_field_store_and_load() {
        let ir = lower_source("class A { int n; int f() { n = 4; return n; } }");
        assert!(ir.contains("putfield(this, n.i32, 4.i32).V;"));
        assert!(ir.contains("temp_0.i32 :=.i32 getfield(this, n.i32).i32;"));
        assert!(ir.contains("ret.i32 temp_0.i32;"));
    }

    #[test]
    fn test_local_shadows_field() {
        let ir = lower_source("class A { int n; int f() { int n; n = 1; return n; } }");
        assert!(ir.contains("n.i32 :=.i32 1.i32;"));
        assert!(!ir.contains("putfield"));
    }

    #[test]
    fn test_void_return() {
        let ir = lower_source("class A { void f() { return; } }");
        assert_eq!(ir.matches("ret.V;").count(), 1);
    }
}
