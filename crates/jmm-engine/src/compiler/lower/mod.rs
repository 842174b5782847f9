//! AST to IR Lowering
//!
//! Converts the checked AST into IR text, one single forward pass with no
//! fix-ups. Labels are written at the sites that introduce them. Four
//! counters live for the whole class: temporaries (`temp_N`), if/else
//! label pairs (`THEN_N`/`ENDIF_N`), loop label pairs (`BODY_N`/
//! `ENDLOOP_N+1`) and the next import line to copy.

mod control_flow;
mod expr;
mod stmt;

use crate::compiler::ir::ElementType;
use crate::parser::ast::{Ast, NodeKind, NodeRef};
use crate::parser::checker::{SymbolTable, Type, VarOrigin};
use std::fmt::Write;

/// A lowered operand: IR text of a single element and its source type.
#[derive(Debug, Clone)]
struct Value {
    text: String,
    ty: Type,
    /// Bare name when the value lives in a variable
    var: Option<String>,
}

impl Value {
    fn literal(text: String, ty: Type) -> Self {
        Value {
            text,
            ty,
            var: None,
        }
    }

    fn variable(name: &str, ty: Type) -> Self {
        Value {
            text: format!("{}{}", name, ir_type(&ty)),
            ty,
            var: Some(name.to_string()),
        }
    }
}

/// Right-hand side of an assignment, possibly a compound expression.
#[derive(Debug, Clone)]
struct Rhs {
    text: String,
    ty: Type,
    /// Object allocation that must be followed by a constructor call
    needs_init: bool,
    /// Plain element, no computation
    simple: bool,
}

impl Rhs {
    fn compound(text: String, ty: Type) -> Self {
        Rhs {
            text,
            ty,
            needs_init: false,
            simple: false,
        }
    }
}

impl From<Value> for Rhs {
    fn from(value: Value) -> Self {
        Rhs {
            text: value.text,
            ty: value.ty,
            needs_init: false,
            simple: true,
        }
    }
}

/// IR type suffix of a source type (`.i32`, `.array.i32`, `.Foo`).
pub fn ir_type(ty: &Type) -> String {
    ElementType::from_source(ty).to_string()
}

/// AST to IR lowerer
pub struct Lowerer<'a> {
    table: &'a SymbolTable,
    code: String,
    temp_index: usize,
    if_index: usize,
    loop_index: usize,
    import_index: usize,
    /// Method being lowered
    method: String,
    is_static: bool,
}

impl<'a> Lowerer<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Lowerer {
            table,
            code: String::new(),
            temp_index: 0,
            if_index: 0,
            loop_index: 0,
            import_index: 0,
            method: String::new(),
            is_static: false,
        }
    }

    /// Lower a whole program to IR text.
    pub fn lower(mut self, ast: &Ast) -> String {
        if ast.is_empty() {
            return self.code;
        }
        for child in ast.root().children() {
            match child.kind() {
                NodeKind::ImportPackage => self.lower_import(),
                NodeKind::ClassDeclaration => self.lower_class(child),
                _ => {}
            }
        }
        log::debug!(
            "lowered class '{}' to {} lines of IR",
            self.table.class_name(),
            self.code.lines().count()
        );
        self.code
    }

    fn lower_import(&mut self) {
        if let Some(line) = self.table.import_statements().get(self.import_index) {
            writeln!(self.code, "{}", line).unwrap();
        }
        self.import_index += 1;
    }

    fn lower_class(&mut self, class: NodeRef<'_>) {
        let table = self.table;
        let name = table.class_name();
        match table.super_class() {
            Some(sup) => writeln!(self.code, "{} extends {} {{", name, sup).unwrap(),
            None => writeln!(self.code, "{} {{", name).unwrap(),
        }

        for field in table.fields() {
            writeln!(self.code, "\t.field private {}{};", field.name, ir_type(&field.ty)).unwrap();
        }
        if !table.fields().is_empty() {
            writeln!(self.code).unwrap();
        }

        writeln!(self.code, "\t.construct {}().V {{", name).unwrap();
        writeln!(self.code, "\t\tinvokespecial(this, \"<init>\").V;").unwrap();
        writeln!(self.code, "\t}}").unwrap();

        if let Some(body) = class.child_of_kind(NodeKind::ClassBody) {
            for method in body.children().filter(|c| c.kind().is_method()) {
                self.lower_method(method);
            }
        }
        writeln!(self.code, "}}").unwrap();
    }

    fn lower_method(&mut self, node: NodeRef<'_>) {
        let table = self.table;
        let name = node.get("name");
        let is_static = table.is_static_method(name);
        self.method = name.to_string();
        self.is_static = is_static;
        log::trace!("lowering method '{}'", name);

        let params: Vec<String> = table
            .parameters(name)
            .iter()
            .map(|p| format!("{}{}", p.name, ir_type(&p.ty)))
            .collect();
        let ret = table.return_type(name).cloned().unwrap_or_else(Type::void);

        writeln!(self.code).unwrap();
        writeln!(
            self.code,
            "\t.method public {}{}({}){} {{",
            if is_static { "static " } else { "" },
            name,
            params.join(", "),
            ir_type(&ret)
        )
        .unwrap();

        let mut ends_with_return = false;
        if let Some(body) = node.child_of_kind(NodeKind::MethodBody) {
            for stmt in body.children() {
                self.lower_statement(stmt);
                ends_with_return = stmt.is(NodeKind::Return);
            }
        }
        if ret.is_void() && !ends_with_return {
            self.emit("ret.V;");
        }

        writeln!(self.code, "\t}}").unwrap();
    }

    // ========================================================================
    // Helpers shared by the submodules
    // ========================================================================

    fn emit(&mut self, line: impl AsRef<str>) {
        writeln!(self.code, "\t\t{}", line.as_ref()).unwrap();
    }

    fn emit_label(&mut self, label: &str) {
        writeln!(self.code, "\t{}:", label).unwrap();
    }

    /// Next `temp_N` that no variable visible in the current method uses.
    fn new_temp(&mut self) -> String {
        loop {
            let temp = format!("temp_{}", self.temp_index);
            self.temp_index += 1;
            if self.resolve(&temp).is_none() {
                return temp;
            }
        }
    }

    /// Resolve a variable in the current method: local, parameter, field.
    fn resolve(&self, name: &str) -> Option<(Type, VarOrigin)> {
        self.table
            .lookup(&self.method, name)
            .map(|(symbol, origin)| (symbol.ty.clone(), origin))
    }

    /// Whether a name refers to a field read through `this`.
    fn is_instance_field(&self, origin: VarOrigin) -> bool {
        origin == VarOrigin::Field && !self.is_static
    }

    /// `$N.` ordinal of a parameter as written before array accesses.
    fn param_prefix(&self, index: usize) -> String {
        let ordinal = if self.is_static { index } else { index + 1 };
        format!("${}.", ordinal)
    }
}

/// Lower a checked program to IR text.
pub fn generate_ir(ast: &Ast, table: &SymbolTable) -> String {
    Lowerer::new(table).lower(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::checker::build_symbol_table;
    use crate::parser::parse_source;

    pub(super) fn lower_source(source: &str) -> String {
        let ast = parse_source(source).unwrap();
        let table = build_symbol_table(&ast);
        generate_ir(&ast, &table)
    }

    #[test]
    fn test_class_prologue() {
        let ir = lower_source("import io; class A extends B { int x; }");
        let lines: Vec<&str> = ir.lines().collect();
        assert_eq!(lines[0], "import io;");
        assert_eq!(lines[1], "A extends B {");
        assert_eq!(lines[2], "\t.field private x.i32;");
        assert!(ir.contains("\t.construct A().V {\n\t\tinvokespecial(this, \"<init>\").V;\n\t}"));
        assert!(ir.ends_with("}\n"));
    }

    #[test]
    fn test_main_is_forced_static() {
        let ir = lower_source("class A { public void main(String[] args) { } }");
        assert!(ir.contains(".method public static main(args.array.String).V {"));
        assert!(ir.contains("\t\tret.V;"));
    }

    #[test]
    fn test_method_header() {
        let ir = lower_source("class A { int f(int a, boolean b) { return a; } }");
        assert!(ir.contains(".method public f(a.i32, b.bool).i32 {"));
        assert!(ir.contains("ret.i32 a.i32;"));
    }

    #[test]
    fn test_duplicate_imports_are_written_once() {
        let ir = lower_source("import a.B; import a.B; class A { }");
        assert_eq!(ir.matches("import a.B;").count(), 1);
    }
}
