//! Assembler Code Generation
//!
//! Translates a prepared [`ClassUnit`] into textual JVM assembly accepted by
//! Jasmin. Methods are emitted into a side buffer first so that the
//! `.limit stack` computed while emitting can be written ahead of the body.
//!
//! The unit must have been through [`passes::prepare`](crate::compiler::ir::prepare):
//! every local name needs a register.

mod context;
mod control;
pub mod emit;

use crate::compiler::error::CompileResult;
use crate::compiler::ir::{AccessModifier, ClassUnit, Element, Field, Method};
use context::MethodContext;
use emit::{method_descriptor, type_descriptor};
use std::fmt::Write;

/// Assembler generator for one class
pub struct JasminGenerator<'u> {
    unit: &'u ClassUnit,
    code: String,
}

/// Access keyword followed by a space, or nothing for package access.
fn access_prefix(access: AccessModifier) -> String {
    match access.keyword() {
        "" => String::new(),
        keyword => format!("{} ", keyword),
    }
}

impl<'u> JasminGenerator<'u> {
    pub fn new(unit: &'u ClassUnit) -> Self {
        Self {
            unit,
            code: String::new(),
        }
    }

    /// Generate the assembly of the whole class.
    pub fn generate(mut self) -> CompileResult<String> {
        let unit = self.unit;
        writeln!(
            self.code,
            ".class {}{}{}",
            access_prefix(unit.access),
            unit.package.as_deref().unwrap_or(""),
            unit.name
        )
        .unwrap();
        writeln!(self.code, ".super {}", unit.super_name()).unwrap();

        for field in &unit.fields {
            self.generate_field(field);
        }

        self.generate_constructor();
        for method in unit.methods.iter().filter(|m| !m.is_constructor) {
            self.generate_method(method)?;
        }

        log::debug!(
            "emitted class '{}' as {} lines of assembly",
            unit.name,
            self.code.lines().count()
        );
        Ok(self.code)
    }

    fn generate_field(&mut self, field: &Field) {
        let mut line = format!(".field {}", access_prefix(field.access));
        if field.is_static {
            line.push_str("static ");
        }
        if field.is_final {
            line.push_str("final ");
        }
        write!(line, "{} {}", field.name, type_descriptor(&field.ty, self.unit)).unwrap();
        if let Some(value) = &field.initial_value {
            write!(line, " = {}", value).unwrap();
        }
        writeln!(self.code, "{}", line).unwrap();
    }

    /// Default constructor calling the superclass one.
    fn generate_constructor(&mut self) {
        writeln!(self.code).unwrap();
        writeln!(self.code, ".method public <init>()V").unwrap();
        writeln!(self.code, "\taload_0").unwrap();
        writeln!(self.code, "\tinvokespecial {}/<init>()V", self.unit.super_name()).unwrap();
        writeln!(self.code, "\treturn").unwrap();
        writeln!(self.code, ".end method").unwrap();
    }

    fn generate_method(&mut self, method: &Method) -> CompileResult<()> {
        log::trace!("emitting method '{}'", method.name);
        let unit = self.unit;

        let mut header = format!(".method {}", access_prefix(method.access));
        if method.is_static {
            header.push_str("static ");
        }
        if method.is_final {
            header.push_str("final ");
        }
        let descriptor = method_descriptor(
            method.params.iter().map(Element::ty),
            &method.return_type,
            unit,
        );

        let mut ctx = MethodContext::new(unit, method);
        ctx.generate_body()?;
        let (body, max_stack) = ctx.finish();

        writeln!(self.code).unwrap();
        writeln!(self.code, "{}{}{}", header, method.name, descriptor).unwrap();
        writeln!(self.code, "\t.limit stack {}", max_stack).unwrap();
        writeln!(self.code, "\t.limit locals {}", locals_count(method)).unwrap();
        self.code.push_str(&body);
        writeln!(self.code, ".end method").unwrap();
        Ok(())
    }
}

/// Registers used by a method, including `this` for instance methods.
fn locals_count(method: &Method) -> usize {
    let registers = method
        .var_table
        .values()
        .map(|d| usize::from(d.register) + 1)
        .max()
        .unwrap_or(0);
    let needs_this = !method.is_static && !method.var_table.contains_key("this");
    registers.max(method.params.len()) + usize::from(needs_this)
}

/// Generate assembly for a prepared class unit.
pub fn generate(unit: &ClassUnit) -> CompileResult<String> {
    JasminGenerator::new(unit).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::{self, prepare};

    fn emit_ir(source: &str) -> String {
        let mut unit = ir::parse(source).unwrap();
        prepare(&mut unit).unwrap();
        generate(&unit).unwrap()
    }

    /// Instruction lines of one method, trimmed, without the limits.
    fn method_body(code: &str, name: &str) -> Vec<String> {
        let start = code
            .lines()
            .position(|l| l.starts_with(".method") && l.contains(&format!(" {}(", name)))
            .unwrap();
        code.lines()
            .skip(start + 1)
            .take_while(|l| *l != ".end method")
            .filter(|l| !l.trim_start().starts_with(".limit"))
            .map(|l| l.trim().to_string())
            .collect()
    }

    fn class(methods: &str) -> String {
        format!(
            "A {{\n\t.construct A().V {{\n\t\tinvokespecial(this, \"<init>\").V;\n\t}}\n{}}}\n",
            methods
        )
    }

    #[test]
    fn test_class_header_and_constructor() {
        let code = emit_ir("import pkg.B;\nA extends B {\n\t.field private n.i32;\n}\n");
        let lines: Vec<&str> = code.lines().collect();
        assert_eq!(lines[0], ".class public A");
        assert_eq!(lines[1], ".super pkg/B");
        assert_eq!(lines[2], ".field private n I");
        assert!(code.contains(
            ".method public <init>()V\n\taload_0\n\tinvokespecial pkg/B/<init>()V\n\treturn\n.end method"
        ));
    }

    #[test]
    fn test_return_literal() {
        let code = emit_ir(&class("\t.method public f().i32 {\n\t\tret.i32 42.i32;\n\t}\n"));
        assert!(code.contains(".method public f()I\n\t.limit stack 1\n\t.limit locals 1\n"));
        assert_eq!(method_body(&code, "f"), vec!["bipush 42", "ireturn"]);
    }

    #[test]
    fn test_static_main_header() {
        let code = emit_ir(&class(
            "\t.method public static main(args.array.String).V {\n\t\tret.V;\n\t}\n",
        ));
        assert!(code.contains(".method public static main([Ljava/lang/String;)V"));
        assert!(code.contains("\t.limit locals 1\n"));
        assert_eq!(method_body(&code, "main"), vec!["return"]);
    }

    #[test]
    fn test_iinc_peephole() {
        let code = emit_ir(&class(
            "\t.method public g(x.i32).i32 {\n\t\tx.i32 :=.i32 x.i32 +.i32 1.i32;\n\t\tret.i32 x.i32;\n\t}\n",
        ));
        assert_eq!(method_body(&code, "g"), vec!["iinc 1 1", "iload_1", "ireturn"]);
    }

    #[test]
    fn test_iinc_widths() {
        let code = emit_ir(&class(
            "\t.method public g(x.i32).V {\n\
             \t\tx.i32 :=.i32 x.i32 -.i32 0.i32;\n\
             \t\tx.i32 :=.i32 x.i32 -.i32 5.i32;\n\
             \t\tx.i32 :=.i32 x.i32 +.i32 300.i32;\n\
             \t\tx.i32 :=.i32 x.i32 +.i32 70000.i32;\n\
             \t\tx.i32 :=.i32 2.i32 -.i32 x.i32;\n\
             \t\tret.V;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "g"),
            vec![
                "iinc 1 -5",
                "iinc_w 1 300",
                "iload_1",
                "ldc 70000",
                "iadd",
                "istore_1",
                "iconst_2",
                "iload_1",
                "isub",
                "istore_1",
                "return",
            ]
        );
    }

    #[test]
    fn test_constant_folding() {
        let code = emit_ir(&class(
            "\t.method public f().i32 {\n\t\tx.i32 :=.i32 6.i32 *.i32 7.i32;\n\t\tret.i32 x.i32;\n\t}\n",
        ));
        assert_eq!(method_body(&code, "f"), vec!["bipush 42", "ireturn"]);
    }

    #[test]
    fn test_new_array_and_length() {
        let code = emit_ir(&class(
            "\t.method public h().i32 {\n\
             \t\ta.array.i32 :=.array.i32 new(array, 5.i32).array.i32;\n\
             \t\ttemp_0.i32 :=.i32 arraylength(a.array.i32).i32;\n\
             \t\tret.i32 temp_0.i32;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "h"),
            vec![
                "iconst_5",
                "newarray int",
                "astore_1",
                "aload_1",
                "arraylength",
                "ireturn",
            ]
        );
    }

    #[test]
    fn test_labelled_return_keeps_store() {
        let code = emit_ir(&class(
            "\t.method public f(a.array.i32).i32 {\n\
             \t\tt.i32 :=.i32 arraylength(a.array.i32).i32;\n\
             \tDONE:\n\
             \t\tret.i32 t.i32;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "f"),
            vec!["aload_1", "arraylength", "istore_2", "DONE:", "iload_2", "ireturn"]
        );
    }

    #[test]
    fn test_shared_variable_keeps_store() {
        let code = emit_ir(&class(
            "\t.method public f(a.array.i32).i32 {\n\
             \t\tt.i32 :=.i32 0.i32;\n\
             \t\tt.i32 :=.i32 arraylength(a.array.i32).i32;\n\
             \t\tret.i32 t.i32;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "f"),
            vec!["iconst_0", "istore_2", "aload_1", "arraylength", "istore_2", "iload_2", "ireturn"]
        );
    }

    #[test]
    fn test_comparison_value() {
        let code = emit_ir(&class(
            "\t.method public b().bool {\n\t\ttemp_0.bool :=.bool 1.i32 <.bool 2.i32;\n\t\tret.bool temp_0.bool;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "b"),
            vec![
                "iconst_1",
                "iconst_2",
                "if_icmpge else_0",
                "iconst_1",
                "goto end_0",
                "else_0:",
                "iconst_0",
                "end_0:",
                "ireturn",
            ]
        );
        assert!(code.contains("\t.limit stack 2\n"));
    }

    #[test]
    fn test_reference_equality() {
        let code = emit_ir(&class(
            "\t.method public eq(x.A).bool {\n\t\ttemp_0.bool :=.bool x.A ==.bool this.A;\n\t\tret.bool temp_0.bool;\n\t}\n",
        ));
        let body = method_body(&code, "eq");
        assert_eq!(&body[..3], &["aload_1", "aload_0", "if_acmpne else_0"]);
        assert!(code.contains(".method public eq(LA;)Z"));
    }

    #[test]
    fn test_loop_branches() {
        let code = emit_ir(&class(
            "\t.method public m().i32 {\n\
             \t\tx.i32 :=.i32 1.i32;\n\
             \t\tif (x.i32 >=.bool 10.i32) goto ENDLOOP_1;\n\
             \tBODY_0:\n\
             \t\tx.i32 :=.i32 x.i32 +.i32 1.i32;\n\
             \t\tif (x.i32 <.bool 10.i32) goto BODY_0;\n\
             \tENDLOOP_1:\n\
             \t\tret.i32 x.i32;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "m"),
            vec![
                "iconst_1",
                "istore_1",
                "iload_1",
                "bipush 10",
                "if_icmpge ENDLOOP_1",
                "BODY_0:",
                "iinc 1 1",
                "iload_1",
                "bipush 10",
                "if_icmplt BODY_0",
                "ENDLOOP_1:",
                "iload_1",
                "ireturn",
            ]
        );
    }

    #[test]
    fn test_zero_compare_and_logical_branches() {
        let code = emit_ir(&class(
            "\t.method public m(a.i32, b.bool, c.bool).V {\n\
             \t\tif (a.i32 <.bool 0.i32) goto L1;\n\
             \t\tif (0.i32 <.bool a.i32) goto L1;\n\
             \t\tif (b.bool &&.bool c.bool) goto L1;\n\
             \t\tif (b.bool ||.bool c.bool) goto L1;\n\
             \t\tif (!.bool b.bool) goto L1;\n\
             \t\tif (b.bool) goto L1;\n\
             \tL1:\n\
             \t\tret.V;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "m"),
            vec![
                "iload_1",
                "iflt L1",
                "iload_1",
                "ifgt L1",
                "iload_2",
                "ifeq skip_0",
                "iload_3",
                "ifne L1",
                "skip_0:",
                "iload_2",
                "ifne L1",
                "iload_3",
                "ifne L1",
                "iload_2",
                "ifeq L1",
                "iload_2",
                "ifne L1",
                "L1:",
                "return",
            ]
        );
    }

    #[test]
    fn test_not_values() {
        let code = emit_ir(&class(
            "\t.method public n(b.bool).bool {\n\
             \t\tc.bool :=.bool !.bool 1.bool;\n\
             \t\tc.bool :=.bool !.bool b.bool;\n\
             \t\tret.bool c.bool;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "n"),
            vec![
                "iconst_0",
                "istore_2",
                "iload_1",
                "ifne else_0",
                "iconst_1",
                "goto end_0",
                "else_0:",
                "iconst_0",
                "end_0:",
                "istore_2",
                "iload_2",
                "ireturn",
            ]
        );
    }

    #[test]
    fn test_calls() {
        let code = emit_ir(&format!(
            "import io;\n{}",
            class(
                "\t.method public f(o.A).V {\n\
                 \t\tinvokestatic(io, \"println\", 3.i32).V;\n\
                 \t\tinvokevirtual(o.A, \"g\", 1.bool).i32;\n\
                 \t\tt.i32 :=.i32 invokevirtual(this, \"g\", 0.bool).i32;\n\
                 \t\tret.V;\n\t}\n"
            )
        ));
        assert_eq!(
            method_body(&code, "f"),
            vec![
                "iconst_3",
                "invokestatic io/println(I)V",
                "aload_1",
                "iconst_1",
                "invokevirtual A/g(Z)I",
                "pop",
                "aload_0",
                "iconst_0",
                "invokevirtual A/g(Z)I",
                "istore_2",
                "return",
            ]
        );
    }

    #[test]
    fn test_object_creation() {
        let code = emit_ir(&class(
            "\t.method public f().V {\n\
             \t\ta.A :=.A new(A).A;\n\
             \t\tinvokespecial(a.A, \"<init>\").V;\n\
             \t\tret.V;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "f"),
            vec!["new A", "dup", "astore_1", "invokespecial A/<init>()V", "return"]
        );
        assert!(code.contains("\t.limit stack 2\n"));
    }

    #[test]
    fn test_fields_and_arrays() {
        let code = emit_ir(
            "A {\n\t.field private n.i32;\n\t.method public f(a.array.i32).i32 {\n\
             \t\tputfield(this, n.i32, 4.i32).V;\n\
             \t\tt.i32 :=.i32 getfield(this, n.i32).i32;\n\
             \t\t$1.a[t.i32].i32 :=.i32 7.i32;\n\
             \t\tu.i32 :=.i32 $1.a[0.i32].i32;\n\
             \t\tret.i32 u.i32;\n\t}\n}\n",
        );
        assert_eq!(
            method_body(&code, "f"),
            vec![
                "aload_0",
                "iconst_4",
                "putfield A/n I",
                "aload_0",
                "getfield A/n I",
                "istore_2",
                "aload_1",
                "iload_2",
                "bipush 7",
                "iastore",
                "aload_1",
                "iconst_0",
                "iaload",
                "ireturn",
            ]
        );
        assert!(code.contains("\t.limit stack 3\n"));
        assert!(code.contains("\t.limit locals 4\n"));
    }

    #[test]
    fn test_wide_locals_and_strings() {
        let code = emit_ir(&class(
            "\t.method public f(a.i32, b.i32, c.i32, d.i32).String {\n\
             \t\te.i32 :=.i32 d.i32;\n\
             \t\ts.String :=.String \"hi\".String;\n\
             \t\tr.String :=.String s.String;\n\
             \t\tret.String r.String;\n\t}\n",
        ));
        assert_eq!(
            method_body(&code, "f"),
            vec!["iload 4", "istore 5", "ldc \"hi\"", "astore 6", "aload 6", "areturn"]
        );
    }

    #[test]
    fn test_missing_register_is_an_error() {
        let mut unit = ir::parse(&class("\t.method public f().V {\n\t\tret.V;\n\t}\n")).unwrap();
        prepare(&mut unit).unwrap();
        let method = unit.methods.iter_mut().find(|m| m.name == "f").unwrap();
        method.instructions.insert(
            0,
            ir::Instruction::Return {
                ty: ir::ElementType::Int32,
                value: Some(ir::Element::operand("ghost", ir::ElementType::Int32)),
            },
        );
        let err = generate(&unit).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
