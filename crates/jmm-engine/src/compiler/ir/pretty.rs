//! Pretty-printing for IR
//!
//! Instructions print back in IR syntax. [`PrettyPrint`] dumps a whole
//! class unit with the register and successor tables computed by the
//! pre-passes, for `--debug` output.

use super::instr::Instruction;
use super::method::Method;
use super::module::ClassUnit;
use std::fmt::{self, Write};

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, ty, rhs } => write!(f, "{} :={} {}", dest, ty, rhs),
            Instruction::Call(call) => {
                write!(f, "{}({}", call.kind.keyword(), call.receiver)?;
                if let Some(method) = &call.method {
                    write!(f, ", \"{}\"", method)?;
                }
                for arg in &call.args {
                    write!(f, ", {}", arg)?;
                }
                write!(f, "){}", call.return_type)
            }
            Instruction::Goto(label) => write!(f, "goto {}", label),
            Instruction::Branch { condition, label } => {
                write!(f, "if ({}) goto {}", condition, label)
            }
            Instruction::Return { ty, value } => match value {
                Some(value) => write!(f, "ret{} {}", ty, value),
                None => write!(f, "ret{}", ty),
            },
            Instruction::PutField {
                object,
                field,
                value,
            } => write!(f, "putfield({}, {}, {}).V", object, field, value),
            Instruction::GetField { object, field } => {
                write!(f, "getfield({}, {}){}", object, field, field.ty())
            }
            Instruction::UnaryOp { op, operand } => write!(f, "{}.bool {}", op, operand),
            Instruction::BinaryOp {
                op,
                left,
                right,
                ty,
            } => write!(f, "{} {}{} {}", left, op, ty, right),
            Instruction::NoOp(element) => write!(f, "{}", element),
        }
    }
}

impl PrettyPrint for ClassUnit {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        writeln!(output, "; class {}", self.name).unwrap();
        writeln!(output, ";   super {}", self.super_name()).unwrap();
        for import in &self.imports {
            writeln!(output, ";   import {}", import).unwrap();
        }
        for field in &self.fields {
            writeln!(output, ";   field {}{}", field.name, field.ty).unwrap();
        }
        writeln!(output).unwrap();

        for method in &self.methods {
            output.push_str(&method.pretty_print());
            writeln!(output).unwrap();
        }
        output
    }
}

impl PrettyPrint for Method {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        let kind = if self.is_constructor { "construct" } else { "method" };
        writeln!(
            output,
            "{} {}{}({}){} {{",
            kind,
            if self.is_static { "static " } else { "" },
            self.name,
            params.join(", "),
            self.return_type
        )
        .unwrap();

        // Registers
        if !self.var_table.is_empty() {
            let mut vars: Vec<_> = self.var_table.iter().collect();
            vars.sort_by_key(|(_, d)| d.register);
            let vars: Vec<String> = vars
                .iter()
                .map(|(name, d)| format!("{}=r{}", name, d.register))
                .collect();
            writeln!(output, "  ; locals: {}", vars.join(", ")).unwrap();
        }

        for (index, instruction) in self.instructions.iter().enumerate() {
            for label in self.labels_at(index) {
                writeln!(output, "{}:", label).unwrap();
            }
            let successors = self
                .successors
                .get(index)
                .map(|s| format!("{:?}", s))
                .unwrap_or_default();
            writeln!(output, "  {:>3}: {}  ; -> {}", index, instruction, successors).unwrap();
        }
        for label in self.labels_at(self.instructions.len()) {
            writeln!(output, "{}:", label).unwrap();
        }

        writeln!(output, "}}").unwrap();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::{parse, passes};

    #[test]
    fn test_instruction_display_matches_ir_syntax() {
        let lines = [
            "x.i32 :=.i32 a.i32 +.i32 1.i32",
            "if (x.i32 <.bool 10.i32) goto BODY_0",
            "invokestatic(io, \"println\", x.i32).V",
            "t.bool :=.bool !.bool b.bool",
            "putfield(this, f.i32, x.i32).V",
            "ret.i32 x.i32",
        ];
        let body: String = lines.iter().map(|l| format!("\t\t{};\n", l)).collect();
        let source = format!(
            "A {{\n\t.field private f.i32;\n\t.method public m(a.i32, b.bool).i32 {{\n\tBODY_0:\n{}\t}}\n}}",
            body
        );
        let unit = parse(&source).unwrap();
        let method = unit.method("m").unwrap();
        let printed: Vec<String> = method.instructions.iter().map(|i| i.to_string()).collect();
        assert_eq!(printed, lines);
    }

    #[test]
    fn test_pretty_print_lists_registers() {
        let mut unit = parse(
            "A {\n\t.method public m(a.i32).i32 {\n\t\tret.i32 a.i32;\n\t}\n}",
        )
        .unwrap();
        passes::prepare(&mut unit).unwrap();
        let dump = unit.pretty_print();
        assert!(dump.contains("; class A"));
        assert!(dump.contains("locals: this=r0, a=r1"));
        assert!(dump.contains("ret.i32 a.i32"));
    }
}
