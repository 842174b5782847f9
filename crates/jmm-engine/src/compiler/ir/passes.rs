//! Pre-passes run over a parsed class unit before emission
//!
//! - [`check_method_labels`]: every branch target exists, no label is
//!   defined twice
//! - [`build_cfgs`]: successor indices of every instruction
//! - [`build_var_tables`]: virtual register of every local name

use super::method::{Descriptor, Method};
use super::module::ClassUnit;
use super::types::ElementType;
use super::value::Element;
use crate::compiler::error::{CompileError, CompileResult};
use rustc_hash::{FxHashMap, FxHashSet};

/// Run all pre-passes in order.
pub fn prepare(unit: &mut ClassUnit) -> CompileResult<()> {
    check_method_labels(unit)?;
    build_cfgs(unit)?;
    build_var_tables(unit);
    Ok(())
}

pub fn check_method_labels(unit: &ClassUnit) -> CompileResult<()> {
    for method in &unit.methods {
        let mut defined = FxHashSet::default();
        for (label, _) in &method.labels {
            if !defined.insert(label.as_str()) {
                return Err(CompileError::ir_structure(
                    &method.name,
                    format!("label '{}' is defined more than once", label),
                ));
            }
        }
        for instruction in &method.instructions {
            if let Some(target) = instruction.target() {
                if !defined.contains(target) {
                    return Err(CompileError::ir_structure(
                        &method.name,
                        format!("branch to undefined label '{}'", target),
                    ));
                }
            }
        }
    }
    Ok(())
}

pub fn build_cfgs(unit: &mut ClassUnit) -> CompileResult<()> {
    for method in &mut unit.methods {
        method.successors = method_successors(method)?;
    }
    Ok(())
}

fn method_successors(method: &Method) -> CompileResult<Vec<Vec<usize>>> {
    let count = method.instructions.len();
    let mut successors = Vec::with_capacity(count);

    for (index, instruction) in method.instructions.iter().enumerate() {
        let mut next = Vec::new();
        if !instruction.is_terminator() && index + 1 < count {
            next.push(index + 1);
        }
        if let Some(label) = instruction.target() {
            let target = method.label_index(label).ok_or_else(|| {
                CompileError::ir_structure(&method.name, format!("unresolved label '{}'", label))
            })?;
            // A label past the last instruction has no instruction to flow to
            if target < count && !next.contains(&target) {
                next.push(target);
            }
        }
        successors.push(next);
    }
    Ok(successors)
}

/// Assign registers: `this` first for instance methods, then parameters
/// in order, then every other variable in order of first appearance.
pub fn build_var_tables(unit: &mut ClassUnit) {
    for method in &mut unit.methods {
        let mut table: FxHashMap<String, Descriptor> = FxHashMap::default();
        let mut next: u16 = 0;
        let mut define = |table: &mut FxHashMap<String, Descriptor>, name: &str, ty: &ElementType| {
            if !table.contains_key(name) {
                table.insert(
                    name.to_string(),
                    Descriptor {
                        register: next,
                        ty: ty.clone(),
                    },
                );
                next += 1;
            }
        };

        if !method.is_static {
            define(&mut table, "this", &ElementType::This);
        }
        for param in &method.params {
            if let Some(name) = param.name() {
                define(&mut table, name, param.ty());
            }
        }
        for instruction in &method.instructions {
            for element in instruction.elements() {
                if !element.is_variable() {
                    continue;
                }
                match element {
                    Element::Operand { name, ty } => define(&mut table, name, ty),
                    // The base of an access holds the whole array
                    Element::ArrayOperand { name, ty, .. } => {
                        define(&mut table, name, &ElementType::array_of(ty.clone()))
                    }
                    Element::Literal { .. } => {}
                }
            }
        }

        log::trace!("method '{}' uses {} locals", method.name, table.len());
        method.var_table = table;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::parse;

    fn unit(body: &str, header: &str) -> ClassUnit {
        let source = format!("A {{\n\t.method {} {{\n{}\n\t}}\n}}", header, body);
        parse(&source).unwrap()
    }

    #[test]
    fn test_undefined_label_is_rejected() {
        let unit = unit("\t\tgoto NOWHERE;", "public m().V");
        let err = check_method_labels(&unit).unwrap_err();
        assert!(matches!(err, CompileError::IrStructure { ref method, .. } if method == "m"));
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let unit = unit("\tL:\n\t\tgoto L;\n\tL:\n\t\tret.V;", "public m().V");
        assert!(check_method_labels(&unit).is_err());
    }

    #[test]
    fn test_successors() {
        let mut unit = unit(
            "\t\tif (b.bool) goto THEN_0;\n\t\tx.i32 :=.i32 1.i32;\n\t\tgoto ENDIF_0;\n\tTHEN_0:\n\t\tx.i32 :=.i32 2.i32;\n\tENDIF_0:\n\t\tret.i32 x.i32;",
            "public m(b.bool).i32",
        );
        prepare(&mut unit).unwrap();
        let m = unit.method("m").unwrap();
        assert_eq!(m.successors[0], vec![1, 3]);
        assert_eq!(m.successors[1], vec![2]);
        assert_eq!(m.successors[2], vec![4]);
        assert_eq!(m.successors[3], vec![4]);
        assert!(m.successors[4].is_empty());
    }

    #[test]
    fn test_var_table_order() {
        let mut unit = unit(
            "\t\tx.i32 :=.i32 a.i32 +.i32 1.i32;\n\t\tarr.array.i32 :=.array.i32 new(array, x.i32).array.i32;\n\t\tarr[x.i32].i32 :=.i32 a.i32;\n\t\tret.i32 x.i32;",
            "public m(a.i32).i32",
        );
        prepare(&mut unit).unwrap();
        let m = unit.method("m").unwrap();
        assert_eq!(m.descriptor("this").unwrap().register, 0);
        assert_eq!(m.descriptor("a").unwrap().register, 1);
        assert_eq!(m.descriptor("x").unwrap().register, 2);
        assert_eq!(m.descriptor("arr").unwrap().register, 3);
        assert_eq!(m.var_table.len(), 4);
    }

    #[test]
    fn test_static_method_has_no_this() {
        let mut unit = unit(
            "\t\tinvokestatic(io, \"println\", args.array.String).V;\n\t\tret.V;",
            "public static main(args.array.String).V",
        );
        prepare(&mut unit).unwrap();
        let main = unit.method("main").unwrap();
        assert!(main.descriptor("this").is_none());
        assert!(main.descriptor("io").is_none());
        assert_eq!(main.descriptor("args").unwrap().register, 0);
    }
}
