//! Assembler Emission Helpers
//!
//! Mnemonic and descriptor selection for common instruction patterns.

use crate::compiler::ir::{ClassUnit, ElementType, OpType};

// ============================================================================
// Descriptors
// ============================================================================

/// JVM descriptor of an IR type (`I`, `Z`, `[I`, `Ljava/lang/String;`).
pub fn type_descriptor(ty: &ElementType, unit: &ClassUnit) -> String {
    match ty {
        ElementType::Int32 => "I".to_string(),
        ElementType::Boolean => "Z".to_string(),
        ElementType::Void => "V".to_string(),
        ElementType::String => "Ljava/lang/String;".to_string(),
        ElementType::Array(inner) => format!("[{}", type_descriptor(inner, unit)),
        ElementType::Object(name) | ElementType::Class(name) => {
            format!("L{};", unit.qualified_name(name))
        }
        ElementType::This => format!("L{};", unit.name),
    }
}

/// `(params)ret` descriptor of a method.
pub fn method_descriptor<'a>(
    params: impl IntoIterator<Item = &'a ElementType>,
    ret: &ElementType,
    unit: &ClassUnit,
) -> String {
    let mut out = String::from("(");
    for param in params {
        out.push_str(&type_descriptor(param, unit));
    }
    out.push(')');
    out.push_str(&type_descriptor(ret, unit));
    out
}

/// Class that owns members accessed through a value of this type.
pub fn owner_name(ty: &ElementType, unit: &ClassUnit) -> String {
    match ty {
        ElementType::This => unit.name.clone(),
        ElementType::Object(name) | ElementType::Class(name) => unit.qualified_name(name),
        ElementType::String => "java/lang/String".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Loads, stores and constants
// ============================================================================

/// Narrowest instruction pushing an int constant.
pub fn int_constant(value: i32) -> String {
    match value {
        -1 => "iconst_m1".to_string(),
        0..=5 => format!("iconst_{}", value),
        _ if i8::try_from(value).is_ok() => format!("bipush {}", value),
        _ if i16::try_from(value).is_ok() => format!("sipush {}", value),
        _ => format!("ldc {}", value),
    }
}

fn type_prefix(ty: &ElementType) -> &'static str {
    if ty.is_int_like() {
        "i"
    } else {
        "a"
    }
}

/// `<op>_N` for registers 0 to 3, `<op> N` above.
fn local_instruction(prefix: &str, op: &str, register: u16) -> String {
    if register <= 3 {
        format!("{}{}_{}", prefix, op, register)
    } else {
        format!("{}{} {}", prefix, op, register)
    }
}

pub fn load_instruction(ty: &ElementType, register: u16) -> String {
    local_instruction(type_prefix(ty), "load", register)
}

pub fn store_instruction(ty: &ElementType, register: u16) -> String {
    local_instruction(type_prefix(ty), "store", register)
}

/// `iaload`/`aaload` for an element of the given type.
pub fn array_load_instruction(element: &ElementType) -> String {
    format!("{}aload", type_prefix(element))
}

pub fn array_store_instruction(element: &ElementType) -> String {
    format!("{}astore", type_prefix(element))
}

pub fn return_instruction(ty: &ElementType) -> &'static str {
    match ty {
        ElementType::Void => "return",
        ty if ty.is_int_like() => "ireturn",
        _ => "areturn",
    }
}

// ============================================================================
// Operators
// ============================================================================

pub fn arithmetic_instruction(op: OpType) -> Option<&'static str> {
    let name = match op {
        OpType::Add => "iadd",
        OpType::Sub => "isub",
        OpType::Mul => "imul",
        OpType::Div => "idiv",
        OpType::Rem => "irem",
        OpType::And => "iand",
        OpType::Or => "ior",
        OpType::Xor => "ixor",
        _ => return None,
    };
    Some(name)
}

/// Value of `left op right` when both are known, with int wrap-around.
/// Division by zero is left to run time.
pub fn fold(op: OpType, left: i32, right: i32) -> Option<i32> {
    match op {
        OpType::Add => Some(left.wrapping_add(right)),
        OpType::Sub => Some(left.wrapping_sub(right)),
        OpType::Mul => Some(left.wrapping_mul(right)),
        OpType::Div if right != 0 => Some(left.wrapping_div(right)),
        OpType::Rem if right != 0 => Some(left.wrapping_rem(right)),
        _ => None,
    }
}

fn condition_suffix(op: OpType) -> Option<&'static str> {
    let suffix = match op {
        OpType::Lth => "lt",
        OpType::Gth => "gt",
        OpType::Lte => "le",
        OpType::Gte => "ge",
        OpType::Eq => "eq",
        OpType::Neq => "ne",
        _ => return None,
    };
    Some(suffix)
}

/// Two-operand int comparison jump (`if_icmplt`).
pub fn int_compare_jump(op: OpType) -> Option<String> {
    condition_suffix(op).map(|s| format!("if_icmp{}", s))
}

/// Comparison of one int against zero (`iflt`).
pub fn zero_compare_jump(op: OpType) -> Option<String> {
    condition_suffix(op).map(|s| format!("if{}", s))
}

/// Reference equality jump; only `==` and `!=` apply.
pub fn reference_compare_jump(op: OpType) -> Option<&'static str> {
    match op {
        OpType::Eq => Some("if_acmpeq"),
        OpType::Neq => Some("if_acmpne"),
        _ => None,
    }
}

/// The comparison with its operands exchanged: `a < b` is `b > a`.
pub fn swap_operands(op: OpType) -> OpType {
    match op {
        OpType::Lth => OpType::Gth,
        OpType::Gth => OpType::Lth,
        OpType::Lte => OpType::Gte,
        OpType::Gte => OpType::Lte,
        other => other,
    }
}
