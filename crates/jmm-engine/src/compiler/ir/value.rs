//! IR elements: the operands of instructions

use super::types::ElementType;
use std::fmt;

/// Operand of an IR instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Integer, boolean (`0`/`1`) or string literal. String literals are
    /// stored without their quotes.
    Literal { value: String, ty: ElementType },
    /// Named variable, `this`, or a bare class name.
    Operand { name: String, ty: ElementType },
    /// `name[index]`, typed by the accessed element
    ArrayOperand {
        name: String,
        indices: Vec<Element>,
        ty: ElementType,
    },
}

impl Element {
    pub fn literal(value: impl Into<String>, ty: ElementType) -> Self {
        Element::Literal {
            value: value.into(),
            ty,
        }
    }

    pub fn operand(name: impl Into<String>, ty: ElementType) -> Self {
        Element::Operand {
            name: name.into(),
            ty,
        }
    }

    pub fn ty(&self) -> &ElementType {
        match self {
            Element::Literal { ty, .. }
            | Element::Operand { ty, .. }
            | Element::ArrayOperand { ty, .. } => ty,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Element::Literal { .. })
    }

    /// Variable name, `None` for literals.
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Literal { .. } => None,
            Element::Operand { name, .. } | Element::ArrayOperand { name, .. } => Some(name),
        }
    }

    /// Integer value of an int or boolean literal.
    pub fn int_value(&self) -> Option<i32> {
        match self {
            Element::Literal { value, ty } if ty.is_int_like() => value.parse().ok(),
            _ => None,
        }
    }

    /// Whether this element occupies a local variable slot.
    pub fn is_variable(&self) -> bool {
        match self {
            Element::Literal { .. } => false,
            Element::Operand { ty, .. } => !matches!(ty, ElementType::Class(_) | ElementType::This),
            Element::ArrayOperand { .. } => true,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Literal { value, ty } if *ty == ElementType::String => {
                write!(f, "\"{}\"{}", value, ty)
            }
            Element::Literal { value, ty } => write!(f, "{}{}", value, ty),
            Element::Operand { name, ty } => match ty {
                ElementType::Class(_) | ElementType::This => write!(f, "{}", name),
                _ => write!(f, "{}{}", name, ty),
            },
            Element::ArrayOperand { name, indices, ty } => {
                let indices: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                write!(f, "{}[{}]{}", name, indices.join(", "), ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Element::literal("42", ElementType::Int32).to_string(), "42.i32");
        assert_eq!(Element::literal("hi", ElementType::String).to_string(), "\"hi\".String");
        assert_eq!(Element::operand("this", ElementType::This).to_string(), "this");
        let access = Element::ArrayOperand {
            name: "a".into(),
            indices: vec![Element::operand("i", ElementType::Int32)],
            ty: ElementType::Int32,
        };
        assert_eq!(access.to_string(), "a[i.i32].i32");
    }

    #[test]
    fn test_int_value() {
        assert_eq!(Element::literal("1", ElementType::Boolean).int_value(), Some(1));
        assert_eq!(Element::literal("x", ElementType::String).int_value(), None);
        assert_eq!(Element::operand("x", ElementType::Int32).int_value(), None);
    }

    #[test]
    fn test_is_variable() {
        assert!(Element::operand("x", ElementType::Int32).is_variable());
        assert!(!Element::operand("io", ElementType::Class("io".into())).is_variable());
        assert!(!Element::operand("this", ElementType::This).is_variable());
    }
}
