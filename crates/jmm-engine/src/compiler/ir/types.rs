//! IR element types

use crate::parser::checker::Type;
use std::fmt;

/// Type annotation carried by every IR element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// `.i32`
    Int32,
    /// `.bool`
    Boolean,
    /// `.V`
    Void,
    /// `.String`
    String,
    /// Instance of a class, written `.Name`
    Object(String),
    /// A bare class name used as the owner of a static call
    Class(String),
    /// The receiver of an instance method
    This,
    /// `.array` followed by the element type
    Array(Box<ElementType>),
}

impl ElementType {
    pub fn array_of(element: ElementType) -> Self {
        ElementType::Array(Box::new(element))
    }

    /// Stored in an int slot (`i` load/store prefix).
    pub fn is_int_like(&self) -> bool {
        matches!(self, ElementType::Int32 | ElementType::Boolean)
    }

    /// Held as a reference (`a` load/store prefix).
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            ElementType::String | ElementType::Object(_) | ElementType::This | ElementType::Array(_)
        )
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ElementType::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ElementType::Array(_))
    }

    /// Element type of an array, or the type itself otherwise.
    pub fn element(&self) -> &ElementType {
        match self {
            ElementType::Array(inner) => inner,
            other => other,
        }
    }

    /// Type written after an IR name, including the leading dot.
    pub fn from_source(ty: &Type) -> Self {
        let base = match ty.name.as_str() {
            "int" => ElementType::Int32,
            "boolean" => ElementType::Boolean,
            "void" => ElementType::Void,
            "String" => ElementType::String,
            other => ElementType::Object(other.to_string()),
        };
        if ty.is_array {
            ElementType::array_of(base)
        } else {
            base
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Int32 => write!(f, ".i32"),
            ElementType::Boolean => write!(f, ".bool"),
            ElementType::Void => write!(f, ".V"),
            ElementType::String => write!(f, ".String"),
            ElementType::Object(name) | ElementType::Class(name) => write!(f, ".{}", name),
            ElementType::This => write!(f, ".this"),
            ElementType::Array(inner) => write!(f, ".array{}", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source() {
        assert_eq!(ElementType::from_source(&Type::int()), ElementType::Int32);
        assert_eq!(
            ElementType::from_source(&Type::int_array()),
            ElementType::array_of(ElementType::Int32)
        );
        assert_eq!(
            ElementType::from_source(&Type::class("Foo")),
            ElementType::Object("Foo".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ElementType::array_of(ElementType::String).to_string(), ".array.String");
        assert_eq!(ElementType::Boolean.to_string(), ".bool");
    }

    #[test]
    fn test_slot_kinds() {
        assert!(ElementType::Boolean.is_int_like());
        assert!(ElementType::array_of(ElementType::Int32).is_reference());
        assert!(!ElementType::Class("io".into()).is_reference());
    }
}
