//! IR class units

use super::method::{AccessModifier, Method};
use super::types::ElementType;

/// A field declared by the class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_final: bool,
    pub name: String,
    pub ty: ElementType,
    /// Literal initial value, as written
    pub initial_value: Option<String>,
}

/// One parsed IR class: the input of the assembler emitter
#[derive(Debug, Clone, Default)]
pub struct ClassUnit {
    pub access: AccessModifier,
    /// Package prefix, including its trailing separator
    pub package: Option<String>,
    pub name: String,
    pub super_class: Option<String>,
    /// Dotted import paths
    pub imports: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl ClassUnit {
    pub fn new(name: impl Into<String>) -> Self {
        ClassUnit {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name && !m.is_constructor)
    }

    /// Fully qualified, slash-separated name of a class referenced by its
    /// simple name: the import path when imported, the name itself
    /// otherwise.
    pub fn qualified_name(&self, name: &str) -> String {
        if name == "this" || name == self.name {
            return self.name.clone();
        }
        self.imports
            .iter()
            .find(|path| *path == name || path.rsplit('.').next() == Some(name))
            .map(|path| path.replace('.', "/"))
            .unwrap_or_else(|| name.to_string())
    }

    /// Superclass for `.super` and the constructor call.
    pub fn super_name(&self) -> String {
        match &self.super_class {
            Some(name) => self.qualified_name(name),
            None => "java/lang/Object".to_string(),
        }
    }
}
