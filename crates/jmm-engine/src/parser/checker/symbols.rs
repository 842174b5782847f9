//! Symbol table for a single Java-- class
//!
//! Holds the global program metadata gathered by the [`Binder`]: imports,
//! class and superclass names, fields, and per-method signatures with
//! their parameters and locals. The table is filled once and read-only
//! afterwards.
//!
//! [`Binder`]: super::binder::Binder

use rustc_hash::FxHashMap;
use std::fmt;

/// Source-level type: a base name plus an array flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    /// `int`, `boolean`, `void`, `String` or a class identifier
    pub name: String,
    /// One-dimensional array of `name`
    pub is_array: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, is_array: bool) -> Self {
        Self {
            name: name.into(),
            is_array,
        }
    }

    pub fn int() -> Self {
        Self::new("int", false)
    }

    pub fn int_array() -> Self {
        Self::new("int", true)
    }

    pub fn boolean() -> Self {
        Self::new("boolean", false)
    }

    pub fn void() -> Self {
        Self::new("void", false)
    }

    pub fn string() -> Self {
        Self::new("String", false)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn is_int(&self) -> bool {
        !self.is_array && self.name == "int"
    }

    pub fn is_boolean(&self) -> bool {
        !self.is_array && self.name == "boolean"
    }

    pub fn is_void(&self) -> bool {
        !self.is_array && self.name == "void"
    }

    /// `int`, `boolean` or `void`, as opposed to references.
    pub fn is_primitive(&self) -> bool {
        !self.is_array && matches!(self.name.as_str(), "int" | "boolean" | "void")
    }

    /// Element type of an array type.
    pub fn element(&self) -> Type {
        Type::new(self.name.clone(), false)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A named, typed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Where a resolved variable lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarOrigin {
    Local,
    /// Zero-based position in the parameter list
    Parameter(usize),
    Field,
}

/// Signature and local declarations of one method.
#[derive(Debug, Clone, Default)]
pub struct MethodSignature {
    pub return_type: Option<Type>,
    pub parameters: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    /// Modifier keywords as written (`public`, `static`, ...)
    pub modifiers: Vec<String>,
}

impl MethodSignature {
    pub fn is_static(&self) -> bool {
        self.modifiers.iter().any(|m| m == "static")
    }

    pub fn is_private(&self) -> bool {
        self.modifiers.iter().any(|m| m == "private")
    }
}

/// Global metadata of the compiled class.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    imports: Vec<String>,
    class_name: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Symbol>,
    methods: Vec<String>,
    signatures: FxHashMap<String, MethodSignature>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Dotted import paths in declaration order.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Imports rendered as `import a.b;` lines.
    pub fn import_statements(&self) -> Vec<String> {
        self.imports
            .iter()
            .map(|path| format!("import {};", path))
            .collect()
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Declared superclass; `None` means the root object type.
    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }

    pub fn signature(&self, method: &str) -> Option<&MethodSignature> {
        self.signatures.get(method)
    }

    /// Whether a method runs without `this`. `main` is always static.
    pub fn is_static_method(&self, method: &str) -> bool {
        method == "main" || self.signature(method).is_some_and(|s| s.is_static())
    }

    pub fn parameters(&self, method: &str) -> &[Symbol] {
        self.signatures
            .get(method)
            .map(|s| s.parameters.as_slice())
            .unwrap_or(&[])
    }

    pub fn locals(&self, method: &str) -> &[Symbol] {
        self.signatures
            .get(method)
            .map(|s| s.locals.as_slice())
            .unwrap_or(&[])
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.signatures
            .get(method)
            .and_then(|s| s.return_type.as_ref())
    }

    /// Whether `name` is made available by an import, either as the whole
    /// path or as its last segment (`import java.io.File;` makes `File`).
    pub fn is_imported(&self, name: &str) -> bool {
        self.imports
            .iter()
            .any(|path| path == name || path.rsplit('.').next() == Some(name))
    }

    /// Full dotted path under which `name` was imported.
    pub fn import_path(&self, name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|path| *path == name || path.rsplit('.').next() == Some(name))
            .map(|path| path.as_str())
    }

    /// Resolve a variable inside `method`: locals first, then parameters,
    /// then fields.
    pub fn lookup(&self, method: &str, name: &str) -> Option<(&Symbol, VarOrigin)> {
        if let Some(local) = self.locals(method).iter().find(|s| s.name == name) {
            return Some((local, VarOrigin::Local));
        }
        if let Some((index, param)) = self
            .parameters(method)
            .iter()
            .enumerate()
            .find(|(_, s)| s.name == name)
        {
            return Some((param, VarOrigin::Parameter(index)));
        }
        self.field(name).map(|f| (f, VarOrigin::Field))
    }

    // ========================================================================
    // Mutation (used by the binder only)
    // ========================================================================

    pub(crate) fn add_import(&mut self, path: String) {
        if !self.imports.contains(&path) {
            self.imports.push(path);
        }
    }

    pub(crate) fn set_class_name(&mut self, name: impl Into<String>) {
        self.class_name = name.into();
    }

    pub(crate) fn set_super_class(&mut self, name: impl Into<String>) {
        self.super_class = Some(name.into());
    }

    pub(crate) fn add_interface(&mut self, name: impl Into<String>) {
        self.interfaces.push(name.into());
    }

    pub(crate) fn add_field(&mut self, symbol: Symbol) {
        self.fields.push(symbol);
    }

    /// Register a method. A later declaration with the same name replaces
    /// the earlier signature; the name stays listed once.
    pub(crate) fn add_method(&mut self, name: &str, return_type: Type, modifiers: Vec<String>) {
        if !self.methods.iter().any(|m| m == name) {
            self.methods.push(name.to_string());
        }
        self.signatures.insert(
            name.to_string(),
            MethodSignature {
                return_type: Some(return_type),
                parameters: Vec::new(),
                locals: Vec::new(),
                modifiers,
            },
        );
    }

    pub(crate) fn add_parameter(&mut self, method: &str, symbol: Symbol) {
        self.signatures
            .entry(method.to_string())
            .or_default()
            .parameters
            .push(symbol);
    }

    pub(crate) fn add_local(&mut self, method: &str, symbol: Symbol) {
        self.signatures
            .entry(method.to_string())
            .or_default()
            .locals
            .push(symbol);
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {}", import)?;
        }
        match &self.super_class {
            Some(sup) => writeln!(f, "class {} extends {}", self.class_name, sup)?,
            None => writeln!(f, "class {}", self.class_name)?,
        }
        for field in &self.fields {
            writeln!(f, "  field {}: {}", field.name, field.ty)?;
        }
        for method in &self.methods {
            let Some(sig) = self.signatures.get(method) else {
                continue;
            };
            let params: Vec<String> = sig
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ty))
                .collect();
            let ret = sig
                .return_type
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "void".to_string());
            writeln!(f, "  method {}({}): {}", method, params.join(", "), ret)?;
            for local in &sig.locals {
                writeln!(f, "    local {}: {}", local.name, local.ty)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SymbolTable {
        let mut table = SymbolTable::new();
        table.set_class_name("A");
        table.add_import("java.io.File".to_string());
        table.add_field(Symbol::new("x", Type::int()));
        table.add_method("f", Type::boolean(), vec!["public".to_string()]);
        table.add_parameter("f", Symbol::new("x", Type::boolean()));
        table.add_local("f", Symbol::new("y", Type::int_array()));
        table
    }

    #[test]
    fn test_lookup_precedence() {
        let table = table();
        let (sym, origin) = table.lookup("f", "x").unwrap();
        assert_eq!(origin, VarOrigin::Parameter(0));
        assert_eq!(sym.ty, Type::boolean());
        assert_eq!(table.lookup("f", "y").unwrap().1, VarOrigin::Local);
        assert_eq!(table.lookup("g", "x").unwrap().1, VarOrigin::Field);
        assert!(table.lookup("f", "z").is_none());
    }

    #[test]
    fn test_imports() {
        let mut table = table();
        table.add_import("java.io.File".to_string());
        assert_eq!(table.imports().len(), 1);
        assert!(table.is_imported("File"));
        assert!(table.is_imported("java.io.File"));
        assert!(!table.is_imported("io"));
        assert_eq!(table.import_statements(), vec!["import java.io.File;"]);
    }

    #[test]
    fn test_type_display() {
        assert_eq!(Type::int_array().to_string(), "int[]");
        assert_eq!(Type::class("Foo").to_string(), "Foo");
        assert!(Type::int().is_primitive());
        assert!(!Type::int_array().is_primitive());
    }

    #[test]
    fn test_redeclared_method_keeps_single_entry() {
        let mut table = table();
        table.add_method("f", Type::int(), vec![]);
        assert_eq!(table.methods(), &["f".to_string()]);
        assert_eq!(table.return_type("f"), Some(&Type::int()));
        assert!(table.parameters("f").is_empty());
    }

    #[test]
    fn test_main_is_always_static() {
        let mut table = table();
        table.add_method("main", Type::void(), vec!["public".to_string()]);
        table.add_method("s", Type::void(), vec!["static".to_string()]);
        assert!(table.is_static_method("main"));
        assert!(table.is_static_method("s"));
        assert!(!table.is_static_method("f"));
    }
}
