//! Java-- semantic front end
//!
//! This module provides:
//! - The symbol table of the compiled class
//! - Name binding (AST → symbol table)
//! - Type checking and name-resolution diagnostics
//! - Reports and their codespan rendering

pub mod binder;
pub mod checker;
pub mod diagnostic;
pub mod report;
pub mod symbols;

pub use binder::{build_symbol_table, Binder};
pub use checker::{analyze, CheckResult, ExprType, TypeChecker};
pub use diagnostic::{create_files, Diagnostic, ErrorCode, JsonDiagnostic};
pub use report::{dedup_reports, Report, Severity, Stage};
pub use symbols::{MethodSignature, Symbol, SymbolTable, Type, VarOrigin};

pub use codespan_reporting::files::SimpleFiles;
