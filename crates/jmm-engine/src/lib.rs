//! Java-- Compiler Engine
//!
//! This crate provides the complete Java-- compiler:
//! - **Parser**: Lexer, parser, symbol table and semantic analysis (`parser` module)
//! - **Compiler**: IR lowering, IR parsing and Jasmin generation (`compiler` module)
//! - **Pipeline**: The stage driver (`pipeline` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use jmm_engine::pipeline;
//!
//! let output = pipeline::compile("class A { int f() { return 42; } }")?;
//! println!("{}", output.jasmin);
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Parser module: Lexer, parser, AST and checker
pub mod parser;

/// Compiler module: IR lowering, IR model and code generation
pub mod compiler;

/// Compiler settings
pub mod config;

/// Stage orchestration
pub mod pipeline;

// ============================================================================
// Re-exports
// ============================================================================

pub use parser::{
    // AST
    ast, Ast, NodeKind, NodeRef,
    // Lexer and parser
    Lexer, ParseError, Parser, Span, Token,
    // Front end entry point
    parse_source,
};

pub use parser::checker::{
    analyze, build_symbol_table, CheckResult, Diagnostic, Report, Severity, Stage, SymbolTable,
    Type,
};

pub use compiler::{
    assemble, generate, generate_ir, ir, ClassUnit, CompileError, CompileResult,
    JasminGenerator,
};

pub use config::CompilerConfig;
pub use pipeline::{CompilationOutput, Pipeline};
