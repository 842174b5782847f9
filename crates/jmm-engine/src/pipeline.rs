//! Compilation pipeline
//!
//! Source text goes through every stage in order, stopping at the first
//! stage that reports errors:
//!
//! ```text
//! parse → bind → analyze → lower → IR parse → prepare → codegen
//! ```

use crate::compiler::{self, CompileError, CompileResult};
use crate::config::CompilerConfig;
use crate::parser::ast::Ast;
use crate::parser::checker::{analyze, build_symbol_table, Report, SymbolTable};
use crate::parser::parse_source;
use std::path::Path;

/// Everything produced by a successful compilation
#[derive(Debug)]
pub struct CompilationOutput {
    pub ast: Ast,
    pub symbol_table: SymbolTable,
    /// Non-fatal reports from semantic analysis
    pub reports: Vec<Report>,
    /// Generated IR text
    pub ir: String,
    /// Generated Jasmin assembly
    pub jasmin: String,
}

/// Compiler driver
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: CompilerConfig,
}

impl Pipeline {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile the configured input file.
    pub fn run(&self) -> CompileResult<CompilationOutput> {
        match &self.config.input_file {
            Some(path) => self.compile_file(path),
            None => Err(CompileError::Config {
                key: crate::config::INPUT_FILE.to_string(),
                value: String::new(),
            }),
        }
    }

    pub fn compile_file(&self, path: impl AsRef<Path>) -> CompileResult<CompilationOutput> {
        let path = path.as_ref();
        log::debug!("reading {}", path.display());
        let source = std::fs::read_to_string(path)?;
        self.compile(&source)
    }

    /// Run every stage over a source text.
    pub fn compile(&self, source: &str) -> CompileResult<CompilationOutput> {
        let ast = parse(source)?;
        if self.config.debug {
            log::debug!("AST:\n{}", ast.to_tree_string());
        }

        let (symbol_table, reports) = check(&ast)?;
        if self.config.debug {
            log::debug!("symbol table:\n{}", symbol_table);
        }

        let ir = compiler::generate_ir(&ast, &symbol_table);
        if self.config.debug {
            log::debug!("IR:\n{}", ir);
        }

        let jasmin = compiler::assemble(&ir)?;
        log::debug!("compiled class '{}'", symbol_table.class_name());

        Ok(CompilationOutput {
            ast,
            symbol_table,
            reports,
            ir,
            jasmin,
        })
    }
}

/// Parse a source text, converting parse errors to reports.
pub fn parse(source: &str) -> CompileResult<Ast> {
    match parse_source(source) {
        Ok(ast) => {
            log::debug!("parsed {} AST nodes", ast.len());
            Ok(ast)
        }
        Err(errors) => {
            log::debug!("{} parse error(s)", errors.len());
            Err(CompileError::Parse {
                reports: errors.iter().map(Report::from).collect(),
            })
        }
    }
}

/// Build the symbol table and run semantic analysis. On success, returns
/// the table with any non-fatal reports.
pub fn check(ast: &Ast) -> CompileResult<(SymbolTable, Vec<Report>)> {
    let table = build_symbol_table(ast);
    log::debug!(
        "symbol table built for class '{}': {} field(s), {} method(s)",
        table.class_name(),
        table.fields().len(),
        table.methods().len()
    );

    let result = analyze(ast, table);
    log::debug!("semantic analysis found {} report(s)", result.reports.len());
    if result.has_errors() {
        return Err(CompileError::Semantic {
            reports: result.reports,
        });
    }
    Ok((result.symbol_table, result.reports))
}

/// Compile a source text with the default configuration.
pub fn compile(source: &str) -> CompileResult<CompilationOutput> {
    Pipeline::default().compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_minimal_class() {
        let output = compile("class A { int f() { return 42; } }").unwrap();
        assert_eq!(output.symbol_table.class_name(), "A");
        assert!(output.ir.contains("ret.i32 42.i32;"));
        assert!(output.jasmin.contains("bipush 42"));
    }

    #[test]
    fn test_parse_errors_stop_the_pipeline() {
        let err = compile("class A { int f( { } }").unwrap_err();
        match err {
            CompileError::Parse { reports } => assert!(!reports.is_empty()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_semantic_errors_stop_the_pipeline() {
        let err = compile("class A { void f() { int x; boolean y; x = y; } }").unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }

    #[test]
    fn test_run_without_input_file() {
        let err = Pipeline::default().run().unwrap_err();
        assert!(matches!(err, CompileError::Config { ref key, .. } if key == "inputFile"));
    }
}
