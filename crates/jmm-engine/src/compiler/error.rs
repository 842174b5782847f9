//! Compilation errors

use crate::parser::checker::{Report, Stage};
use std::path::PathBuf;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} parse error(s)", reports.len())]
    Parse { reports: Vec<Report> },

    #[error("{} semantic error(s)", reports.len())]
    Semantic { reports: Vec<Report> },

    #[error("Malformed IR at line {line}: {message}")]
    IrSyntax { line: u32, message: String },

    #[error("Invalid IR in method {method}: {message}")]
    IrStructure { method: String, message: String },

    #[error("Invalid value '{value}' for configuration key '{key}'")]
    Config { key: String, value: String },

    #[error("Failed to parse configuration file {}: {message}", path.display())]
    ConfigFile { path: PathBuf, message: String },
}

impl CompileError {
    pub fn ir_syntax(line: u32, message: impl Into<String>) -> Self {
        CompileError::IrSyntax {
            line,
            message: message.into(),
        }
    }

    pub fn ir_structure(method: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::IrStructure {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Reports describing this error, for rendering as diagnostics.
    ///
    /// Source-level errors carry their own reports; IR errors become a
    /// single report of the stage that produced them.
    pub fn reports(&self) -> Vec<Report> {
        match self {
            CompileError::Parse { reports } | CompileError::Semantic { reports } => {
                reports.clone()
            }
            CompileError::IrSyntax { line, message } => {
                vec![Report::error(Stage::Lower, *line, 0, message)]
            }
            CompileError::IrStructure { method, message } => vec![Report::error(
                Stage::Emit,
                0,
                0,
                format!("{} (in method {})", message, method),
            )],
            CompileError::Io(_) | CompileError::Config { .. } | CompileError::ConfigFile { .. } => {
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ir_errors_become_reports() {
        let err = CompileError::ir_syntax(3, "expected ';'");
        let reports = err.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].stage, Stage::Lower);
        assert_eq!(reports[0].line, 3);

        let err = CompileError::ir_structure("main", "undefined label 'L'");
        assert_eq!(err.reports()[0].stage, Stage::Emit);
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn test_semantic_error_message() {
        let err = CompileError::Semantic {
            reports: vec![Report::error(Stage::Semantic, 1, 1, "x")],
        };
        assert_eq!(err.to_string(), "1 semantic error(s)");
    }
}
