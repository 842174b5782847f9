//! Diagnostic rendering for reports
//!
//! Turns [`Report`]s into codespan-reporting diagnostics with source
//! context, and offers a JSON form for tooling.

use super::report::{Report, Severity as ReportSeverity, Stage};
use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// Error code assigned to reports of each stage.
pub fn error_code(stage: Stage) -> ErrorCode {
    match stage {
        Stage::Parse => ErrorCode("E1001"),
        Stage::Semantic => ErrorCode("E2001"),
        Stage::Lower => ErrorCode("E3001"),
        Stage::Emit => ErrorCode("E4001"),
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    /// The underlying codespan diagnostic
    inner: CsDiagnostic<usize>,
    /// Error code (e.g., "E2001")
    code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.inner = self.inner.with_code(code.0);
        self.code = Some(code);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(
        mut self,
        file_id: usize,
        range: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::primary(file_id, range).with_message(message);
        self.inner.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Create a diagnostic from a report, locating it in `files`.
    pub fn from_report(report: &Report, file_id: usize, files: &SimpleFiles<String, String>) -> Self {
        let mut diag = match report.severity {
            ReportSeverity::Error => Diagnostic::error(&report.message),
            ReportSeverity::Warning => Diagnostic::warning(&report.message),
        }
        .with_code(error_code(report.stage));

        match byte_range(files, file_id, report.line, report.col) {
            Some(range) => {
                diag = diag.with_primary_label(file_id, range, format!("{} error", report.stage));
            }
            None if report.line > 0 => {
                diag = diag.with_note(format!("at {}:{}", report.line, report.col));
            }
            None => {}
        }
        diag
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Emit the diagnostic to stderr.
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        self.emit_to(&mut writer, files)
    }

    /// Emit the diagnostic to any color-capable writer.
    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.inner)
    }

    /// Convert to JSON representation for tooling.
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// Byte range of the character at a 1-based line and column.
fn byte_range(
    files: &SimpleFiles<String, String>,
    file_id: usize,
    line: u32,
    col: u32,
) -> Option<Range<usize>> {
    if line == 0 || col == 0 {
        return None;
    }
    let file = files.get(file_id).ok()?;
    let line_range = files.line_range(file_id, line as usize - 1).ok()?;
    let text = &file.source()[line_range.clone()];
    let mut chars = text.char_indices().skip(col as usize - 1);
    let (offset, ch) = chars.next()?;
    let start = line_range.start + offset;
    let end = if ch == '\n' { start } else { start + ch.len_utf8() };
    Some(start..end)
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    pub message: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let location = files.location(label.file_id, label.range.start).ok()?;
                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: location.line_number,
                    start_column: location.column_number,
                    message: label.message.clone(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}
