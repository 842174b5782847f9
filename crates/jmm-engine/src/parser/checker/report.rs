//! Reports: the single diagnostic record shared by every stage.

use crate::parser::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Compiler stage that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Semantic,
    Lower,
    Emit,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "parse"),
            Stage::Semantic => write!(f, "semantic"),
            Stage::Lower => write!(f, "lower"),
            Stage::Emit => write!(f, "emit"),
        }
    }
}

/// A located diagnostic. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Report {
    pub severity: Severity,
    pub stage: Stage,
    /// 1-based line, 0 when unknown
    pub line: u32,
    /// 1-based column, 0 when unknown
    pub col: u32,
    pub message: String,
}

impl Report {
    pub fn new(
        severity: Severity,
        stage: Stage,
        line: u32,
        col: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            stage,
            line,
            col,
            message: message.into(),
        }
    }

    pub fn error(stage: Stage, line: u32, col: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, stage, line, col, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}:{}: {}",
            self.severity, self.stage, self.line, self.col, self.message
        )
    }
}

impl From<&ParseError> for Report {
    fn from(error: &ParseError) -> Self {
        Report::error(Stage::Parse, error.span.line, error.span.column, &error.message)
    }
}

/// Drop repeated reports, keeping the first occurrence of each.
pub fn dedup_reports(reports: Vec<Report>) -> Vec<Report> {
    let mut unique: Vec<Report> = Vec::with_capacity(reports.len());
    for report in reports {
        if !unique.contains(&report) {
            unique.push(report);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_order() {
        let a = Report::error(Stage::Semantic, 1, 2, "a");
        let b = Report::error(Stage::Semantic, 3, 4, "b");
        let reports = dedup_reports(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(reports, vec![a, b]);
    }

    #[test]
    fn test_reports_at_different_positions_are_distinct() {
        let a = Report::error(Stage::Semantic, 1, 2, "same");
        let b = Report::error(Stage::Semantic, 1, 3, "same");
        assert_eq!(dedup_reports(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_display() {
        let report = Report::error(Stage::Semantic, 4, 9, "Method m is not declared.");
        assert_eq!(
            report.to_string(),
            "error [semantic] 4:9: Method m is not declared."
        );
    }

    #[test]
    fn test_json_form() {
        let report = Report::new(Severity::Warning, Stage::Emit, 0, 0, "w");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"stage\":\"emit\""));
    }
}
