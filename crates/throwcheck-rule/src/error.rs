//! Diagnostics produced by the rule.
//!
//! A finding is a rich diagnostic with a source location, a message, and
//! optional labels and hints, rendered against a [`SourceMap`].
//!
//! # Design
//!
//! - `CompileError`: single diagnostic with primary and optional secondary spans
//! - `ErrorKind`: stable category key for filtering and suppression
//! - `Severity`: error, warning, or note (configurable per run)
//! - `DiagnosticFormatter`: formats diagnostics with source snippets
//!
//! # Examples
//!
//! ```
//! # use throwcheck_rule::error::*;
//! # use throwcheck_ast::Span;
//! # let span = Span::new(0, 0, 3, 1);
//! let error = CompileError::new(
//!     ErrorKind::UnhandledFailure,
//!     span,
//!     "'f' may throw FormatException".to_string(),
//! );
//! assert_eq!(error.kind.code(), "unhandled_throws");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use throwcheck_ast::{SourceMap, Span};

/// Diagnostic with source location and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileError {
    /// Category of this diagnostic
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Primary source location
    pub span: Span,
    /// Primary message
    pub message: String,
    /// Additional labeled spans
    pub labels: Vec<Label>,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Call to a declaration with declared failures that nothing handles
    UnhandledFailure,
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note (not an error)
    Note,
    /// Warning (code is valid but suspicious)
    Warning,
    /// Error (the host should fail the build)
    Error,
}

/// Secondary labeled span in a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    /// Source location
    pub span: Span,
    /// Label text
    pub message: String,
}

impl CompileError {
    /// Creates a new error diagnostic.
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, span, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, span, message)
    }

    /// Constructor with explicit severity.
    pub fn with_severity(kind: ErrorKind, severity: Severity, span: Span, message: String) -> Self {
        Self {
            kind,
            severity,
            span,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Adds a secondary labeled span.
    pub fn with_label(mut self, span: Span, message: String) -> Self {
        self.labels.push(Label { span, message });
        self
    }

    /// Adds a note or hint.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl ErrorKind {
    /// Stable category key hosts use to enable, disable or suppress the rule.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnhandledFailure => "unhandled_throws",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}",
            self.severity,
            self.kind.code(),
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Formats diagnostics with source code context.
///
/// Produces messages with the file location, the offending source line, a
/// caret underline, secondary labels and help notes.
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Formats a diagnostic as a string with source context.
    pub fn format(&self, error: &CompileError) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}[{}]: {}\n",
            error.severity,
            error.kind.code(),
            error.message
        ));

        let (line, col) = self.sources.line_col(&error.span);
        let path = self
            .sources
            .file_path(&error.span)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        output.push_str(&format!("  --> {}:{}:{}\n", path, line, col));

        if let Some(source_line) = self.sources.file(&error.span).and_then(|f| f.line_text(line)) {
            output.push_str("   |\n");
            output.push_str(&format!("{:3} | {}\n", line, source_line));

            let start_col = col as usize;
            let span_len = error.span.len() as usize;
            let end_col = (start_col + span_len).min(source_line.len() + 1);
            let underline = " ".repeat(start_col.saturating_sub(1))
                + &"^".repeat(end_col.saturating_sub(start_col).max(1));
            output.push_str(&format!("   | {}\n", underline));
        }

        for label in &error.labels {
            output.push_str(&format!("   = note: {}\n", label.message));

            let (label_line, label_col) = self.sources.line_col(&label.span);
            if let Some(label_path) = self.sources.file_path(&label.span) {
                output.push_str(&format!(
                    "     at {}:{}:{}\n",
                    label_path.display(),
                    label_line,
                    label_col
                ));
            }
        }

        for note in &error.notes {
            output.push_str(&format!("   = help: {}\n", note));
        }

        output
    }

    /// Formats multiple diagnostics separated by blank lines.
    pub fn format_all(&self, errors: &[CompileError]) -> String {
        errors
            .iter()
            .map(|e| self.format(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
