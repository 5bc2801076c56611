//! Fluent builder for constructing diagnostics.

use super::{Diagnostic, DiagnosticCode, Level};
use crate::Span;

/// A rendered source line with a caret underline, attached to a diagnostic
/// for display purposes.
#[derive(Clone, Debug)]
pub struct SourceSnippet {
    pub line: String,
    pub line_number: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl SourceSnippet {
    pub fn new(line: impl Into<String>, line_number: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            line: line.into(),
            line_number,
            start_column,
            end_column,
        }
    }

    pub fn format(&self) -> String {
        let width = self.line_number.to_string().len().max(3);
        let mut out = format!("{:>width$} | {}\n", self.line_number, self.line, width = width);
        out.push_str(&format!("{:>width$} | ", "", width = width));
        out.push_str(&" ".repeat(self.start_column.saturating_sub(1)));
        out.push_str(&"^".repeat((self.end_column - self.start_column).max(1)));
        out
    }
}

/// Fluent builder for [`Diagnostic`].
///
/// # Examples
///
/// ```
/// use pl0c_util::diagnostic::{DiagnosticBuilder, DiagnosticCode};
/// use pl0c_util::span::Span;
///
/// let diag = DiagnosticBuilder::error("unexpected token '%'")
///     .code(DiagnosticCode::E_UNEXPECTED_TOKEN)
///     .span(Span::DUMMY)
///     .help("remove the stray character")
///     .build();
/// assert_eq!(diag.helps.len(), 1);
/// ```
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    code: Option<DiagnosticCode>,
    notes: Vec<String>,
    helps: Vec<String>,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: Span::DUMMY,
            code: None,
            notes: Vec::new(),
            helps: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.helps.push(help.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            code: self.code,
            notes: self.notes,
            helps: self.helps,
        }
    }

    pub fn emit(self, handler: &super::Handler) {
        handler.emit(self.build());
    }
}
