//! Diagnostic reporting infrastructure shared by every compiler phase.

mod builder;

pub use builder::{DiagnosticBuilder, SourceSnippet};

use crate::Span;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Warning,
    Note,
    Help,
}

impl Level {
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Level::Error)
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
            Level::Help => "help",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A unique code identifying a class of diagnostic, e.g. `E0001`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    pub prefix: &'static str,
    pub number: u32,
}

impl DiagnosticCode {
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    pub fn as_str(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }

    /// Lexer found a character it could not turn into a token.
    pub const E_UNEXPECTED_TOKEN: Self = Self::new("E", 1);
    /// Parser expected a different token.
    pub const E_EXPECTED_TOKEN: Self = Self::new("E", 2);
    /// Identifier used as a variable is not defined in any reachable scope.
    pub const E_VARIABLE_UNDEFINED: Self = Self::new("E", 3);
    /// `call` target is not a declared procedure.
    pub const E_FUNCTION_UNDEFINED: Self = Self::new("E", 4);
    /// The generated module failed LLVM's verifier.
    pub const E_VERIFICATION_FAILED: Self = Self::new("E", 5);
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single diagnostic message with severity and source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub code: Option<DiagnosticCode>,
    pub notes: Vec<String>,
    pub helps: Vec<String>,
}

/// Collects diagnostics emitted over the course of a compilation.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn build_error(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::error(message).span(span)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level.is_error())
            .count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_tracks_error_count() {
        let handler = Handler::new();
        DiagnosticBuilder::error("bad token").span(Span::DUMMY).emit(&handler);
        DiagnosticBuilder::warning("unused").span(Span::DUMMY).emit(&handler);
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.diagnostics().len(), 2);
    }

    #[test]
    fn build_error_is_prefilled_with_the_given_span() {
        let handler = Handler::new();
        handler
            .build_error(Span::DUMMY, "unexpected token")
            .code(DiagnosticCode::E_UNEXPECTED_TOKEN)
            .emit(&handler);
        let diagnostics = handler.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span, Span::DUMMY);
        assert_eq!(diagnostics[0].code, Some(DiagnosticCode::E_UNEXPECTED_TOKEN));
    }

    #[test]
    fn diagnostic_code_formats_with_padding() {
        assert_eq!(DiagnosticCode::E_VARIABLE_UNDEFINED.as_str(), "E0003");
    }
}
