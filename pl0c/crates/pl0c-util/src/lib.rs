//! Shared infrastructure for the `pl0c` compiler: interned symbols, source
//! spans and diagnostic reporting.
//!
//! Every other `pl0c-*` crate depends on this one; it carries no knowledge
//! of lexing, parsing or code generation itself.

pub mod diagnostic;
pub mod error;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use span::{FileId, SourceMap, Span};
pub use symbol::Symbol;
