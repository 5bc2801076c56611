//! Shared error types used by more than one compiler phase.

use thiserror::Error;

/// Failure modes for interacting with the source map.
#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("file not found: {0}")]
    FileNotFound(String),
}
