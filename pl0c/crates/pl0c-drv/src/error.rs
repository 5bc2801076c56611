//! Driver-level error unification.
//!
//! Each stage crate (`pl0c-par`, `pl0c-gen`) has its own typed error; the
//! driver only needs to report them to the user and pick an exit code
//! (spec.md §7), so it collapses them into one enum via `thiserror`'s
//! `#[from]` rather than threading `anyhow::Error` through the pipeline.

use pl0c_gen::CodeGenError;
use pl0c_par::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not read '{path}': {source}")]
    ReadSource { path: String, source: std::io::Error },

    #[error(transparent)]
    Parse(#[from] TokenError),

    #[error(transparent)]
    CodeGen(#[from] CodeGenError),
}

impl DriverError {
    /// spec.md §7's process exit code contract: parse errors and codegen
    /// errors are distinguished from each other and from I/O failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::ReadSource { .. } => 1,
            DriverError::Parse(_) => 2,
            DriverError::CodeGen(_) => 3,
        }
    }
}
