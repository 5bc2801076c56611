//! Failure modes for IR generation and the `llc`/linker pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    /// Assignment target, expression identifier, or `read` target that
    /// cannot be resolved in any scope, or that resolves to a constant in
    /// a write position.
    #[error("variable '{0}' is not defined")]
    VariableUndefined(String),

    /// `call` of a procedure with no matching global function.
    #[error("function '{0}' is not defined")]
    FunctionUndefined(String),

    /// An inkwell builder call returned `Err`.
    #[error("LLVM operation failed: {0}")]
    LlvmOperationFailed(String),

    /// The module failed `Module::verify` after emission.
    #[error("LLVM IR verification failed: {0}")]
    VerificationFailed(String),

    /// `llc` exited non-zero.
    #[error("llc failed with status {status}: {stderr}")]
    LlcFailed { status: String, stderr: String },

    /// The system C compiler (linker driver) exited non-zero.
    #[error("linker failed with status {status}: {stderr}")]
    LinkFailed { status: String, stderr: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
