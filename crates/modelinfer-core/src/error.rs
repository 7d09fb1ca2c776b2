//! Error types for the modelinfer-core library.

use modelinfer_runtime::RuntimeError;
use thiserror::Error;

/// Failures of an [`InferenceSession`](crate::InferenceSession) call.
///
/// Every variant aborts the current call; nothing is retried internally and
/// no partial output is returned.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Model path is empty, missing or unreadable, image dimensions are out
    /// of range, or the session has no runtime yet.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The runtime failed to load the model.
    #[error("failed to initialize the model runtime: {0}")]
    RuntimeInitFailure(#[source] RuntimeError),

    /// The runtime could not create output tensors for the input.
    #[error("failed to create output tensors: {0}")]
    TensorCreationFailure(#[source] RuntimeError),

    /// The runtime failed while executing the model.
    #[error("model execution failed: {0}")]
    InferenceExecutionFailure(#[source] RuntimeError),

    /// Total output element count is outside `1..OUTPUT_ELEMENT_LIMIT`.
    #[error("output element count {count} is out of range 1~{limit}", limit = crate::OUTPUT_ELEMENT_LIMIT)]
    OutputSizeOutOfRange { count: usize },

    /// Output bytes could not be copied into the result buffer.
    #[error("failed to copy inference output: {0}")]
    OutputCopyFailure(String),

    /// The result buffer could not be allocated.
    #[error("failed to allocate output buffer: {0}")]
    AllocationFailure(String),

    /// The operation exists in the interface but has no implementation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Result type for the modelinfer-core library.
pub type Result<T> = std::result::Result<T, SessionError>;
