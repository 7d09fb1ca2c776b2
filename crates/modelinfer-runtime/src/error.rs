//! Error types for the runtime layer.

use thiserror::Error;

/// Errors reported by a model runtime.
///
/// Any `Err` returned from a [`ModelRuntime`](crate::ModelRuntime) call is a
/// non-success status; there is no partial success.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Failed to load the model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The runtime was used before a model was loaded.
    #[error("no model loaded")]
    NotLoaded,

    /// Invalid input tensor count, size or layout.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Output tensors could not be created for the given inputs.
    #[error("failed to create output tensors: {0}")]
    TensorCreate(String),

    /// Model execution failed.
    #[error("process failed: {0}")]
    Process(String),

    /// Output tensor extraction failed.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// I/O error when loading model files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
