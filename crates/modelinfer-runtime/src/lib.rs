//! Model runtime abstraction layer for modelinfer.
//!
//! This crate defines the capability interface a session drives
//! ([`ModelRuntime`]) along with its tensor and context types, plus adapters
//! for concrete engines:
//! - `tract` for pure-Rust ONNX inference (default)
//! - `ort` with the XNNPACK execution provider for native platforms

mod backend;
mod context;
mod error;
mod tensor;

pub use backend::ModelRuntime;
pub use context::{ExecutionContext, RuntimeConfig};
pub use error::RuntimeError;
pub use tensor::{AiTensor, F32_SIZE, InputTensor, OutputTensor};

#[cfg(feature = "ort")]
pub use backend::ort::OrtRuntime;

#[cfg(feature = "tract")]
pub use backend::tract::TractRuntime;

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
