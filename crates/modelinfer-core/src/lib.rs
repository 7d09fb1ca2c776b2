//! modelinfer-core - run a precompiled model over raw input buffers.
//!
//! An [`InferenceSession`] validates a model path, owns the model runtime
//! handle and turns runtime output tensors into one flat `f32` buffer
//! owned by the caller.
//!
//! ```no_run
//! use modelinfer_core::TractSession;
//!
//! let mut session = TractSession::new();
//! session.initialize("model.onnx")?;
//! let output = session.infer_from_buffer(&[0u8; 16])?;
//! println!("{} values", output.len());
//! # Ok::<(), modelinfer_core::SessionError>(())
//! ```

pub mod config;
pub mod error;
pub mod image;
pub mod output;
pub mod path;
pub mod session;

pub use config::{ImageConfig, RuntimeOptions, SessionConfig};
pub use error::{Result, SessionError};
pub use image::{ImageDimensions, ImageType};
pub use output::InferenceOutput;
pub use path::verify_model_path;
pub use session::{InferenceSession, SessionState};

pub use modelinfer_runtime as runtime;

/// Exclusive upper bound on output elements (512 MiB of `f32`).
pub const OUTPUT_ELEMENT_LIMIT: usize = 134_217_728;

/// Session backed by the tract runtime.
#[cfg(feature = "tract")]
pub type TractSession = InferenceSession<modelinfer_runtime::TractRuntime>;

/// Session backed by ONNX Runtime.
#[cfg(feature = "ort")]
pub type OrtSession = InferenceSession<modelinfer_runtime::OrtRuntime>;
