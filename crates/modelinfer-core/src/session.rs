//! Inference session driving a model runtime.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use modelinfer_runtime::{AiTensor, ExecutionContext, F32_SIZE, InputTensor, ModelRuntime};

use crate::config::{RuntimeOptions, SessionConfig};
use crate::error::{Result, SessionError};
use crate::image::{ImageDimensions, ImageType};
use crate::output::InferenceOutput;
use crate::path::verify_model_path;
use crate::OUTPUT_ELEMENT_LIMIT;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No successful initialization yet, or the last one failed.
    Uninitialized,
    /// Path and image dimensions validated; no model loaded for this path.
    Configured,
    /// The runtime has loaded the model; buffer inference is available.
    Loaded,
}

type RuntimeFactory<R> = Box<dyn Fn() -> R + Send>;

/// Session bound to one model, owning its runtime handle.
///
/// The runtime is created lazily on the first buffer-oriented
/// initialization and reused afterwards; it is dropped with the session.
/// All calls take `&mut self`; share a session across threads only behind a
/// lock.
pub struct InferenceSession<R: ModelRuntime> {
    factory: RuntimeFactory<R>,
    runtime: Option<R>,
    options: RuntimeOptions,
    model_path: PathBuf,
    image: Option<ImageDimensions>,
    state: SessionState,
}

impl<R: ModelRuntime + Default + 'static> InferenceSession<R> {
    /// Create a session whose runtime is built with `R::default()`.
    pub fn new() -> Self {
        Self::with_factory(R::default)
    }

    /// Create and initialize a session from a configuration file's contents.
    ///
    /// Sessions with image dimensions use the image-oriented initialization
    /// and do not load the model.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let mut session = Self::new().with_options(config.runtime.clone());
        match config.image {
            Some(image) => session.initialize_with_image(&config.model_path, image.width, image.height)?,
            None => session.initialize(&config.model_path)?,
        }
        Ok(session)
    }
}

impl<R: ModelRuntime + Default + 'static> Default for InferenceSession<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ModelRuntime> InferenceSession<R> {
    /// Create a session that builds its runtime with `factory` when first needed.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> R + Send + 'static,
    {
        Self {
            factory: Box::new(factory),
            runtime: None,
            options: RuntimeOptions::default(),
            model_path: PathBuf::new(),
            image: None,
            state: SessionState::Uninitialized,
        }
    }

    /// Set the options forwarded to the runtime on initialization.
    pub fn with_options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate `model_path` and load it into the runtime.
    ///
    /// Calling this again re-validates and reloads; the runtime handle
    /// itself is reused.
    pub fn initialize(&mut self, model_path: impl AsRef<Path>) -> Result<()> {
        let model_path = model_path.as_ref();
        info!("start initialize inference session");

        self.verify(model_path)?;

        self.state = SessionState::Uninitialized;
        self.model_path = model_path.to_path_buf();
        self.image = None;

        let config = self.options.runtime_config(model_path);
        let runtime = self.runtime.get_or_insert_with(|| {
            debug!("creating model runtime");
            (self.factory)()
        });

        runtime.init(&config).map_err(|e| {
            error!("failed to initialize model {}: {}", model_path.display(), e);
            SessionError::RuntimeInitFailure(e)
        })?;

        self.state = SessionState::Loaded;
        info!("end initialize inference session, model: {}", model_path.display());
        Ok(())
    }

    /// Validate `model_path` and image dimensions for an image-oriented session.
    ///
    /// Width and height must each lie in `1..=4096`. The runtime is not
    /// touched.
    pub fn initialize_with_image(
        &mut self,
        model_path: impl AsRef<Path>,
        width: i32,
        height: i32,
    ) -> Result<()> {
        let model_path = model_path.as_ref();

        self.verify(model_path)?;
        let dims = ImageDimensions::new(width, height).inspect_err(|e| error!("{}", e))?;

        self.model_path = model_path.to_path_buf();
        self.image = Some(dims);
        self.state = SessionState::Configured;
        info!(
            "image session configured, model: {}, size: {}x{}",
            model_path.display(),
            dims.width(),
            dims.height()
        );
        Ok(())
    }

    /// Run one inference over `input` and return the concatenated outputs.
    ///
    /// The input is lent to the runtime without copying. Output tensors are
    /// sized and copied in the order the runtime returned them.
    pub fn infer_from_buffer(&mut self, input: &[u8]) -> Result<InferenceOutput> {
        if self.state != SessionState::Loaded {
            return Err(SessionError::InvalidConfiguration(
                "no model is loaded, call initialize first".to_string(),
            ));
        }
        let runtime = self.runtime.as_mut().ok_or_else(|| {
            SessionError::InvalidConfiguration("model runtime has not been created".to_string())
        })?;

        info!("start model inference, model path: {}", self.model_path.display());

        let inputs = [InputTensor::new(input)];

        let mut outputs = runtime.create_output_tensors(&inputs).map_err(|e| {
            error!("create output tensors failed: {}", e);
            SessionError::TensorCreationFailure(e)
        })?;

        let mut context = ExecutionContext::new();
        debug!("start runtime process");
        runtime
            .process(&mut context, &inputs, &mut outputs, 0)
            .map_err(|e| {
                error!("runtime process failed: {}", e);
                SessionError::InferenceExecutionFailure(e)
            })?;
        debug!("end runtime process");

        let output = collect_output(&outputs)?;

        info!(
            "end model inference, model path: {}, {} values",
            self.model_path.display(),
            output.len()
        );
        Ok(output)
    }

    /// Inference from an image file. Not implemented; always fails.
    pub fn infer_from_image_path(
        &mut self,
        image_path: impl AsRef<Path>,
        image_type: ImageType,
    ) -> Result<InferenceOutput> {
        warn!(
            "image inference requested for {} ({}), which is not implemented",
            image_path.as_ref().display(),
            image_type
        );
        Err(SessionError::NotImplemented("inference from an image path"))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != SessionState::Uninitialized
    }

    /// Model path of the last initialization, if any.
    pub fn model_path(&self) -> Option<&Path> {
        if self.model_path.as_os_str().is_empty() {
            None
        } else {
            Some(&self.model_path)
        }
    }

    pub fn image_dimensions(&self) -> Option<ImageDimensions> {
        self.image
    }

    /// The runtime handle, once created.
    pub fn runtime(&self) -> Option<&R> {
        self.runtime.as_ref()
    }

    fn verify(&self, model_path: &Path) -> Result<()> {
        if verify_model_path(model_path) {
            Ok(())
        } else {
            Err(SessionError::InvalidConfiguration(format!(
                "failed to verify model path '{}'",
                model_path.display()
            )))
        }
    }
}

/// Concatenate output tensors into one owned `f32` buffer.
///
/// Tensor bytes are little-endian `f32`. Sizing and copying walk the same
/// slice, so both passes see tensors in the same order.
pub(crate) fn collect_output<T: AiTensor>(tensors: &[T]) -> Result<InferenceOutput> {
    let count = tensors
        .iter()
        .try_fold(0usize, |acc, t| acc.checked_add(t.size() / F32_SIZE))
        .unwrap_or(usize::MAX);

    if count == 0 || count >= OUTPUT_ELEMENT_LIMIT {
        error!("output element count {} is out of range", count);
        return Err(SessionError::OutputSizeOutOfRange { count });
    }

    let mut data: Vec<f32> = Vec::new();
    data.try_reserve_exact(count).map_err(|e| {
        error!("failed to allocate {} output values: {}", count, e);
        SessionError::AllocationFailure(e.to_string())
    })?;

    for (idx, tensor) in tensors.iter().enumerate() {
        let bytes = tensor.buffer();

        if bytes.len() != tensor.size() {
            error!("output tensor {} size mismatch", idx);
            return Err(SessionError::OutputCopyFailure(format!(
                "tensor {} reports {} bytes but holds {}",
                idx,
                tensor.size(),
                bytes.len()
            )));
        }
        if bytes.len() % F32_SIZE != 0 {
            error!("output tensor {} is not f32 aligned", idx);
            return Err(SessionError::OutputCopyFailure(format!(
                "tensor {} has {} bytes, not a multiple of {}",
                idx,
                bytes.len(),
                F32_SIZE
            )));
        }

        data.extend(
            bytes
                .chunks_exact(F32_SIZE)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])),
        );
    }

    Ok(InferenceOutput::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelinfer_runtime::OutputTensor;
    use pretty_assertions::assert_eq;

    fn floats(values: &[f32]) -> OutputTensor {
        OutputTensor::from_bytes("out", values.iter().flat_map(|v| v.to_le_bytes()).collect())
    }

    #[test]
    fn test_collect_preserves_order() {
        let tensors = [floats(&[1.0, 2.0]), floats(&[3.0]), floats(&[4.0, 5.0])];
        let output = collect_output(&tensors).unwrap();

        assert_eq!(output.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_collect_rejects_empty() {
        let tensors: [OutputTensor; 0] = [];
        assert!(matches!(
            collect_output(&tensors),
            Err(SessionError::OutputSizeOutOfRange { count: 0 })
        ));
    }

    #[test]
    fn test_collect_rejects_overflowing_sizes() {
        struct Huge;

        impl AiTensor for Huge {
            fn buffer(&self) -> &[u8] {
                &[]
            }

            fn size(&self) -> usize {
                usize::MAX
            }
        }

        assert!(matches!(
            collect_output(&[Huge, Huge, Huge, Huge, Huge]),
            Err(SessionError::OutputSizeOutOfRange { count: usize::MAX })
        ));
    }

    #[test]
    fn test_collect_rejects_unaligned_tensor() {
        let tensors = [floats(&[1.0]), OutputTensor::from_bytes("odd", vec![0; 6])];
        assert!(matches!(
            collect_output(&tensors),
            Err(SessionError::OutputCopyFailure(_))
        ));
    }
}
