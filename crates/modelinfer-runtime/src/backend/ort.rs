//! ONNX Runtime (ort) backend for native platforms with XNNPACK.

use ort::ep::XNNPACK;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use tracing::debug;

use crate::error::RuntimeError;
use crate::tensor::{AiTensor, F32_SIZE, InputTensor, OutputTensor};
use crate::{ExecutionContext, ModelRuntime, Result, RuntimeConfig};

struct LoadedSession {
    session: Session,
    input_name: String,
    input_shape: Option<Vec<usize>>,
    output_names: Vec<String>,
}

/// Runtime using ONNX Runtime for native inference.
#[derive(Default)]
pub struct OrtRuntime {
    loaded: Option<LoadedSession>,
}

impl OrtRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn load(config: &RuntimeConfig) -> Result<LoadedSession> {
        debug!("Loading ONNX model from: {}", config.model_path.display());

        let bytes = std::fs::read(&config.model_path)?;

        let session = Session::builder()
            .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?
            .with_execution_providers([XNNPACK::default().build()])
            .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?
            .commit_from_memory(&bytes)
            .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| RuntimeError::ModelLoad("model has no inputs".to_string()))?;

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        debug!("Model input: {}", input_name);
        debug!("Model outputs: {:?}", output_names);

        Ok(LoadedSession {
            session,
            input_name,
            input_shape: config.input_shape.clone(),
            output_names,
        })
    }
}

impl LoadedSession {
    /// Shape used for an input of `len` bytes.
    fn shape_for(&self, len: usize) -> Result<Vec<i64>> {
        let shape = match &self.input_shape {
            Some(shape) => {
                let expected = shape.iter().product::<usize>() * F32_SIZE;
                if expected != len {
                    return Err(RuntimeError::InvalidInput(format!(
                        "input is {} bytes, shape {:?} needs {}",
                        len, shape, expected
                    )));
                }
                shape.clone()
            }
            None => vec![len / F32_SIZE],
        };
        Ok(shape.iter().map(|&s| s as i64).collect())
    }
}

impl ModelRuntime for OrtRuntime {
    type Output = OutputTensor;

    fn init(&mut self, config: &RuntimeConfig) -> Result<()> {
        self.loaded = None;
        self.loaded = Some(Self::load(config)?);
        Ok(())
    }

    fn create_output_tensors(&mut self, inputs: &[InputTensor<'_>]) -> Result<Vec<OutputTensor>> {
        let loaded = self.loaded.as_ref().ok_or(RuntimeError::NotLoaded)?;
        if inputs.len() != 1 {
            return Err(RuntimeError::InvalidInput(format!(
                "expected 1 input tensor, got {}",
                inputs.len()
            )));
        }
        loaded.shape_for(inputs[0].size())?;

        Ok(loaded
            .output_names
            .iter()
            .map(|name| OutputTensor::empty(name.as_str()))
            .collect())
    }

    fn process(
        &mut self,
        _context: &mut ExecutionContext,
        inputs: &[InputTensor<'_>],
        outputs: &mut [OutputTensor],
        _request_index: u32,
    ) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(RuntimeError::NotLoaded)?;
        let input = inputs
            .first()
            .ok_or_else(|| RuntimeError::InvalidInput("no input tensor".to_string()))?;

        let shape = loaded.shape_for(input.size())?;
        let data = input
            .to_f32_vec()
            .ok_or_else(|| RuntimeError::InvalidInput("input is not f32 aligned".to_string()))?;
        let value: ort::session::SessionInputValue<'static> = Tensor::from_array((shape, data))
            .map(Into::into)
            .map_err(|e| RuntimeError::InvalidInput(e.to_string()))?;

        let ort_inputs = vec![(loaded.input_name.as_str(), value)];
        let results = loaded
            .session
            .run(ort_inputs)
            .map_err(|e| RuntimeError::Process(e.to_string()))?;

        if results.len() != outputs.len() {
            return Err(RuntimeError::OutputExtraction(format!(
                "model produced {} outputs, {} tensors supplied",
                results.len(),
                outputs.len()
            )));
        }

        for ((name, value), tensor) in results.iter().zip(outputs.iter_mut()) {
            let (shape_ref, data) = value.try_extract_tensor::<f32>().map_err(|e| {
                RuntimeError::OutputExtraction(format!("output '{}': {}", name, e))
            })?;
            let shape: Vec<usize> = shape_ref.iter().map(|&s| s as usize).collect();
            tensor.write_f32(shape, data.iter().copied());
        }

        Ok(())
    }
}
