//! Tract backend for portable ONNX inference.

use tract_onnx::prelude::*;
use tracing::debug;

use crate::error::RuntimeError;
use crate::tensor::{AiTensor, F32_SIZE, InputTensor, OutputTensor};
use crate::{ExecutionContext, ModelRuntime, Result, RuntimeConfig};

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

struct LoadedModel {
    plan: Plan,
    input_shape: Vec<usize>,
    outputs: Vec<(String, Option<Vec<usize>>)>,
}

/// Runtime using Tract for pure-Rust ONNX inference.
///
/// The model takes a single `f32` input; input bytes are little-endian.
#[derive(Default)]
pub struct TractRuntime {
    loaded: Option<LoadedModel>,
}

impl TractRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a model has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn load(config: &RuntimeConfig) -> Result<LoadedModel> {
        debug!("Loading ONNX model with Tract from: {}", config.model_path.display());

        let mut model = tract_onnx::onnx()
            .model_for_path(&config.model_path)
            .map_err(|e| RuntimeError::ModelLoad(format!("Failed to load model: {}", e)))?;

        // Pin dynamic input dimensions when the caller knows them
        if let Some(shape) = &config.input_shape {
            model
                .set_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), shape.as_slice()))
                .map_err(|e| RuntimeError::ModelLoad(format!("Failed to set input shape: {}", e)))?;
        }

        let model = model
            .into_typed()
            .map_err(|e| RuntimeError::ModelLoad(format!("Failed to type model: {}", e)))?
            .into_optimized()
            .map_err(|e| RuntimeError::ModelLoad(format!("Failed to optimize: {}", e)))?;

        let input_shape = model
            .input_fact(0)
            .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?
            .shape
            .as_concrete()
            .map(<[usize]>::to_vec)
            .ok_or_else(|| {
                RuntimeError::ModelLoad("model input shape is dynamic; set input_shape".to_string())
            })?;

        let mut outputs = Vec::with_capacity(model.outputs.len());
        for (idx, outlet) in model.outputs.iter().enumerate() {
            let name = model.node(outlet.node).name.clone();
            let shape = model
                .output_fact(idx)
                .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?
                .shape
                .as_concrete()
                .map(<[usize]>::to_vec);
            outputs.push((name, shape));
        }

        debug!("Model input shape: {:?}", input_shape);
        debug!("Model outputs: {:?}", outputs);

        let plan = model
            .into_runnable()
            .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?;

        Ok(LoadedModel {
            plan,
            input_shape,
            outputs,
        })
    }
}

impl LoadedModel {
    fn check_inputs(&self, inputs: &[InputTensor<'_>]) -> Result<()> {
        let [input] = inputs else {
            return Err(RuntimeError::InvalidInput(format!(
                "expected 1 input tensor, got {}",
                inputs.len()
            )));
        };

        let expected = self.input_shape.iter().product::<usize>() * F32_SIZE;
        if input.size() != expected {
            return Err(RuntimeError::InvalidInput(format!(
                "input is {} bytes, model shape {:?} needs {}",
                input.size(),
                self.input_shape,
                expected
            )));
        }
        Ok(())
    }
}

impl ModelRuntime for TractRuntime {
    type Output = OutputTensor;

    fn init(&mut self, config: &RuntimeConfig) -> Result<()> {
        // A failed reload must not leave the previous model behind
        self.loaded = None;
        self.loaded = Some(Self::load(config)?);
        Ok(())
    }

    fn create_output_tensors(&mut self, inputs: &[InputTensor<'_>]) -> Result<Vec<OutputTensor>> {
        let loaded = self.loaded.as_ref().ok_or(RuntimeError::NotLoaded)?;
        loaded.check_inputs(inputs)?;

        Ok(loaded
            .outputs
            .iter()
            .map(|(name, shape)| match shape {
                Some(shape) => OutputTensor::zeroed(name.as_str(), shape.clone()),
                None => OutputTensor::empty(name.as_str()),
            })
            .collect())
    }

    fn process(
        &mut self,
        _context: &mut ExecutionContext,
        inputs: &[InputTensor<'_>],
        outputs: &mut [OutputTensor],
        _request_index: u32,
    ) -> Result<()> {
        let loaded = self.loaded.as_ref().ok_or(RuntimeError::NotLoaded)?;
        loaded.check_inputs(inputs)?;

        let data = inputs[0]
            .to_f32_vec()
            .ok_or_else(|| RuntimeError::InvalidInput("input is not f32 aligned".to_string()))?;
        let array = tract_ndarray::ArrayD::from_shape_vec(
            tract_ndarray::IxDyn(loaded.input_shape.as_slice()),
            data,
        )
        .map_err(|e| RuntimeError::InvalidInput(e.to_string()))?;
        let tract_inputs: TVec<TValue> = std::iter::once(array.into_tvalue()).collect();

        let results = loaded
            .plan
            .run(tract_inputs)
            .map_err(|e| RuntimeError::Process(e.to_string()))?;

        if results.len() != outputs.len() {
            return Err(RuntimeError::OutputExtraction(format!(
                "model produced {} outputs, {} tensors supplied",
                results.len(),
                outputs.len()
            )));
        }

        for (result, tensor) in results.iter().zip(outputs.iter_mut()) {
            let view = result.to_array_view::<f32>().map_err(|e| {
                RuntimeError::OutputExtraction(format!("output '{}': {}", tensor.name(), e))
            })?;
            tensor.write_f32(view.shape().to_vec(), view.iter().copied());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_runtime_rejects_calls() {
        let mut runtime = TractRuntime::new();
        let bytes = [0u8; 4];
        let inputs = [InputTensor::new(&bytes)];

        assert!(!runtime.is_loaded());
        assert!(matches!(
            runtime.create_output_tensors(&inputs),
            Err(RuntimeError::NotLoaded)
        ));
    }

    #[test]
    fn test_missing_model_fails_to_load() {
        let mut runtime = TractRuntime::new();
        let config = RuntimeConfig::for_model("/nonexistent/model.onnx");

        assert!(matches!(runtime.init(&config), Err(RuntimeError::ModelLoad(_))));
        assert!(!runtime.is_loaded());
    }
}
