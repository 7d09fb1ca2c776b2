//! Model runtime implementations.

#[cfg(feature = "ort")]
pub mod ort;

#[cfg(feature = "tract")]
pub mod tract;

use crate::{AiTensor, ExecutionContext, InputTensor, Result, RuntimeConfig};

/// Capability interface of a model runtime.
///
/// A runtime loads one compiled model at a time and executes it
/// synchronously. Implementations are not expected to be reentrant; callers
/// hold `&mut self` for every call.
pub trait ModelRuntime {
    /// Tensor type produced for model outputs.
    type Output: AiTensor;

    /// Load the model named by `config`, replacing any previously loaded one.
    fn init(&mut self, config: &RuntimeConfig) -> Result<()>;

    /// Allocate output tensors suitable for the given inputs.
    fn create_output_tensors(&mut self, inputs: &[InputTensor<'_>]) -> Result<Vec<Self::Output>>;

    /// Run the model, filling `outputs` in model output order.
    ///
    /// # Arguments
    /// * `context` - Per-call execution context
    /// * `inputs` - Input tensors borrowing caller memory
    /// * `outputs` - Tensors previously returned by `create_output_tensors`
    /// * `request_index` - Request slot, `0` for single-request use
    fn process(
        &mut self,
        context: &mut ExecutionContext,
        inputs: &[InputTensor<'_>],
        outputs: &mut [Self::Output],
        request_index: u32,
    ) -> Result<()>;
}
