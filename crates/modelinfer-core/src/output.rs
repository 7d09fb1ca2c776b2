//! Owned inference results.

use ndarray::{ArrayD, IxDyn, ShapeError};
use serde::Serialize;

/// Flat `f32` result of one inference call, owned by the caller.
///
/// Values from every output tensor are concatenated in model output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InferenceOutput {
    data: Vec<f32>,
}

impl InferenceOutput {
    pub(crate) fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Number of `f32` elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Reshape the values into an n-dimensional array.
    pub fn into_array(self, shape: &[usize]) -> Result<ArrayD<f32>, ShapeError> {
        ArrayD::from_shape_vec(IxDyn(shape), self.data)
    }

    /// Encode the values as little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

impl From<Vec<f32>> for InferenceOutput {
    fn from(data: Vec<f32>) -> Self {
        Self { data }
    }
}

impl From<InferenceOutput> for Vec<f32> {
    fn from(output: InferenceOutput) -> Self {
        output.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_into_array() {
        let output = InferenceOutput::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let arr = output.clone().into_array(&[2, 3]).unwrap();

        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr[[1, 0]], 4.0);
        assert!(output.into_array(&[4, 4]).is_err());
    }

    #[test]
    fn test_le_bytes() {
        let output = InferenceOutput::new(vec![0.5]);
        assert_eq!(output.to_le_bytes(), 0.5f32.to_le_bytes().to_vec());
    }
}
