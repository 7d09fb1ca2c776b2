//! Tensor types for runtime input/output.

/// Size in bytes of one output element.
pub const F32_SIZE: usize = std::mem::size_of::<f32>();

/// A contiguous byte region understood by the runtime.
pub trait AiTensor {
    /// Raw tensor bytes.
    fn buffer(&self) -> &[u8];

    /// Byte length reported by the runtime.
    fn size(&self) -> usize {
        self.buffer().len()
    }
}

/// Input tensor borrowing caller memory for the duration of one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTensor<'a> {
    data: &'a [u8],
}

impl<'a> InputTensor<'a> {
    /// Wrap a caller buffer without copying it.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Point the tensor at a different buffer.
    pub fn set_buffer(&mut self, data: &'a [u8]) {
        self.data = data;
    }

    /// Decode the buffer as little-endian `f32` values.
    ///
    /// Returns `None` when the length is not a multiple of four.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        if self.data.len() % F32_SIZE != 0 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(F32_SIZE)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }
}

impl AiTensor for InputTensor<'_> {
    fn buffer(&self) -> &[u8] {
        self.data
    }
}

/// Output tensor owned by the runtime until the caller copies it out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTensor {
    name: String,
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl OutputTensor {
    /// Create an empty output slot; the runtime fills it during `process`.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Create a zeroed `f32` output of the given shape.
    pub fn zeroed(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let len = shape.iter().product::<usize>() * F32_SIZE;
        Self {
            name: name.into(),
            shape,
            data: vec![0; len],
        }
    }

    /// Create an output from raw bytes.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            shape: vec![data.len() / F32_SIZE],
            data,
        }
    }

    /// Output name as reported by the model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output shape, empty until the runtime knows it.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Replace the contents with little-endian encoded `f32` values.
    pub fn write_f32(&mut self, shape: Vec<usize>, values: impl IntoIterator<Item = f32>) {
        self.data.clear();
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        self.shape = shape;
    }
}

impl AiTensor for OutputTensor {
    fn buffer(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_decodes_le_floats() {
        let bytes: Vec<u8> = [1.5f32, -2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let tensor = InputTensor::new(&bytes);

        assert_eq!(tensor.size(), 8);
        assert_eq!(tensor.to_f32_vec(), Some(vec![1.5, -2.0]));
    }

    #[test]
    fn test_input_rejects_partial_float() {
        let bytes = [0u8; 6];
        assert_eq!(InputTensor::new(&bytes).to_f32_vec(), None);
    }

    #[test]
    fn test_output_write_replaces_contents() {
        let mut out = OutputTensor::zeroed("logits", vec![2, 2]);
        assert_eq!(out.size(), 16);

        out.write_f32(vec![3], [1.0, 2.0, 3.0]);
        assert_eq!(out.size(), 12);
        assert_eq!(out.shape(), &[3]);
        assert_eq!(&out.buffer()[4..8], &2.0f32.to_le_bytes());
    }
}
