//! Configuration structures for an inference session.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use modelinfer_runtime::RuntimeConfig;

/// Main configuration for a modelinfer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Compiled model file.
    pub model_path: PathBuf,

    /// Image dimensions for image-oriented sessions.
    pub image: Option<ImageConfig>,

    /// Options forwarded to the model runtime.
    pub runtime: RuntimeOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            image: None,
            runtime: RuntimeOptions::default(),
        }
    }
}

/// Raw image dimensions, validated when the session is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    pub width: i32,
    pub height: i32,
}

/// Runtime tuning options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Concrete model input shape, e.g. `[1, 3, 224, 224]`.
    pub input_shape: Option<Vec<usize>>,

    /// Number of CPU threads for native runtimes.
    pub intra_threads: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            input_shape: None,
            intra_threads: 4,
        }
    }
}

impl RuntimeOptions {
    /// Build the runtime configuration for a model path.
    pub fn runtime_config(&self, model_path: &Path) -> RuntimeConfig {
        RuntimeConfig {
            model_path: model_path.to_path_buf(),
            input_shape: self.input_shape.clone(),
            intra_threads: self.intra_threads,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = SessionConfig {
            model_path: PathBuf::from("/models/resnet.onnx"),
            image: Some(ImageConfig { width: 224, height: 224 }),
            runtime: RuntimeOptions {
                input_shape: Some(vec![1, 3, 224, 224]),
                intra_threads: 2,
            },
        };
        config.save(&path).unwrap();

        assert_eq!(SessionConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"model_path": "m.onnx"}"#).unwrap();

        assert_eq!(config.model_path, PathBuf::from("m.onnx"));
        assert_eq!(config.image, None);
        assert_eq!(config.runtime, RuntimeOptions::default());
    }

    #[test]
    fn test_runtime_config_carries_options() {
        let options = RuntimeOptions {
            input_shape: Some(vec![1, 10]),
            intra_threads: 1,
        };
        let runtime = options.runtime_config(Path::new("a.onnx"));

        assert_eq!(runtime.model_path, PathBuf::from("a.onnx"));
        assert_eq!(runtime.input_shape, Some(vec![1, 10]));
        assert_eq!(runtime.intra_threads, 1);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = SessionConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
