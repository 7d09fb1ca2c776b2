//! Per-call execution context and runtime configuration.

use std::collections::HashMap;
use std::path::PathBuf;

/// Opaque per-call state handed to [`ModelRuntime::process`](crate::ModelRuntime::process).
///
/// The session creates a fresh context for every inference call. Runtimes
/// may read or record string parameters on it.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    params: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Configuration passed to [`ModelRuntime::init`](crate::ModelRuntime::init).
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Model file to load.
    pub model_path: PathBuf,

    /// Concrete input shape, for models with dynamic input dimensions.
    pub input_shape: Option<Vec<usize>>,

    /// Number of intra-op threads (native runtimes only).
    pub intra_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            input_shape: None,
            intra_threads: 4,
        }
    }
}

impl RuntimeConfig {
    /// Default configuration for a model path.
    pub fn for_model(path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: path.into(),
            ..Self::default()
        }
    }
}
