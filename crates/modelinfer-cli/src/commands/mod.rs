//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod run;
pub mod verify;

use std::path::{Path, PathBuf};

use tracing::debug;

use modelinfer_core::SessionConfig;

#[cfg(feature = "ort")]
pub type Session = modelinfer_core::OrtSession;

#[cfg(all(feature = "tract", not(feature = "ort")))]
pub type Session = modelinfer_core::TractSession;

#[cfg(not(any(feature = "tract", feature = "ort")))]
compile_error!("enable the `tract` or `ort` feature");

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modelinfer")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SessionConfig> {
    if let Some(path) = config_path {
        return Ok(SessionConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(SessionConfig::from_file(&default_path)?)
    } else {
        Ok(SessionConfig::default())
    }
}

/// Apply command-line overrides and open a buffer-oriented session.
pub fn open_session(
    mut config: SessionConfig,
    model: Option<PathBuf>,
    shape: Option<Vec<usize>>,
) -> anyhow::Result<Session> {
    if let Some(model) = model {
        config.model_path = model;
    }
    if shape.is_some() {
        config.runtime.input_shape = shape;
    }

    let session = Session::from_config(&config)?;
    if let Some(dims) = session.image_dimensions() {
        anyhow::bail!(
            "Config describes an image session ({}x{}); image inference is not implemented. \
             Remove \"image\" from the config to run buffer inference.",
            dims.width(),
            dims.height()
        );
    }
    Ok(session)
}
