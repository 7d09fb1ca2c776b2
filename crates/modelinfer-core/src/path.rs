//! Model path verification.

use std::fs::File;
use std::path::Path;

use tracing::error;

/// Check that `path` names an existing, readable regular file.
///
/// Logs the reason on failure and never returns an error itself.
pub fn verify_model_path(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        error!("the model path is empty");
        return false;
    }

    let metadata = match path.metadata() {
        Ok(metadata) => metadata,
        Err(e) => {
            error!("the model path {} does not exist: {}", path.display(), e);
            return false;
        }
    };

    if !metadata.is_file() {
        error!("the model path {} is not a regular file", path.display());
        return false;
    }

    if let Err(e) = File::open(path) {
        error!("the model path {} has no read permission: {}", path.display(), e);
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_rejected() {
        assert!(!verify_model_path(Path::new("")));
    }

    #[test]
    fn test_missing_path_rejected() {
        assert!(!verify_model_path(Path::new("/nonexistent/dir/model.om")));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!verify_model_path(dir.path()));
    }

    #[test]
    fn test_readable_file_accepted() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(verify_model_path(file.path()));
    }
}
