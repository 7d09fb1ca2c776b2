//! Image-oriented session parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Smallest accepted image side, in pixels.
pub const MIN_IMAGE_SIDE: i32 = 1;
/// Largest accepted image side, in pixels.
pub const MAX_IMAGE_SIDE: i32 = 4096;

/// Image file formats accepted by image-oriented inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Jpg,
    Png,
}

impl ImageType {
    /// Resolve the image type from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageType::Jpg),
            "png" => Some(ImageType::Png),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageType::Jpg => write!(f, "jpg"),
            ImageType::Png => write!(f, "png"),
        }
    }
}

/// Validated image width and height, each in `1..=4096`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    width: u32,
    height: u32,
}

impl ImageDimensions {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let valid = |side: i32| (MIN_IMAGE_SIDE..=MAX_IMAGE_SIDE).contains(&side);
        if !valid(width) || !valid(height) {
            return Err(SessionError::InvalidConfiguration(format!(
                "image width and height [{}, {}] are invalid, value range: {}~{}",
                width, height, MIN_IMAGE_SIDE, MAX_IMAGE_SIDE
            )));
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dimension_bounds() {
        for &(w, h) in &[(1, 1), (4096, 4096), (224, 224), (1, 4096)] {
            let dims = ImageDimensions::new(w, h).unwrap();
            assert_eq!((dims.width() as i32, dims.height() as i32), (w, h));
        }

        for &bad in &[0, -1, 4097, 100_000] {
            assert!(ImageDimensions::new(bad, 224).is_err());
            assert!(ImageDimensions::new(224, bad).is_err());
        }
    }

    #[test]
    fn test_error_names_bounds() {
        let err = ImageDimensions::new(0, 5000).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1~4096"), "{msg}");
        assert!(msg.contains("[0, 5000]"), "{msg}");
    }

    #[test]
    fn test_image_type_from_extension() {
        assert_eq!(ImageType::from_path(Path::new("a/cat.JPEG")), Some(ImageType::Jpg));
        assert_eq!(ImageType::from_path(Path::new("dog.png")), Some(ImageType::Png));
        assert_eq!(ImageType::from_path(Path::new("scan.tiff")), None);
        assert_eq!(ImageType::from_path(Path::new("noext")), None);
    }
}
