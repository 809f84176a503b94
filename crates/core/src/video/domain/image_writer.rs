use std::path::Path;

use image::GrayImage;

/// Persists a single-channel visualization image.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, image: &GrayImage) -> Result<(), Box<dyn std::error::Error>>;
}
