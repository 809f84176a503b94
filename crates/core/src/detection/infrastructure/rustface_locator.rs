use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::GrayImage;
use thiserror::Error;

use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::constants::{MAX_FACE_SIZE, MIN_FACE_SIZE};
use crate::shared::face_region::FaceRegion;

#[derive(Error, Debug)]
pub enum FaceLocatorError {
    #[error("failed to read face model {path}: {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid face model: {0}")]
    ModelParse(String),
    #[error("face size bounds must satisfy 0 < min <= max, got {min}..{max}")]
    InvalidSizeRange { min: u32, max: u32 },
}

/// Frontal face locator on the SeetaFace cascade.
///
/// Faces smaller than `min_face_size` are never searched for; larger than
/// `max_face_size` are discarded after detection.
pub struct RustfaceLocator {
    model: rustface::Model,
    min_face_size: u32,
    max_face_size: u32,
}

impl RustfaceLocator {
    pub fn from_file(path: &Path) -> Result<Self, FaceLocatorError> {
        let bytes = std::fs::read(path).map_err(|e| FaceLocatorError::ModelRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FaceLocatorError> {
        let model = rustface::read_model(Cursor::new(bytes))
            .map_err(|e| FaceLocatorError::ModelParse(e.to_string()))?;
        Ok(Self {
            model,
            min_face_size: MIN_FACE_SIZE,
            max_face_size: MAX_FACE_SIZE,
        })
    }

    pub fn with_face_size_range(mut self, min: u32, max: u32) -> Result<Self, FaceLocatorError> {
        if min == 0 || min > max {
            return Err(FaceLocatorError::InvalidSizeRange { min, max });
        }
        self.min_face_size = min;
        self.max_face_size = max;
        Ok(self)
    }
}

impl FaceLocator for RustfaceLocator {
    fn locate(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, Box<dyn std::error::Error>> {
        let (width, height) = gray.dimensions();
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.min_face_size);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        let max = self.max_face_size;
        Ok(faces
            .iter()
            .map(|face| face.bbox())
            .filter(|bbox| bbox.width() <= max && bbox.height() <= max)
            .map(|bbox| {
                FaceRegion::new(bbox.x(), bbox.y(), bbox.width() as i32, bbox.height() as i32)
            })
            .collect())
    }
}
