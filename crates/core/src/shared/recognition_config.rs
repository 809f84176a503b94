use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{MIN_HULL_VERTICES, MIN_POLYGON_VERTICES};
use crate::shared::error::RecognitionError;
use crate::shared::face_region::RegionScale;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] RecognitionError),
}

/// Lower/upper multipliers of the luma standard deviation around a
/// channel mean: the inclusive range is `[mean - lower*σ, mean + upper*σ]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SigmaBounds {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinMaskParams {
    pub blur_kernel_size: usize,
    pub blur_sigma: f64,
    pub tighten: RegionScale,
    pub luma: SigmaBounds,
    pub chroma_red: SigmaBounds,
    pub chroma_blue: SigmaBounds,
    pub element_width: u32,
    pub element_height: u32,
    pub dilate_iterations: usize,
    pub erode_iterations: usize,
}

impl Default for SkinMaskParams {
    fn default() -> Self {
        Self {
            blur_kernel_size: 9,
            blur_sigma: 1.0,
            tighten: RegionScale {
                x: 1.05,
                width: 0.9,
                height: 0.8,
            },
            luma: SigmaBounds {
                lower: 2.0,
                upper: 2.0,
            },
            // Lower bound is deliberately narrow: this channel separates skin best.
            chroma_red: SigmaBounds {
                lower: 0.1,
                upper: 1.0,
            },
            chroma_blue: SigmaBounds {
                lower: 0.5,
                upper: 1.0,
            },
            element_width: 10,
            element_height: 20,
            dilate_iterations: 1,
            erode_iterations: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandFilterParams {
    pub loosen: RegionScale,
    /// Minimum enclosed contour area in px², tuned for 640x480 frames.
    pub min_contour_area: f64,
    pub polygon_epsilon: f64,
    /// Enclosing-circle radius gate, as exclusive multiples of face height.
    pub min_radius_ratio: f64,
    pub max_radius_ratio: f64,
    pub min_polygon_vertices: usize,
    pub min_hull_vertices: usize,
}

impl Default for HandFilterParams {
    fn default() -> Self {
        Self {
            loosen: RegionScale {
                x: 0.95,
                width: 1.2,
                height: 1.2,
            },
            min_contour_area: 5000.0,
            polygon_epsilon: 3.0,
            min_radius_ratio: 0.5,
            max_radius_ratio: 1.5,
            min_polygon_vertices: MIN_POLYGON_VERTICES,
            min_hull_vertices: MIN_HULL_VERTICES,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// ClosedPalm: half the fitted ellipse's bounding height must exceed this
    /// multiple of the enclosing-circle radius.
    pub closed_ellipse_ratio: f64,
    /// ClosedPalm: the radius must stay below this multiple of face height.
    pub closed_max_face_ratio: f64,
    /// SpreadPalm: deepest defect (1/256 px units) over this multiple of radius.
    pub spread_defect_depth_factor: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            closed_ellipse_ratio: 1.1,
            closed_max_face_ratio: 0.8,
            spread_defect_depth_factor: 50.0,
        }
    }
}

/// Every empirically tuned constant of the pipeline, overridable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub skin: SkinMaskParams,
    pub hands: HandFilterParams,
    pub gestures: GestureThresholds,
}

impl RecognitionConfig {
    /// Reads a JSON config; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: RecognitionConfig =
            serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RecognitionError> {
        let skin = &self.skin;
        if skin.blur_kernel_size == 0 || skin.blur_kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "blur kernel size must be a positive odd integer, got {}",
                skin.blur_kernel_size
            )));
        }
        if skin.blur_sigma <= 0.0 {
            return Err(invalid(format!(
                "blur sigma must be positive, got {}",
                skin.blur_sigma
            )));
        }
        if skin.element_width == 0
            || skin.element_height == 0
            || skin.element_width > 255
            || skin.element_height > 255
        {
            return Err(invalid(format!(
                "structuring element must be between 1x1 and 255x255, got {}x{}",
                skin.element_width, skin.element_height
            )));
        }
        for scale in [skin.tighten, self.hands.loosen] {
            if scale.x <= 0.0 || scale.width <= 0.0 || scale.height <= 0.0 {
                return Err(invalid(format!(
                    "region scale factors must be positive, got {scale:?}"
                )));
            }
        }

        let hands = &self.hands;
        if hands.polygon_epsilon <= 0.0 {
            return Err(invalid(format!(
                "polygon epsilon must be positive, got {}",
                hands.polygon_epsilon
            )));
        }
        if !(0.0..hands.max_radius_ratio).contains(&hands.min_radius_ratio) {
            return Err(invalid(format!(
                "radius gate must satisfy 0 <= min < max, got ({}, {})",
                hands.min_radius_ratio, hands.max_radius_ratio
            )));
        }
        if hands.min_polygon_vertices < MIN_POLYGON_VERTICES {
            return Err(invalid(format!(
                "ellipse fitting needs at least 5 polygon vertices, got {}",
                hands.min_polygon_vertices
            )));
        }
        if hands.min_hull_vertices < MIN_HULL_VERTICES {
            return Err(invalid(format!(
                "convexity defects need at least 4 hull vertices, got {}",
                hands.min_hull_vertices
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> RecognitionError {
    RecognitionError::InvalidConfig(message)
}
