use crate::hands::domain::hand::GestureState;
use crate::hands::domain::shape_descriptors::ShapeDescriptors;
use crate::shared::constants::{MIN_HULL_VERTICES, MIN_POLYGON_VERTICES};
use crate::shared::error::RecognitionError;
use crate::shared::recognition_config::GestureThresholds;

/// Assigns a gesture to an accepted hand candidate.
///
/// Rules are checked in order:
/// 1. `ClosedPalm` when half the fitted ellipse's bounding height exceeds
///    `closed_ellipse_ratio` times the enclosing radius and the radius is
///    below `closed_max_face_ratio` times the face height.
/// 2. `SpreadPalm` when the deepest convexity defect, in 1/256 px, exceeds
///    `spread_defect_depth_factor` times the radius.
/// 3. `OpenPalm` otherwise.
pub struct GestureClassifier {
    thresholds: GestureThresholds,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(
        &self,
        descriptors: &ShapeDescriptors,
        face_height: i32,
    ) -> Result<GestureState, RecognitionError> {
        let insufficient = RecognitionError::InsufficientShapeData {
            vertices: descriptors.vertex_count,
            hull_vertices: descriptors.hull_vertex_count,
        };
        if descriptors.vertex_count < MIN_POLYGON_VERTICES
            || descriptors.hull_vertex_count < MIN_HULL_VERTICES
        {
            return Err(insufficient);
        }
        let ellipse = descriptors.ellipse.ok_or(insufficient)?;

        let radius = descriptors.radius();
        let half_height = (ellipse.bounding_rect().height() / 2) as f64;
        let t = &self.thresholds;
        if half_height > t.closed_ellipse_ratio * radius
            && radius < t.closed_max_face_ratio * face_height as f64
        {
            return Ok(GestureState::ClosedPalm);
        }

        let depth = descriptors
            .deepest_defect()
            .map_or(0, |d| d.fixed_depth());
        if depth as f64 > t.spread_defect_depth_factor * radius {
            return Ok(GestureState::SpreadPalm);
        }
        Ok(GestureState::OpenPalm)
    }
}
