use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::hands::domain::shape_descriptors::{HandCandidate, ShapeDescriptors};
use crate::hands::infrastructure::contours::{
    approximate_closed, enclosed_area, erase, outer_contours,
};
use crate::shared::constants::BACKGROUND;
use crate::shared::face_region::FaceRegion;
use crate::shared::recognition_config::HandFilterParams;
use crate::skin::domain::skin_mask::SkinMask;

/// Result of scanning one skin mask for hands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandExtraction {
    /// Simplified outline of every region inside the radius gate.
    pub regions: Vec<Vec<Point<i32>>>,
    /// Regions that also passed the vertex gates, ready to classify.
    pub candidates: Vec<HandCandidate>,
}

/// Finds hand-sized skin regions away from the face.
pub struct HandRegionExtractor {
    params: HandFilterParams,
}

impl HandRegionExtractor {
    pub fn new(params: HandFilterParams) -> Self {
        Self { params }
    }

    /// The mask is not modified; work happens on a copy.
    pub fn extract(&self, mask: &SkinMask, face: &FaceRegion) -> HandExtraction {
        let mut working = mask.as_image().clone();
        self.blank_out_face(&mut working, face);

        let mut erased = 0;
        for contour in outer_contours(&working) {
            if enclosed_area(&contour) < self.params.min_contour_area {
                erase(&mut working, &contour);
                erased += 1;
            }
        }
        if erased > 0 {
            log::debug!(
                "Erased {erased} regions below {} px²",
                self.params.min_contour_area
            );
        }

        let face_height = face.height as f64;
        let min_radius = self.params.min_radius_ratio * face_height;
        let max_radius = self.params.max_radius_ratio * face_height;

        let mut extraction = HandExtraction::default();
        for contour in outer_contours(&working) {
            let polygon = approximate_closed(&contour, self.params.polygon_epsilon);
            let Some(descriptors) = ShapeDescriptors::describe(&polygon) else {
                continue;
            };

            let radius = descriptors.radius();
            if radius <= min_radius || radius >= max_radius {
                log::debug!(
                    "Dropped region at {:?}: radius {radius:.1} outside ({min_radius:.1}, {max_radius:.1})",
                    descriptors.center()
                );
                continue;
            }
            extraction.regions.push(polygon.clone());

            if descriptors.vertex_count < self.params.min_polygon_vertices
                || descriptors.hull_vertex_count < self.params.min_hull_vertices
            {
                log::debug!(
                    "Dropped region at {:?}: {} vertices, {} hull vertices",
                    descriptors.center(),
                    descriptors.vertex_count,
                    descriptors.hull_vertex_count
                );
                continue;
            }
            extraction.candidates.push(HandCandidate {
                polygon,
                descriptors,
            });
        }
        extraction
    }

    /// Clears the loosened face window, bottom-right corner included.
    fn blank_out_face(&self, image: &mut GrayImage, face: &FaceRegion) {
        let window = face.loosened(self.params.loosen);
        if window.width < 0 || window.height < 0 {
            return;
        }
        draw_filled_rect_mut(
            image,
            Rect::at(window.x, window.y).of_size(window.width as u32 + 1, window.height as u32 + 1),
            Luma([BACKGROUND]),
        );
    }
}
