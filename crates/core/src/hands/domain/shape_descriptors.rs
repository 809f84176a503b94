use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::hands::infrastructure::shape_geometry::{
    bounding_rect, convexity_defects, fit_ellipse, hull_indices, min_enclosing_circle, Circle,
    ConvexityDefect, RotatedRect,
};

/// Geometric summary of one simplified hand contour.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeDescriptors {
    pub bounding_rect: Rect,
    pub enclosing_circle: Circle,
    /// `None` with fewer than five vertices or a non-elliptical fit.
    pub ellipse: Option<RotatedRect>,
    pub vertex_count: usize,
    pub hull_vertex_count: usize,
    pub defects: Vec<ConvexityDefect>,
}

impl ShapeDescriptors {
    /// Describes a polygon; `None` for an empty one.
    pub fn describe(polygon: &[Point<i32>]) -> Option<Self> {
        let bounding_rect = bounding_rect(polygon)?;
        let enclosing_circle = min_enclosing_circle(polygon)?;
        let hull = hull_indices(polygon);
        Some(Self {
            bounding_rect,
            enclosing_circle,
            ellipse: fit_ellipse(polygon),
            vertex_count: polygon.len(),
            hull_vertex_count: hull.len(),
            defects: convexity_defects(polygon, &hull),
        })
    }

    pub fn radius(&self) -> f64 {
        self.enclosing_circle.radius
    }

    pub fn center(&self) -> (f64, f64) {
        self.enclosing_circle.center
    }

    pub fn deepest_defect(&self) -> Option<&ConvexityDefect> {
        self.defects.iter().max_by(|a, b| a.depth.total_cmp(&b.depth))
    }
}

/// An accepted contour: the simplified polygon and its descriptors.
#[derive(Clone, Debug, PartialEq)]
pub struct HandCandidate {
    pub polygon: Vec<Point<i32>>,
    pub descriptors: ShapeDescriptors,
}
