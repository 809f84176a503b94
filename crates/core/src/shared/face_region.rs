use serde::{Deserialize, Serialize};

/// Multiplicative adjustment applied to a face rectangle.
///
/// Only the x-origin is scaled; the y-origin is left untouched so that
/// height changes extend or retract the rectangle's bottom edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionScale {
    pub x: f64,
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned face rectangle in image coordinates.
///
/// Values are never mutated in place: derived rectangles (tightened for
/// color statistics, loosened for face exclusion) are new values built
/// from the locator's original rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Scales origin and size, truncating each product toward zero.
    pub fn scaled(&self, scale: RegionScale) -> FaceRegion {
        FaceRegion {
            x: truncate(self.x, scale.x),
            y: self.y,
            width: truncate(self.width, scale.width),
            height: truncate(self.height, scale.height),
        }
    }

    /// Sampling window for skin statistics, kept inside this rectangle.
    pub fn tightened(&self, scale: RegionScale) -> Option<FaceRegion> {
        self.scaled(scale).intersect(self)
    }

    /// Exclusion window covering the face and neck.
    pub fn loosened(&self, scale: RegionScale) -> FaceRegion {
        self.scaled(scale)
    }

    pub fn intersect(&self, other: &FaceRegion) -> Option<FaceRegion> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(FaceRegion::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Clips to a `width` x `height` frame; `None` when nothing remains.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<FaceRegion> {
        self.intersect(&FaceRegion::new(0, 0, width as i32, height as i32))
    }
}

fn truncate(value: i32, factor: f64) -> i32 {
    (value as f64 * factor) as i32
}
