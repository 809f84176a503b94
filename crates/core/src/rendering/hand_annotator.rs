use image::{GrayImage, Luma};
use imageproc::drawing::{draw_hollow_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::hands::domain::hand_region_extractor::HandExtraction;
use crate::shared::constants::SKIN;

/// Shade of the fitted-ellipse bounding rectangle.
pub const ELLIPSE_SHADE: u8 = 128;

const OUTLINE_THICKNESS: u32 = 2;

/// Renders the hand visualization mask.
///
/// Regions inside the radius gate are filled; accepted candidates get their
/// bounding rectangle outlined in [`SKIN`] and their fitted ellipse's
/// bounding rectangle in [`ELLIPSE_SHADE`].
#[derive(Default)]
pub struct HandAnnotator;

impl HandAnnotator {
    pub fn new() -> Self {
        Self
    }

    pub fn annotate(&self, canvas: &mut GrayImage, extraction: &HandExtraction) {
        for region in &extraction.regions {
            fill_region(canvas, region);
        }
        for candidate in &extraction.candidates {
            let d = &candidate.descriptors;
            outline(canvas, d.bounding_rect, SKIN);
            if let Some(ellipse) = d.ellipse {
                outline(canvas, ellipse.bounding_rect(), ELLIPSE_SHADE);
            }
        }
    }
}

fn fill_region(canvas: &mut GrayImage, polygon: &[Point<i32>]) {
    let mut closed = polygon;
    while closed.len() > 1 && closed.first() == closed.last() {
        closed = &closed[..closed.len() - 1];
    }
    if closed.len() >= 3 {
        draw_polygon_mut(canvas, closed, Luma([SKIN]));
        return;
    }
    let (w, h) = canvas.dimensions();
    for p in closed {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < w && (p.y as u32) < h {
            canvas.put_pixel(p.x as u32, p.y as u32, Luma([SKIN]));
        }
    }
}

fn outline(canvas: &mut GrayImage, rect: Rect, shade: u8) {
    for inset in 0..OUTLINE_THICKNESS {
        if rect.width() <= 2 * inset || rect.height() <= 2 * inset {
            break;
        }
        let inner = Rect::at(rect.left() + inset as i32, rect.top() + inset as i32)
            .of_size(rect.width() - 2 * inset, rect.height() - 2 * inset);
        draw_hollow_rect_mut(canvas, inner, Luma([shade]));
    }
}
