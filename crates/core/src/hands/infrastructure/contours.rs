use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::drawing::draw_polygon_mut;
use imageproc::geometry::{approximate_polygon_dp, contour_area};
use imageproc::point::Point;

use crate::shared::constants::BACKGROUND;

/// Outer borders of every connected foreground region, in image coordinates.
///
/// Hole borders are not reported; regions nested inside holes are.
pub fn outer_contours(image: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(image)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| c.points)
        .collect()
}

/// Area enclosed by a contour, in px².
pub fn enclosed_area(contour: &[Point<i32>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }
    contour_area(contour).abs()
}

/// Clears a contour and everything it encloses.
pub fn erase(image: &mut GrayImage, contour: &[Point<i32>]) {
    let mut polygon = contour;
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon = &polygon[..polygon.len() - 1];
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(image, polygon, Luma([BACKGROUND]));
    }
    let (w, h) = image.dimensions();
    for p in contour {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < w && (p.y as u32) < h {
            image.put_pixel(p.x as u32, p.y as u32, Luma([BACKGROUND]));
        }
    }
}

/// Douglas-Peucker simplification of a closed contour.
///
/// The contour is split at the point farthest from its first point and
/// both halves are simplified as open curves, so the result keeps the
/// extremes of the shape. The returned polygon is implicitly closed.
pub fn approximate_closed(contour: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if contour.len() < 3 {
        return contour.to_vec();
    }
    let origin = contour[0];
    let split = contour
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let (dx, dy) = ((p.x - origin.x) as i64, (p.y - origin.y) as i64);
            dx * dx + dy * dy
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    if split == 0 {
        return vec![origin];
    }

    let head = approximate_polygon_dp(&contour[..=split], epsilon, false);
    let mut tail_curve = contour[split..].to_vec();
    tail_curve.push(origin);
    let tail = approximate_polygon_dp(&tail_curve, epsilon, false);

    let mut polygon = head;
    polygon.pop();
    polygon.extend_from_slice(&tail[..tail.len() - 1]);
    polygon
}
