use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use imageproc::rect::Rect;
use nalgebra::{DMatrix, DVector, Matrix2, SymmetricEigen, Vector2};

/// Points closer than this to a circle's boundary count as inside it.
const CIRCLE_TOLERANCE: f64 = 1e-7;

const SVD_EPSILON: f64 = 1e-12;

/// Conic fits with an axis longer than this multiple of the points' extent
/// are replaced by the moment ellipse.
const MAX_AXIS_EXTENT_RATIO: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: (f64, f64),
    pub radius: f64,
}

impl Circle {
    fn around(p: (f64, f64)) -> Self {
        Self {
            center: p,
            radius: 0.0,
        }
    }

    fn with_diameter(a: (f64, f64), b: (f64, f64)) -> Self {
        let center = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        Self {
            center,
            radius: distance(a, center),
        }
    }

    /// Circle through three points; `None` when they are collinear.
    fn circumscribed(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<Self> {
        let (bx, by) = (b.0 - a.0, b.1 - a.1);
        let (cx, cy) = (c.0 - a.0, c.1 - a.1);
        let d = 2.0 * (bx * cy - by * cx);
        if d.abs() < f64::EPSILON {
            return None;
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        let center = (a.0 + ux, a.1 + uy);
        Some(Self {
            center,
            radius: (ux * ux + uy * uy).sqrt(),
        })
    }

    fn contains(&self, p: (f64, f64)) -> bool {
        distance(self.center, p) <= self.radius + CIRCLE_TOLERANCE * self.radius.max(1.0)
    }
}

/// Rotated rectangle describing a fitted ellipse: full axis lengths and
/// the rotation of the `width` axis in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatedRect {
    pub center: (f64, f64),
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl RotatedRect {
    fn is_finite(&self) -> bool {
        [self.center.0, self.center.1, self.width, self.height, self.angle]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let u = (cos * hw, sin * hw);
        let v = (-sin * hh, cos * hh);
        let (cx, cy) = self.center;
        [
            (cx - u.0 - v.0, cy - u.1 - v.1),
            (cx + u.0 - v.0, cy + u.1 - v.1),
            (cx + u.0 + v.0, cy + u.1 + v.1),
            (cx - u.0 + v.0, cy - u.1 + v.1),
        ]
    }

    /// Smallest integer rectangle covering all four corners.
    pub fn bounding_rect(&self) -> Rect {
        let corners = self.corners();
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);
        let left = min_x.floor() as i32;
        let top = min_y.floor() as i32;
        let width = (max_x.ceil() as i32 - left + 1).max(1) as u32;
        let height = (max_y.ceil() as i32 - top + 1).max(1) as u32;
        Rect::at(left, top).of_size(width, height)
    }
}

/// Deepest point of a polygon between two consecutive hull vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvexityDefect {
    pub start: usize,
    pub end: usize,
    pub farthest: usize,
    /// Distance from the farthest point to the hull edge, in pixels.
    pub depth: f64,
}

impl ConvexityDefect {
    /// Depth in 1/256 pixel units.
    pub fn fixed_depth(&self) -> i64 {
        (self.depth * 256.0).round() as i64
    }
}

/// Axis-aligned bounding rectangle, inclusive of the extreme points.
pub fn bounding_rect(points: &[Point<i32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect::at(min_x, min_y).of_size((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
}

/// Smallest circle containing every point (incremental Welzl construction).
pub fn min_enclosing_circle(points: &[Point<i32>]) -> Option<Circle> {
    let pts: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    let mut circle = Circle::around(*pts.first()?);

    for i in 1..pts.len() {
        if circle.contains(pts[i]) {
            continue;
        }
        circle = Circle::around(pts[i]);
        for j in 0..i {
            if circle.contains(pts[j]) {
                continue;
            }
            circle = Circle::with_diameter(pts[i], pts[j]);
            for k in 0..j {
                if circle.contains(pts[k]) {
                    continue;
                }
                circle = Circle::circumscribed(pts[i], pts[j], pts[k])
                    .unwrap_or_else(|| widest_pair(pts[i], pts[j], pts[k]));
            }
        }
    }
    Some(circle)
}

fn widest_pair(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Circle {
    [(a, b), (a, c), (b, c)]
        .into_iter()
        .map(|(p, q)| Circle::with_diameter(p, q))
        .fold(Circle::around(a), |best, next| {
            if next.radius > best.radius {
                next
            } else {
                best
            }
        })
}

/// Least-squares ellipse through at least five points.
///
/// Points are centered and normalized before fitting a general conic, the
/// center is recovered from its gradient, and the quadratic part is refit
/// about that center. Axis lengths come from the magnitudes of the
/// quadratic form's eigenvalues, so a fit that bends into a hyperbola still
/// yields a box. When the conic itself cannot be solved, the second moments
/// of the points describe the ellipse instead. Returns `None` only for
/// fewer than five points.
pub fn fit_ellipse(points: &[Point<i32>]) -> Option<RotatedRect> {
    let n = points.len();
    if n < 5 {
        return None;
    }
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let centroid = (sum_x / n as f64, sum_y / n as f64);
    let spread: f64 = points
        .iter()
        .map(|p| (p.x as f64 - centroid.0).abs() + (p.y as f64 - centroid.1).abs())
        .sum();
    let scale = if spread > 0.0 { 100.0 / spread } else { 1.0 };
    let pts: Vec<(f64, f64)> = points
        .iter()
        .map(|p| ((p.x as f64 - centroid.0) * scale, (p.y as f64 - centroid.1) * scale))
        .collect();

    let fitted = fit_conic(&pts).unwrap_or_else(|| moment_ellipse(&pts));
    Some(RotatedRect {
        center: (
            fitted.center.0 / scale + centroid.0,
            fitted.center.1 / scale + centroid.1,
        ),
        width: fitted.width / scale,
        height: fitted.height / scale,
        angle: fitted.angle,
    })
}

fn fit_conic(pts: &[(f64, f64)]) -> Option<RotatedRect> {
    let n = pts.len();
    // -A x² - B y² - C xy + D x + E y = 1e4
    let conic = DMatrix::from_fn(n, 5, |i, j| {
        let (x, y) = pts[i];
        match j {
            0 => -x * x,
            1 => -y * y,
            2 => -x * y,
            3 => x,
            _ => y,
        }
    });
    let general = conic
        .svd(true, true)
        .solve(&DVector::from_element(n, 10000.0), SVD_EPSILON)
        .ok()?;

    let gradient = Matrix2::new(
        2.0 * general[0],
        general[2],
        general[2],
        2.0 * general[1],
    );
    let center = gradient
        .svd(true, true)
        .solve(&Vector2::new(general[3], general[4]), SVD_EPSILON)
        .ok()?;

    // A' (x-x0)² + B' (y-y0)² + C' (x-x0)(y-y0) = 1
    let quadratic = DMatrix::from_fn(n, 3, |i, j| {
        let (dx, dy) = (pts[i].0 - center.x, pts[i].1 - center.y);
        match j {
            0 => dx * dx,
            1 => dy * dy,
            _ => dx * dy,
        }
    });
    let q = quadratic
        .svd(true, true)
        .solve(&DVector::from_element(n, 1.0), SVD_EPSILON)
        .ok()?;

    let form = Matrix2::new(q[0], q[2] / 2.0, q[2] / 2.0, q[1]);
    let eigen = SymmetricEigen::new(form);
    let (l0, l1) = (eigen.eigenvalues[0].abs(), eigen.eigenvalues[1].abs());
    if l0 < SVD_EPSILON || l1 < SVD_EPSILON {
        return None;
    }
    let axis = eigen.eigenvectors.column(0);
    let fitted = RotatedRect {
        center: (center.x, center.y),
        width: 2.0 / l0.sqrt(),
        height: 2.0 / l1.sqrt(),
        angle: axis[1].atan2(axis[0]).to_degrees(),
    };
    let extent = 2.0 * pts.iter().map(|&(x, y)| x.hypot(y)).fold(0.0, f64::max);
    let longest = fitted.width.max(fitted.height);
    (fitted.is_finite() && longest <= MAX_AXIS_EXTENT_RATIO * extent).then_some(fitted)
}

/// Ellipse with the same second moments as `pts`, which are centered on
/// the origin. Exact for points spread evenly around an ellipse.
fn moment_ellipse(pts: &[(f64, f64)]) -> RotatedRect {
    let n = pts.len().max(1) as f64;
    let (sxx, syy, sxy) = pts.iter().fold((0.0, 0.0, 0.0), |(xx, yy, xy), &(x, y)| {
        (xx + x * x, yy + y * y, xy + x * y)
    });
    let covariance = Matrix2::new(sxx / n, sxy / n, sxy / n, syy / n);
    let eigen = SymmetricEigen::new(covariance);
    let axis = eigen.eigenvectors.column(0);
    let semi_axis = |variance: f64| (2.0 * variance.max(0.0)).sqrt();
    RotatedRect {
        center: (0.0, 0.0),
        width: 2.0 * semi_axis(eigen.eigenvalues[0]),
        height: 2.0 * semi_axis(eigen.eigenvalues[1]),
        angle: axis[1].atan2(axis[0]).to_degrees(),
    }
}

/// Positions of the convex hull's vertices within `polygon`, ascending.
pub fn hull_indices(polygon: &[Point<i32>]) -> Vec<usize> {
    if polygon.is_empty() {
        return Vec::new();
    }
    let hull = convex_hull(polygon);
    let mut indices: Vec<usize> = hull
        .iter()
        .filter_map(|h| polygon.iter().position(|p| p == h))
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// For every hull edge, the polygon point lying farthest inside it.
///
/// Edges whose enclosed points all sit on the edge produce no defect.
pub fn convexity_defects(polygon: &[Point<i32>], hull: &[usize]) -> Vec<ConvexityDefect> {
    let n = polygon.len();
    if hull.len() < 3 {
        return Vec::new();
    }
    let mut defects = Vec::new();
    for (k, &start) in hull.iter().enumerate() {
        let end = hull[(k + 1) % hull.len()];
        let (a, b) = (polygon[start], polygon[end]);
        let (ex, ey) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
        let len = (ex * ex + ey * ey).sqrt();
        if len == 0.0 {
            continue;
        }

        let mut depth = 0.0;
        let mut farthest = None;
        let mut i = (start + 1) % n;
        while i != end {
            let p = polygon[i];
            let (px, py) = ((p.x - a.x) as f64, (p.y - a.y) as f64);
            let d = (ex * py - ey * px).abs() / len;
            if d > depth {
                depth = d;
                farthest = Some(i);
            }
            i = (i + 1) % n;
        }
        if let Some(farthest) = farthest {
            defects.push(ConvexityDefect {
                start,
                end,
                farthest,
                depth,
            });
        }
    }
    defects
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
