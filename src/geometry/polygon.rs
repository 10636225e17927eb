//! Simple-polygon primitives: area, containment and clipping.

use std::f64::consts::TAU;

use super::polyline::point_segment_distance;
use crate::types::Bounds2D;

/// Signed area by the shoelace formula.
///
/// Positive for counter-clockwise vertex order, negative for clockwise.
pub fn signed_area(poly: &[(f64, f64)]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let (x0, y0) = poly[i];
        let (x1, y1) = poly[(i + 1) % n];
        twice_area += x0 * y1 - x1 * y0;
    }
    0.5 * twice_area
}

/// Area centroid; falls back to the vertex average for degenerate polygons.
pub fn centroid(poly: &[(f64, f64)]) -> (f64, f64) {
    let n = poly.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let area = signed_area(poly);
    if area == 0.0 {
        let (sx, sy) = poly
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
        return (sx / n as f64, sy / n as f64);
    }

    // Shift to the first vertex to limit cancellation for large coordinates
    let (ox, oy) = poly[0];
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (x0, y0) = (poly[i].0 - ox, poly[i].1 - oy);
        let (x1, y1) = (poly[(i + 1) % n].0 - ox, poly[(i + 1) % n].1 - oy);
        let cross = x0 * y1 - x1 * y0;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    (ox + cx / (6.0 * area), oy + cy / (6.0 * area))
}

/// Distance from `p` to the polygon boundary.
fn boundary_distance(poly: &[(f64, f64)], p: (f64, f64)) -> f64 {
    let n = poly.len();
    (0..n)
        .map(|i| point_segment_distance(p, poly[i], poly[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

/// Crossing-number test, boundary behaviour unspecified.
fn crossing_inside(poly: &[(f64, f64)], p: (f64, f64)) -> bool {
    let n = poly.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > p.1) != (yj > p.1) {
            let x_cross = xi + (p.1 - yi) * (xj - xi) / (yj - yi);
            if p.0 < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether `p` lies inside the polygon or within `tol` of its boundary.
pub fn contains_point(poly: &[(f64, f64)], p: (f64, f64), tol: f64) -> bool {
    if poly.len() < 3 {
        return false;
    }
    if boundary_distance(poly, p) <= tol {
        return true;
    }
    crossing_inside(poly, p)
}

/// Share of the point `p` owned by a counter-clockwise polygon.
///
/// Within `tol` of a vertex the share is the interior angle over 2π, on a
/// side it is ½, strictly inside it is 1 and outside 0. Cells that tile
/// the plane split a point on their common boundary into shares summing
/// to 1.
pub fn boundary_share(poly: &[(f64, f64)], p: (f64, f64), tol: f64) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    for i in 0..n {
        let v = poly[i];
        if (p.0 - v.0).hypot(p.1 - v.1) <= tol {
            let next = poly[(i + 1) % n];
            let prev = poly[(i + n - 1) % n];
            let (ux, uy) = (next.0 - v.0, next.1 - v.1);
            let (wx, wy) = (prev.0 - v.0, prev.1 - v.1);
            let mut angle = (ux * wy - uy * wx).atan2(ux * wx + uy * wy);
            if angle <= 0.0 {
                angle += TAU;
            }
            return angle / TAU;
        }
    }
    if boundary_distance(poly, p) <= tol {
        0.5
    } else if crossing_inside(poly, p) {
        1.0
    } else {
        0.0
    }
}

/// A point strictly inside the polygon.
///
/// Uses the centroid when it is interior (always the case for convex cells);
/// otherwise the midpoint of the widest interior span of the horizontal
/// scanline through the centroid.
pub fn interior_point(poly: &[(f64, f64)]) -> (f64, f64) {
    let c = centroid(poly);
    if poly.len() < 3 || (crossing_inside(poly, c) && boundary_distance(poly, c) > 0.0) {
        return c;
    }

    let y = c.1;
    let n = poly.len();
    let mut xs: Vec<f64> = Vec::new();
    for i in 0..n {
        let (x0, y0) = poly[i];
        let (x1, y1) = poly[(i + 1) % n];
        if (y0 <= y) != (y1 <= y) {
            xs.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
        }
    }
    xs.sort_by(f64::total_cmp);

    xs.chunks_exact(2)
        .max_by(|a, b| (a[1] - a[0]).total_cmp(&(b[1] - b[0])))
        .map(|span| (0.5 * (span[0] + span[1]), y))
        .unwrap_or(c)
}

/// Clip a polygon against an axis-aligned rectangle (Sutherland–Hodgman).
///
/// The subject polygon may be non-convex; the rectangle is convex, so the
/// area of the result is exact even where the output contains zero-width
/// bridges.
pub fn clip_to_bounds(poly: &[(f64, f64)], bounds: &Bounds2D) -> Vec<(f64, f64)> {
    let mut output: Vec<(f64, f64)> = poly.to_vec();

    // (axis, limit, keep_greater)
    let planes = [
        (0, bounds.x_min, true),
        (0, bounds.x_max, false),
        (1, bounds.y_min, true),
        (1, bounds.y_max, false),
    ];

    for (axis, limit, keep_greater) in planes {
        if output.is_empty() {
            break;
        }
        let coord = |p: (f64, f64)| if axis == 0 { p.0 } else { p.1 };
        let inside = |p: (f64, f64)| {
            if keep_greater {
                coord(p) >= limit
            } else {
                coord(p) <= limit
            }
        };
        let intersect = |a: (f64, f64), b: (f64, f64)| {
            let t = (limit - coord(a)) / (coord(b) - coord(a));
            if axis == 0 {
                (limit, a.1 + t * (b.1 - a.1))
            } else {
                (a.0 + t * (b.0 - a.0), limit)
            }
        };

        let input = std::mem::take(&mut output);
        let n = input.len();
        for i in 0..n {
            let current = input[i];
            let previous = input[(i + n - 1) % n];
            match (inside(previous), inside(current)) {
                (true, true) => output.push(current),
                (true, false) => output.push(intersect(previous, current)),
                (false, true) => {
                    output.push(intersect(previous, current));
                    output.push(current);
                }
                (false, false) => {}
            }
        }
    }

    output
}

/// Area of the intersection of a polygon with an axis-aligned rectangle.
pub fn overlap_area(poly: &[(f64, f64)], bounds: &Bounds2D) -> f64 {
    signed_area(&clip_to_bounds(poly, bounds)).abs()
}
