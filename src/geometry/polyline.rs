//! Distances and side tests against segments and polylines.

/// Euclidean distance from `p` to the closed segment `a`–`b`.
pub fn point_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (p.0 - a.0).hypot(p.1 - a.1);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    (p.0 - cx).hypot(p.1 - cy)
}

/// Distance from `p` to the nearest point of a polyline.
///
/// Returns `f64::INFINITY` for an empty polyline.
pub fn distance_to_polyline(p: (f64, f64), line: &[(f64, f64)]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => (p.0 - only.0).hypot(p.1 - only.1),
        _ => line
            .windows(2)
            .map(|w| point_segment_distance(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Distance from `p` to a polyline with flat end caps.
///
/// A segment only counts when the projection of `p` falls within it,
/// extended by `tol` at both ends; interior vertices count as round joins.
/// Points beyond either end of the polyline are at `f64::INFINITY`.
pub fn flat_cap_distance(p: (f64, f64), line: &[(f64, f64)], tol: f64) -> f64 {
    let mut best = f64::INFINITY;
    for w in line.windows(2) {
        let (a, b) = (w[0], w[1]);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = dx.hypot(dy);
        if len == 0.0 {
            continue;
        }
        let along = ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len;
        if along >= -tol && along <= len + tol {
            let across = (dx * (p.1 - a.1) - dy * (p.0 - a.0)).abs() / len;
            best = best.min(across);
        }
    }
    if line.len() > 2 {
        for v in &line[1..line.len() - 1] {
            best = best.min((p.0 - v.0).hypot(p.1 - v.1));
        }
    }
    best
}

/// Total length of a polyline.
pub fn polyline_length(line: &[(f64, f64)]) -> f64 {
    line.windows(2)
        .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
        .sum()
}

/// Signed perpendicular offset of `p` from a polyline.
///
/// The offset is measured against the infinite line through the segment
/// nearest to `p` (first one wins on ties). Positive values lie to the left
/// of the polyline's direction of travel, negative values to the right.
/// Returns 0.0 for a polyline with fewer than two points.
pub fn signed_offset(p: (f64, f64), line: &[(f64, f64)]) -> f64 {
    let mut best_dist = f64::INFINITY;
    let mut best_offset = 0.0;
    for w in line.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = (b.0 - a.0).hypot(b.1 - a.1);
        if len == 0.0 {
            continue;
        }
        let dist = point_segment_distance(p, a, b);
        if dist < best_dist {
            best_dist = dist;
            best_offset = ((b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)) / len;
        }
    }
    best_offset
}

/// Whether `p` lies on the segment `a`–`b`, excluding neighbourhoods of
/// radius `tol` around both endpoints.
pub fn segment_interior_contains(p: (f64, f64), a: (f64, f64), b: (f64, f64), tol: f64) -> bool {
    if (p.0 - a.0).hypot(p.1 - a.1) <= tol || (p.0 - b.0).hypot(p.1 - b.1) <= tol {
        return false;
    }
    point_segment_distance(p, a, b) <= tol
}

/// Whether segments `a`–`b` and `c`–`d` cross at a point interior to both.
///
/// Each segment must have its endpoints strictly on opposite sides of the
/// other's line, more than `tol` away from it. Touching, shared endpoints
/// and collinear overlap do not count.
pub fn segments_cross(
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    d: (f64, f64),
    tol: f64,
) -> bool {
    let straddles = |s: f64, t: f64| (s > tol && t < -tol) || (s < -tol && t > tol);
    straddles(line_offset(c, a, b), line_offset(d, a, b))
        && straddles(line_offset(a, c, d), line_offset(b, c, d))
}

/// Signed distance of `p` from the infinite line through `a` and `b`.
fn line_offset(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let len = (b.0 - a.0).hypot(b.1 - a.1);
    if len == 0.0 {
        return 0.0;
    }
    ((b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)) / len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_segment_distance() {
        let a = (0.0, 0.0);
        let b = (4.0, 0.0);
        assert!((point_segment_distance((2.0, 3.0), a, b) - 3.0).abs() < 1e-12);
        // Beyond the end: distance to the endpoint
        assert!((point_segment_distance((7.0, 4.0), a, b) - 5.0).abs() < 1e-12);
        // Degenerate segment
        assert!((point_segment_distance((3.0, 4.0), a, a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_polyline() {
        let line = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)];
        assert!((distance_to_polyline((2.0, 0.5), &line) - 1.0).abs() < 1e-12);
        assert!((distance_to_polyline((0.5, -0.25), &line) - 0.25).abs() < 1e-12);
        assert_eq!(distance_to_polyline((0.0, 0.0), &[]), f64::INFINITY);
    }

    #[test]
    fn test_flat_cap_distance_stops_at_ends() {
        let line = [(1.0, 0.0), (1.0, 3.0)];
        assert!((flat_cap_distance((0.5, 2.0), &line, 0.0) - 0.5).abs() < 1e-12);
        assert_eq!(flat_cap_distance((1.0, 3.0), &line, 0.0), 0.0);
        // Round caps would put this at 0.5
        assert_eq!(flat_cap_distance((1.0, 3.5), &line, 1e-9), f64::INFINITY);
        assert_eq!(flat_cap_distance((1.0, -0.5), &line, 1e-9), f64::INFINITY);
    }

    #[test]
    fn test_flat_cap_distance_joins_are_round() {
        let line = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)];
        // Outside the bend, beyond both segment spans
        let d = flat_cap_distance((2.3, -0.4), &line, 0.0);
        assert!((d - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_segments_cross() {
        let tol = 1e-9;
        assert!(segments_cross((0.0, -1.0), (0.0, 1.0), (-1.0, 0.0), (1.0, 0.0), tol));
        // Shared endpoint
        assert!(!segments_cross((0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0), tol));
        // T-contact
        assert!(!segments_cross((0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (1.0, 1.0), tol));
        // Collinear overlap
        assert!(!segments_cross((0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (3.0, 0.0), tol));
        // Lines cross but the segments do not reach
        assert!(!segments_cross((0.0, 1.0), (0.0, 2.0), (-1.0, 0.0), (1.0, 0.0), tol));
    }

    #[test]
    fn test_polyline_length() {
        let line = [(0.0, 0.0), (3.0, 4.0), (3.0, 5.0)];
        assert!((polyline_length(&line) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_offset_sides() {
        // Edge running north: west is left, east is right
        let line = [(1.0, 0.0), (1.0, 2.0)];
        assert!((signed_offset((0.5, 1.0), &line) - 0.5).abs() < 1e-12);
        assert!((signed_offset((1.25, 1.0), &line) + 0.25).abs() < 1e-12);
        assert_eq!(signed_offset((1.0, 1.0), &line), 0.0);
    }

    #[test]
    fn test_segment_interior_contains() {
        let a = (0.0, 0.0);
        let b = (2.0, 0.0);
        assert!(segment_interior_contains((1.0, 0.0), a, b, 1e-9));
        assert!(!segment_interior_contains((2.0, 0.0), a, b, 1e-9));
        assert!(!segment_interior_contains((1.0, 0.1), a, b, 1e-9));
    }
}
