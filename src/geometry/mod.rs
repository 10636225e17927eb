//! Planar geometry primitives.
//!
//! Points are `(x, y)` tuples, polygons are ordered vertex slices without a
//! repeated closing vertex, and polylines are ordered vertex slices with at
//! least two points. All distances are measured in the coordinate units of
//! the input; no projection is applied.

mod polygon;
mod polyline;

pub use polygon::{
    boundary_share, centroid, clip_to_bounds, contains_point, interior_point, overlap_area,
    signed_area,
};
pub use polyline::{
    distance_to_polyline, flat_cap_distance, point_segment_distance, polyline_length,
    segment_interior_contains, segments_cross, signed_offset,
};

/// Relative tolerance used when classifying points against boundaries.
pub const REL_EPS: f64 = 1e-9;
