//! Grid construction from cell polygons.
//!
//! Builds the cell↔edge adjacency of a coarse grid from an unordered set of
//! cell polygons:
//!
//! 1. Vertices closer than the tolerance are welded into one grid vertex.
//! 2. Polygons are normalised (closing vertex dropped, collapsed vertices
//!    removed, counter-clockwise orientation).
//! 3. Polygon sides are deduplicated on their welded endpoint pair, so two
//!    adjacent cells reference the same [`CoarseEdge`].
//! 4. The result is checked for a consistent tiling: no edge with more than
//!    two cells, no overlapping cells, no T-junctions and no interior holes.

use std::collections::HashMap;

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use tracing::debug;

use super::cell::{CoarseCell, CoarseEdge};
use super::Grid;
use crate::error::{Result, ThinWallError};
use crate::geometry::{
    contains_point, interior_point, point_segment_distance, segment_interior_contains,
    segments_cross, signed_area,
};
use crate::types::{Bounds2D, CellIndex, EdgeIndex, VertexIndex};

type EnvelopeEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Builder for [`Grid`] values.
///
/// # Example
///
/// ```
/// use thinwall_rs::grid::GridTopology;
///
/// let polygons = vec![
///     vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
///     vec![(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)],
/// ];
/// let grid = GridTopology::new(1e-6).build(&polygons).unwrap();
///
/// assert_eq!(grid.n_cells(), 2);
/// assert_eq!(grid.n_edges(), 7);
/// assert_eq!(grid.n_boundary_edges(), 6);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GridTopology {
    tolerance: f64,
}

impl GridTopology {
    /// Create a builder that welds vertices closer than `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Welding and classification tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Build a grid from cell polygons.
    ///
    /// Cell `k` of the result corresponds to `polygons[k]`.
    pub fn build(&self, polygons: &[Vec<(f64, f64)>]) -> Result<Grid> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ThinWallError::InvalidConfig(format!(
                "topology tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if polygons.is_empty() {
            return Err(ThinWallError::invalid_topology("grid has no cells"));
        }

        let mut welder = VertexWelder::new(self.tolerance);
        let mut rings = Vec::with_capacity(polygons.len());
        for (k, polygon) in polygons.iter().enumerate() {
            rings.push(normalise_ring(k, polygon, &mut welder)?);
        }
        let vertices = welder.into_vertices();

        let (cells, edges) = connect(&rings, &vertices)?;
        let n_boundary_edges = edges.iter().filter(|e| e.is_boundary()).count();

        debug!(
            n_cells = cells.len(),
            n_edges = edges.len(),
            n_boundary_edges,
            n_vertices = vertices.len(),
            "Resolved cell-edge adjacency"
        );

        check_conforming(&vertices, &edges, self.tolerance)?;
        check_boundary_loops(&vertices, &edges)?;
        check_overlaps(&cells, self.tolerance)?;

        let bounds = cells
            .iter()
            .map(|c| c.bounds)
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| ThinWallError::invalid_topology("grid has no cells"))?;

        let grid = Grid {
            vertices,
            cells,
            edges,
            n_boundary_edges,
            bounds,
        };
        grid.validate()?;
        Ok(grid)
    }
}

/// Snaps nearby vertices onto one shared vertex.
///
/// Vertices are bucketed on a square lattice of side `tolerance`, so only the
/// 3×3 neighbouring buckets need to be searched. First-seen wins.
struct VertexWelder {
    tolerance: f64,
    bucket: f64,
    buckets: HashMap<(i64, i64), Vec<VertexIndex>>,
    vertices: Vec<(f64, f64)>,
}

impl VertexWelder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            bucket: if tolerance > 0.0 { tolerance } else { 1.0 },
            buckets: HashMap::new(),
            vertices: Vec::new(),
        }
    }

    fn key(&self, p: (f64, f64)) -> (i64, i64) {
        (
            (p.0 / self.bucket).floor() as i64,
            (p.1 / self.bucket).floor() as i64,
        )
    }

    fn weld(&mut self, p: (f64, f64)) -> VertexIndex {
        let (kx, ky) = self.key(p);
        let mut best: Option<VertexIndex> = None;
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                let Some(candidates) = self.buckets.get(&(kx.saturating_add(dx), ky.saturating_add(dy)))
                else {
                    continue;
                };
                for &v in candidates {
                    let q = self.vertices[v];
                    if (p.0 - q.0).hypot(p.1 - q.1) <= self.tolerance
                        && best.map_or(true, |b| v < b)
                    {
                        best = Some(v);
                    }
                }
            }
        }
        if let Some(v) = best {
            return v;
        }

        let v = VertexIndex::new(self.vertices.len());
        self.vertices.push(p);
        self.buckets.entry((kx, ky)).or_default().push(v);
        v
    }

    fn into_vertices(self) -> Vec<(f64, f64)> {
        self.vertices
    }
}

/// Weld, de-duplicate and orient one polygon. Returns its CCW vertex ring.
fn normalise_ring(
    k: usize,
    polygon: &[(f64, f64)],
    welder: &mut VertexWelder,
) -> Result<Vec<VertexIndex>> {
    let cell = CellIndex::new(k);
    if let Some(p) = polygon.iter().find(|p| !(p.0.is_finite() && p.1.is_finite())) {
        return Err(ThinWallError::invalid_topology(format!(
            "cell {cell} has a non-finite vertex ({}, {})",
            p.0, p.1
        )));
    }

    let mut ring: Vec<VertexIndex> = Vec::with_capacity(polygon.len());
    for &p in polygon {
        let v = welder.weld(p);
        if ring.last() != Some(&v) {
            ring.push(v);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(ThinWallError::invalid_topology(format!(
            "cell {cell} has fewer than 3 distinct vertices"
        )));
    }

    let coords: Vec<(f64, f64)> = ring.iter().map(|&v| welder.vertices[v]).collect();
    let area = signed_area(&coords);
    if area == 0.0 || !area.is_finite() {
        return Err(ThinWallError::invalid_topology(format!(
            "cell {cell} has zero area"
        )));
    }
    if area < 0.0 {
        ring.reverse();
    }
    Ok(ring)
}

/// Deduplicate polygon sides into shared edges.
fn connect(
    rings: &[Vec<VertexIndex>],
    vertices: &[(f64, f64)],
) -> Result<(Vec<CoarseCell>, Vec<CoarseEdge>)> {
    let mut edges: Vec<CoarseEdge> = Vec::new();
    let mut edge_lookup: HashMap<(VertexIndex, VertexIndex), EdgeIndex> = HashMap::new();
    let mut cells = Vec::with_capacity(rings.len());

    for (k, ring) in rings.iter().enumerate() {
        let cell = CellIndex::new(k);
        let n = ring.len();
        let mut cell_edges = Vec::with_capacity(n);

        for f in 0..n {
            let (a, b) = (ring[f], ring[(f + 1) % n]);
            let key = (a.min(b), a.max(b));

            let edge_idx = match edge_lookup.get(&key) {
                None => {
                    let id = EdgeIndex::new(edges.len());
                    edges.push(CoarseEdge {
                        id,
                        vertices: (a, b),
                        left: cell,
                        right: None,
                        geometry: vec![vertices[a], vertices[b]],
                    });
                    edge_lookup.insert(key, id);
                    id
                }
                Some(&id) => {
                    let edge = &mut edges[id];
                    if edge.left == cell {
                        return Err(ThinWallError::invalid_topology(format!(
                            "cell {cell} traverses edge {id} twice"
                        )));
                    }
                    if let Some(other) = edge.right {
                        return Err(ThinWallError::invalid_topology(format!(
                            "edge {id} is shared by more than two cells ({}, {other}, {cell})",
                            edge.left
                        )));
                    }
                    if edge.vertices == (a, b) {
                        return Err(ThinWallError::invalid_topology(format!(
                            "cells {} and {cell} overlap along edge {id}",
                            edge.left
                        )));
                    }
                    edge.right = Some(cell);
                    id
                }
            };
            cell_edges.push(edge_idx);
        }

        let polygon: Vec<(f64, f64)> = ring.iter().map(|&v| vertices[v]).collect();
        let area = signed_area(&polygon);
        let bounds = Bounds2D::from_points(polygon.iter().copied())
            .ok_or_else(|| ThinWallError::invalid_topology(format!("cell {cell} is empty")))?;
        cells.push(CoarseCell {
            id: cell,
            vertices: ring.clone(),
            polygon,
            edges: cell_edges,
            area,
            bounds,
        });
    }

    Ok((cells, edges))
}

/// Reject grid vertices that lie inside another edge (hanging nodes).
fn check_conforming(vertices: &[(f64, f64)], edges: &[CoarseEdge], tolerance: f64) -> Result<()> {
    let entries: Vec<EnvelopeEntry> = edges
        .iter()
        .map(|e| {
            let (lo, hi) = e.bounds().buffered(tolerance).corners();
            GeomWithData::new(Rectangle::from_corners(lo, hi), e.id.get())
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    for (v, &p) in vertices.iter().enumerate() {
        let v = VertexIndex::new(v);
        let query = AABB::from_point([p.0, p.1]);
        for entry in tree.locate_in_envelope_intersecting(&query) {
            let edge = &edges[entry.data];
            if edge.vertices.0 == v || edge.vertices.1 == v {
                continue;
            }
            let (a, b) = (edge.geometry[0], edge.geometry[edge.geometry.len() - 1]);
            if segment_interior_contains(p, a, b, tolerance) {
                return Err(ThinWallError::invalid_topology(format!(
                    "vertex {v} at ({}, {}) lies inside edge {} (non-conforming cells)",
                    p.0, p.1, edge.id
                )));
            }
        }
    }
    Ok(())
}

/// Trace the domain boundary into closed loops and reject clockwise ones.
///
/// Boundary edges keep the counter-clockwise direction of their only cell,
/// so outer boundaries close counter-clockwise and interior holes (gaps in
/// the tiling) close clockwise. Where several boundary edges leave one
/// vertex the tightest right turn is taken, which keeps each uncovered
/// region on its own loop.
fn check_boundary_loops(vertices: &[(f64, f64)], edges: &[CoarseEdge]) -> Result<()> {
    let boundary: Vec<&CoarseEdge> = edges.iter().filter(|e| e.is_boundary()).collect();
    let mut outgoing: HashMap<VertexIndex, Vec<usize>> = HashMap::new();
    for (i, e) in boundary.iter().enumerate() {
        outgoing.entry(e.vertices.0).or_default().push(i);
    }
    let direction = |i: usize| {
        let (a, b) = boundary[i].vertices;
        (vertices[b].0 - vertices[a].0, vertices[b].1 - vertices[a].1)
    };

    let mut visited = vec![false; boundary.len()];
    for start in 0..boundary.len() {
        if visited[start] {
            continue;
        }
        let mut ring: Vec<(f64, f64)> = Vec::new();
        let mut current = start;
        let closes = loop {
            visited[current] = true;
            let edge = boundary[current];
            ring.push(vertices[edge.vertices.0]);

            let incoming = direction(current);
            let next = outgoing.get(&edge.vertices.1).and_then(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .filter(|&c| c == start || !visited[c])
                    .min_by(|&a, &b| {
                        turning_angle(incoming, direction(a))
                            .total_cmp(&turning_angle(incoming, direction(b)))
                    })
            });
            match next {
                Some(n) if n == start => break true,
                Some(n) => current = n,
                None => break false,
            }
        };

        if !closes {
            return Err(ThinWallError::invalid_topology(format!(
                "domain boundary starting at edge {} does not close",
                boundary[start].id
            )));
        }
        let area = signed_area(&ring);
        if area < 0.0 {
            return Err(ThinWallError::invalid_topology(format!(
                "gap in the tiling: boundary loop through edge {} encloses an uncovered area of {}",
                boundary[start].id, -area
            )));
        }
    }
    Ok(())
}

/// Signed angle in (-π, π] from direction `u` to direction `v`.
fn turning_angle(u: (f64, f64), v: (f64, f64)) -> f64 {
    (u.0 * v.1 - u.1 * v.0).atan2(u.0 * v.0 + u.1 * v.1)
}

/// Reject cells that overlap another cell.
///
/// Two cells overlap when a test point of one (its interior point or any
/// vertex) lies strictly inside the other, or when a side of one properly
/// crosses a side of the other.
fn check_overlaps(cells: &[CoarseCell], tolerance: f64) -> Result<()> {
    let entries: Vec<EnvelopeEntry> = cells
        .iter()
        .map(|c| {
            let (lo, hi) = c.bounds.corners();
            GeomWithData::new(Rectangle::from_corners(lo, hi), c.id.get())
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    for cell in cells {
        // Any vertex or the interior point strictly inside another cell
        let points = std::iter::once(interior_point(&cell.polygon)).chain(cell.polygon.iter().copied());
        for p in points {
            for entry in tree.locate_in_envelope_intersecting(&AABB::from_point([p.0, p.1])) {
                if entry.data == cell.id.get() {
                    continue;
                }
                let other = &cells[entry.data];
                let strictly_inside = contains_point(&other.polygon, p, 0.0)
                    && !contains_point_boundary(&other.polygon, p, tolerance);
                if strictly_inside {
                    return Err(ThinWallError::invalid_topology(format!(
                        "cells {} and {} overlap",
                        cell.id, other.id
                    )));
                }
            }
        }

        let (lo, hi) = cell.bounds.corners();
        for entry in tree.locate_in_envelope_intersecting(&AABB::from_corners(lo, hi)) {
            if entry.data <= cell.id.get() {
                continue;
            }
            let other = &cells[entry.data];
            if sides_cross(&cell.polygon, &other.polygon, tolerance) {
                return Err(ThinWallError::invalid_topology(format!(
                    "cells {} and {} overlap (crossing sides)",
                    cell.id, other.id
                )));
            }
        }
    }
    Ok(())
}

fn contains_point_boundary(poly: &[(f64, f64)], p: (f64, f64), tolerance: f64) -> bool {
    let n = poly.len();
    (0..n).any(|i| point_segment_distance(p, poly[i], poly[(i + 1) % n]) <= tolerance)
}

fn sides_cross(a: &[(f64, f64)], b: &[(f64, f64)], tolerance: f64) -> bool {
    let (n, m) = (a.len(), b.len());
    (0..n).any(|i| {
        (0..m).any(|j| segments_cross(a[i], a[(i + 1) % n], b[j], b[(j + 1) % m], tolerance))
    })
}
