//! Coarse cell and edge records.

use serde::{Deserialize, Serialize};

use crate::types::{Bounds2D, CellIndex, EdgeIndex, VertexIndex};

/// A coarse grid cell.
///
/// The polygon is stored counter-clockwise without a repeated closing vertex.
/// `edges[f]` is the edge running from `vertices[f]` to `vertices[f + 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoarseCell {
    /// Cell identity
    pub id: CellIndex,
    /// Welded vertex indices, counter-clockwise
    pub vertices: Vec<VertexIndex>,
    /// Vertex coordinates, counter-clockwise
    pub polygon: Vec<(f64, f64)>,
    /// Bounding edges, one per polygon side
    pub edges: Vec<EdgeIndex>,
    /// Polygon area (positive)
    pub area: f64,
    /// Axis-aligned envelope of the polygon
    pub bounds: Bounds2D,
}

impl CoarseCell {
    /// Number of polygon sides.
    pub fn n_sides(&self) -> usize {
        self.edges.len()
    }
}

/// A coarse grid edge shared by one or two cells.
///
/// The geometry runs from `vertices.0` to `vertices.1`. The `left` cell lies
/// to the left of that direction of travel; `right` is the cell on the other
/// side, or `None` on the domain boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoarseEdge {
    /// Edge identity
    pub id: EdgeIndex,
    /// Welded endpoints in geometry order
    pub vertices: (VertexIndex, VertexIndex),
    /// Cell on the left of the edge (always present)
    pub left: CellIndex,
    /// Cell on the right of the edge (None for boundary edges)
    pub right: Option<CellIndex>,
    /// Ordered vertex sequence of the edge line
    pub geometry: Vec<(f64, f64)>,
}

impl CoarseEdge {
    /// Check if this is a domain boundary edge.
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }

    /// Check if this is an interior edge.
    pub fn is_interior(&self) -> bool {
        self.right.is_some()
    }

    /// The one or two adjacent cells, left first.
    pub fn adjacent_cells(&self) -> Vec<CellIndex> {
        std::iter::once(self.left).chain(self.right).collect()
    }

    /// Whether `cell` is adjacent to this edge.
    pub fn touches(&self, cell: CellIndex) -> bool {
        self.left == cell || self.right == Some(cell)
    }

    /// The cell across this edge from `cell`.
    pub fn opposite(&self, cell: CellIndex) -> Option<CellIndex> {
        if self.left == cell {
            self.right
        } else if self.right == Some(cell) {
            Some(self.left)
        } else {
            None
        }
    }

    /// Length of the edge line.
    pub fn length(&self) -> f64 {
        crate::geometry::polyline_length(&self.geometry)
    }

    /// Axis-aligned envelope of the edge line.
    pub fn bounds(&self) -> Bounds2D {
        Bounds2D::from_points(self.geometry.iter().copied())
            .unwrap_or_else(|| Bounds2D::new(0.0, 0.0, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(right: Option<usize>) -> CoarseEdge {
        CoarseEdge {
            id: EdgeIndex::new(0),
            vertices: (VertexIndex::new(0), VertexIndex::new(1)),
            left: CellIndex::new(4),
            right: right.map(CellIndex::new),
            geometry: vec![(0.0, 0.0), (0.0, 2.0)],
        }
    }

    #[test]
    fn test_interior_edge() {
        let e = edge(Some(7));
        assert!(e.is_interior());
        assert_eq!(e.adjacent_cells(), vec![CellIndex::new(4), CellIndex::new(7)]);
        assert_eq!(e.opposite(CellIndex::new(4)), Some(CellIndex::new(7)));
        assert_eq!(e.opposite(CellIndex::new(7)), Some(CellIndex::new(4)));
        assert_eq!(e.opposite(CellIndex::new(1)), None);
        assert!((e.length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_edge() {
        let e = edge(None);
        assert!(e.is_boundary());
        assert_eq!(e.adjacent_cells(), vec![CellIndex::new(4)]);
        assert_eq!(e.opposite(CellIndex::new(4)), None);
        assert_eq!(e.bounds().width(), 0.0);
    }
}
