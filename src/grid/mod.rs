//! Coarse target grid topology.
//!
//! A [`Grid`] owns the coarse cells and their deduplicated edges:
//! - every interior edge is shared by exactly two cells, which both hold the
//!   same [`EdgeIndex`]
//! - every boundary edge has a single (left) cell
//! - cell edge lists and edge cell references agree in both directions
//!
//! Grids are built from arbitrary cell polygons with [`GridTopology`], or
//! from rectilinear coordinate lines with [`Grid::rectilinear`].

mod cell;
mod topology;

pub use cell::{CoarseCell, CoarseEdge};
pub use topology::GridTopology;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThinWallError};
use crate::types::{Bounds2D, CellIndex, EdgeIndex};

/// Coarse grid of polygonal cells with shared edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Welded vertex coordinates
    pub(crate) vertices: Vec<(f64, f64)>,
    /// Cells, indexed by `CellIndex`
    pub(crate) cells: Vec<CoarseCell>,
    /// Edges, indexed by `EdgeIndex`
    pub(crate) edges: Vec<CoarseEdge>,
    /// Number of domain boundary edges
    pub(crate) n_boundary_edges: usize,
    /// Envelope of all cells
    pub(crate) bounds: Bounds2D,
}

impl Grid {
    /// Build a logically rectangular grid from coordinate lines.
    ///
    /// Cells are numbered row-major, `k = j * (xs.len() - 1) + i`, matching
    /// the (nj, ni) layout of structured ocean model grids. Both coordinate
    /// lists must be strictly increasing with at least two entries.
    ///
    /// # Example
    ///
    /// ```
    /// use thinwall_rs::grid::Grid;
    ///
    /// let grid = Grid::rectilinear(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
    /// assert_eq!(grid.n_cells(), 4);
    /// assert_eq!(grid.n_edges(), 12);
    /// assert_eq!(grid.n_boundary_edges(), 8);
    /// ```
    pub fn rectilinear(xs: &[f64], ys: &[f64]) -> Result<Self> {
        check_axis("x", xs)?;
        check_axis("y", ys)?;
        GridTopology::new(0.0).build(&rectilinear_polygons(xs, ys))
    }

    /// Build a uniform `nx` × `ny` grid covering `bounds`.
    pub fn uniform_rectangle(bounds: Bounds2D, nx: usize, ny: usize) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(ThinWallError::invalid_topology(
                "need at least one cell in each direction",
            ));
        }
        let dx = bounds.width() / nx as f64;
        let dy = bounds.height() / ny as f64;
        let xs: Vec<f64> = (0..=nx).map(|i| bounds.x_min + i as f64 * dx).collect();
        let ys: Vec<f64> = (0..=ny).map(|j| bounds.y_min + j as f64 * dy).collect();
        Self::rectilinear(&xs, &ys)
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of edges.
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of domain boundary edges.
    pub fn n_boundary_edges(&self) -> usize {
        self.n_boundary_edges
    }

    /// Number of welded vertices.
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// All cells, indexed by `CellIndex`.
    pub fn cells(&self) -> &[CoarseCell] {
        &self.cells
    }

    /// All edges, indexed by `EdgeIndex`.
    pub fn edges(&self) -> &[CoarseEdge] {
        &self.edges
    }

    /// Welded vertex coordinates.
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Cell by index.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub fn cell(&self, id: CellIndex) -> &CoarseCell {
        &self.cells[id]
    }

    /// Edge by index.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub fn edge(&self, id: EdgeIndex) -> &CoarseEdge {
        &self.edges[id]
    }

    /// Envelope of the whole grid.
    pub fn bounds(&self) -> Bounds2D {
        self.bounds
    }

    /// Total area of all cells.
    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(|c| c.area).sum()
    }

    /// The cell across `edge` from `cell`, if any.
    pub fn neighbor(&self, cell: CellIndex, edge: EdgeIndex) -> Option<CellIndex> {
        self.edges.get(edge.get())?.opposite(cell)
    }

    /// Check bidirectional cell↔edge consistency.
    pub fn validate(&self) -> Result<()> {
        for cell in &self.cells {
            for &e in &cell.edges {
                let edge = self.edges.get(e.get()).ok_or_else(|| {
                    ThinWallError::invalid_topology(format!(
                        "cell {} references missing edge {e}",
                        cell.id
                    ))
                })?;
                if !edge.touches(cell.id) {
                    return Err(ThinWallError::invalid_topology(format!(
                        "cell {} lists edge {e}, which does not reference it",
                        cell.id
                    )));
                }
            }
        }
        for edge in &self.edges {
            for c in edge.adjacent_cells() {
                let cell = self.cells.get(c.get()).ok_or_else(|| {
                    ThinWallError::invalid_topology(format!(
                        "edge {} references missing cell {c}",
                        edge.id
                    ))
                })?;
                if !cell.edges.contains(&edge.id) {
                    return Err(ThinWallError::invalid_topology(format!(
                        "edge {} references cell {c}, which does not list it",
                        edge.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_axis(name: &str, coords: &[f64]) -> Result<()> {
    if coords.len() < 2 {
        return Err(ThinWallError::invalid_topology(format!(
            "{name} coordinate list needs at least two entries"
        )));
    }
    if coords.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(ThinWallError::invalid_topology(format!(
            "{name} coordinates must be strictly increasing"
        )));
    }
    Ok(())
}

/// Cell polygons of a rectilinear grid, row-major, counter-clockwise.
///
/// Vertex order per cell: bottom-left, bottom-right, top-right, top-left.
pub fn rectilinear_polygons(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let ni = xs.len().saturating_sub(1);
    let nj = ys.len().saturating_sub(1);
    let mut polygons = Vec::with_capacity(ni * nj);
    for j in 0..nj {
        for i in 0..ni {
            polygons.push(vec![
                (xs[i], ys[j]),
                (xs[i + 1], ys[j]),
                (xs[i + 1], ys[j + 1]),
                (xs[i], ys[j + 1]),
            ]);
        }
    }
    polygons
}
