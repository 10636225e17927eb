//! Cell, u-edge and v-edge statistics of one structured grid level.

use serde::{Deserialize, Serialize};

use super::array::StatsArray;
use crate::elevation::ElevationStats;
use crate::error::{Result, ThinWallError};

/// Statistics of every cell and face of an `nj` × `ni` structured grid.
///
/// - `cells` has shape `(nj, ni)`
/// - `u` holds the west face of each cell plus the east boundary, shape
///   `(nj, ni + 1)`
/// - `v` holds the south face of each cell plus the north boundary, shape
///   `(nj + 1, ni)`
///
/// Values are obstruction levels: larger values block more.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThinWallLayer {
    /// Cell statistics
    pub cells: StatsArray,
    /// West/east face statistics
    pub u: StatsArray,
    /// South/north face statistics
    pub v: StatsArray,
}

impl ThinWallLayer {
    /// Assemble a layer, checking that the face arrays fit the cells.
    pub fn new(cells: StatsArray, u: StatsArray, v: StatsArray) -> Result<Self> {
        let (nj, ni) = cells.shape();
        if nj == 0 || ni == 0 {
            return Err(ThinWallError::invalid_topology("structured layer has no cells"));
        }
        if u.shape() != (nj, ni + 1) || v.shape() != (nj + 1, ni) {
            return Err(ThinWallError::invalid_topology(format!(
                "face arrays {:?} and {:?} do not fit {nj} x {ni} cells",
                u.shape(),
                v.shape()
            )));
        }
        Ok(Self { cells, u, v })
    }

    /// Number of cell rows.
    pub fn nj(&self) -> usize {
        self.cells.shape().0
    }

    /// Number of cell columns.
    pub fn ni(&self) -> usize {
        self.cells.shape().1
    }

    /// Replace every face with step topography: the higher of the two
    /// adjacent cell means, or the single cell mean on the boundary.
    pub fn set_faces_to_step(&mut self) {
        let (nj, ni) = (self.nj(), self.ni());
        let mean = &self.cells.mean;
        self.u = StatsArray::from_fn(nj, ni + 1, |j, i| {
            let west = i.checked_sub(1).map(|w| mean[(j, w)]);
            let east = (i < ni).then(|| mean[(j, i)]);
            ElevationStats::constant(step(west, east))
        });
        self.v = StatsArray::from_fn(nj + 1, ni, |j, i| {
            let south = j.checked_sub(1).map(|s| mean[(s, i)]);
            let north = (j < nj).then(|| mean[(j, i)]);
            ElevationStats::constant(step(south, north))
        });
    }

    /// Merge each 2 × 2 block of cells into one cell of half the resolution.
    ///
    /// Lows take the minimum, means the average and highs the maximum of
    /// their members. Each coarse face merges the two fine faces along it.
    pub(crate) fn coarsened(&self) -> Self {
        Self {
            cells: self.cells.reduce_blocks(),
            u: self.u.reduce_u_pairs(),
            v: self.v.reduce_v_pairs(),
        }
    }

    pub(crate) fn flip_j(&mut self) {
        self.cells.flip_j();
        self.u.flip_j();
        self.v.flip_j();
    }

    pub(crate) fn flip_i(&mut self) {
        self.cells.flip_i();
        self.u.flip_i();
        self.v.flip_i();
    }

    /// Swap the roles of j and i. West faces become south faces.
    pub(crate) fn transpose(&mut self) {
        let cells = self.cells.transposed();
        let u = self.v.transposed();
        let v = self.u.transposed();
        *self = Self { cells, u, v };
    }
}

fn step(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a.max(b),
        (Some(x), None) | (None, Some(x)) => x,
        (None, None) => f64::NAN,
    }
}
