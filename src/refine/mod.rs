//! Thin-wall refinement on structured grids.
//!
//! A rectilinear dataset is viewed as `nj` × `ni` cells with u (west/east)
//! and v (south/north) faces. Alongside the simple statistics, an effective
//! copy is adjusted block by block so that walls and channels inside each
//! 2 × 2 block are represented on the block's outer faces, then the grid
//! can be coarsened by a factor of two.

mod adjust;
mod array;
mod layer;
mod structured;

pub use array::{Array2, StatsArray};
pub use layer::ThinWallLayer;
pub use structured::{Measure, StructuredTopography};
