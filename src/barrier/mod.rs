//! Thin-wall barrier depths.
//!
//! The barrier of an edge is the minimax crossing level: over every path
//! through the edge corridor from the first cell's side to the second's,
//! the lowest possible value of the highest sample on the path. A single
//! shallow sill that spans the corridor sets the barrier, while a deeper
//! gap anywhere in the corridor lets flow route around it.
//!
//! Boundary edges have no far side and report the corridor minimum.

mod corridor;
mod solver;
mod union_find;

pub use corridor::{Corridor, CorridorSample, Side};
pub use solver::{BarrierOutcome, BarrierSolver};
pub use union_find::DisjointSet;
