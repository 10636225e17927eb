//! Strongly-typed domain types for safer APIs.
//!
//! Cells, edges, welded grid vertices and fine samples are all addressed by
//! plain `usize` positions internally; the newtypes here keep them apart at
//! API boundaries. [`CoverageFlag`] is the per-entity status reported
//! alongside every cell and edge value.
//!
//! # Example
//!
//! ```
//! use thinwall_rs::types::{Bounds2D, CellIndex, EdgeIndex};
//!
//! let cell = CellIndex::new(3);
//! let edge = EdgeIndex::new(3);
//! assert_eq!(cell.get(), edge.get());
//! assert_eq!(format!("{cell} {edge}"), "C3 E3");
//!
//! let bounds = Bounds2D::from_points([(0.0, 0.0), (2.0, 1.0)]).unwrap();
//! assert_eq!(bounds.width(), 2.0);
//! ```

mod bounds;
mod coverage;
mod indices;

pub use bounds::Bounds2D;
pub use coverage::CoverageFlag;
pub use indices::{CellIndex, EdgeIndex, SampleIndex, VertexIndex};
