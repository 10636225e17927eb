//! # thinwall-rs
//!
//! Thin-wall topography for coarse ocean and atmosphere model grids.
//!
//! Given fine-resolution elevation samples and a coarse grid of polygonal
//! cells, this crate computes:
//! - a mean depth per coarse cell (uniform or fractional-area weighted)
//! - a barrier depth per coarse edge: the minimax crossing level through the
//!   edge corridor, so narrow sills and ridges that block exchange between
//!   cells survive the coarsening
//!
//! Building blocks:
//! - Strongly typed indices and envelopes ([`types`])
//! - Planar geometry primitives ([`geometry`])
//! - Coarse grid topology with shared edges ([`grid`])
//! - Fine sample field and R-tree index ([`elevation`])
//! - Cell aggregation ([`aggregate`]) and barrier search ([`barrier`])
//! - End-to-end runs ([`pipeline`])
//! - Structured refinement and 2 × 2 coarsening ([`refine`])

pub mod aggregate;
pub mod barrier;
pub mod elevation;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod pipeline;
pub mod refine;
pub mod types;

// Re-export main types for convenience
pub use aggregate::{AggregationWeighting, CellAggregator};
pub use barrier::{BarrierOutcome, BarrierSolver};
pub use elevation::{
    CoordinateReference, ElevationField, ElevationStats, FineSample, SourceIndex, ValueConvention,
};
pub use error::{Result, ThinWallError};
pub use grid::{CoarseCell, CoarseEdge, Grid, GridTopology};
pub use pipeline::{
    CellRecord, CoverageReport, EdgeRecord, ThinWallConfig, ThinWallPipeline, TopographyDataset,
};
pub use refine::{Measure, StructuredTopography};
pub use types::{Bounds2D, CellIndex, CoverageFlag, EdgeIndex, SampleIndex, VertexIndex};
