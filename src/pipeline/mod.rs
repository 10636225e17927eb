//! End-to-end thin-wall topography runs.
//!
//! [`ThinWallPipeline`] validates the configuration, builds the coarse grid
//! topology and the sample index, then runs the cell pass and the edge pass.
//! The two passes are independent and run concurrently with the `parallel`
//! feature. Per-entity coverage problems end up in the
//! [`CoverageReport`]; only configuration and topology errors abort a run.

mod config;
mod orchestrator;
mod output;

pub use config::{ResolvedConfig, ThinWallConfig};
pub use orchestrator::ThinWallPipeline;
pub use output::{CellRecord, CoverageReport, EdgeRecord, TopographyDataset};
