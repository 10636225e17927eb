//! Run sequencing: topology, index, cell pass, edge pass.

use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::aggregate::CellAggregator;
use crate::barrier::BarrierSolver;
use crate::elevation::{ElevationField, SourceIndex, ValueConvention};
use crate::error::Result;
use crate::grid::{CoarseEdge, Grid, GridTopology};

use super::config::{ResolvedConfig, ThinWallConfig};
use super::output::{CellRecord, CoverageReport, EdgeRecord, TopographyDataset};

/// Builds a [`TopographyDataset`] from cell polygons and fine samples.
///
/// # Example
///
/// ```
/// use thinwall_rs::elevation::{CoordinateReference, ElevationField, ValueConvention};
/// use thinwall_rs::grid::rectilinear_polygons;
/// use thinwall_rs::pipeline::{ThinWallConfig, ThinWallPipeline};
///
/// let depths = vec![10.0; 16];
/// let field = ElevationField::from_regular_grid(
///     CoordinateReference::Planar,
///     (0.25, 0.25),
///     0.5,
///     4,
///     4,
///     &depths,
/// )
/// .unwrap();
///
/// let pipeline =
///     ThinWallPipeline::new(ThinWallConfig::new().with_value_convention(ValueConvention::Depth));
/// let dataset = pipeline
///     .run(&rectilinear_polygons(&[0.0, 1.0, 2.0], &[0.0, 2.0]), &field)
///     .unwrap();
///
/// assert_eq!(dataset.mean_depths(), vec![Some(10.0), Some(10.0)]);
/// assert!(dataset.report().is_complete());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ThinWallPipeline {
    config: ThinWallConfig,
}

impl ThinWallPipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: ThinWallConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &ThinWallConfig {
        &self.config
    }

    /// Build the grid from cell polygons and populate it.
    ///
    /// Configuration and topology errors abort before any aggregation.
    pub fn run(&self, polygons: &[Vec<(f64, f64)>], field: &ElevationField) -> Result<TopographyDataset> {
        let resolved = self.config.resolve(field.spacing())?;
        let grid = GridTopology::new(resolved.topology_tolerance).build(polygons)?;
        Ok(populate(grid, field, &resolved))
    }

    /// Populate an existing grid.
    pub fn run_on_grid(&self, grid: &Grid, field: &ElevationField) -> Result<TopographyDataset> {
        let resolved = self.config.resolve(field.spacing())?;
        grid.validate()?;
        Ok(populate(grid.clone(), field, &resolved))
    }
}

fn populate(grid: Grid, field: &ElevationField, config: &ResolvedConfig) -> TopographyDataset {
    let span = info_span!(
        "thinwall",
        n_cells = grid.n_cells(),
        n_edges = grid.n_edges(),
        n_samples = field.len()
    );
    let _enter = span.enter();
    info!(
        corridor_half_width = config.corridor_half_width,
        neighbour_radius = config.neighbour_radius,
        weighting = ?config.weighting,
        convention = ?config.convention,
        "Populating grid"
    );

    let start = Instant::now();
    let index = SourceIndex::build(field);
    debug!(elapsed = ?start.elapsed(), "Built source index");

    let aggregator = CellAggregator::new(config.weighting, config.spacing);
    let solver = BarrierSolver::new(
        config.corridor_half_width,
        config.neighbour_radius,
        config.convention,
    );

    let start = Instant::now();
    let (cells, outcomes) = join(
        config.parallel,
        || {
            map_entities(grid.cells(), config.parallel, |cell| {
                let result = aggregator.aggregate(cell, &index);
                CellRecord {
                    id: cell.id,
                    mean_depth: result.mean,
                    stats: result.stats,
                    n_samples: result.n_samples,
                    total_weight: result.total_weight,
                    flag: result.flag,
                }
            })
        },
        || map_entities(grid.edges(), config.parallel, |edge| solver.solve(edge, &index)),
    );
    debug!(elapsed = ?start.elapsed(), "Finished cell and edge passes");

    let edges: Vec<EdgeRecord> = grid
        .edges()
        .iter()
        .zip(outcomes)
        .map(|(edge, outcome)| EdgeRecord {
            id: edge.id,
            adjacent_cells: edge.adjacent_cells(),
            barrier_depth: outcome.depth,
            step_depth: step_depth(edge, &cells, config.convention),
            stats: outcome.stats,
            n_samples: outcome.n_samples,
            flag: outcome.flag,
        })
        .collect();

    let report = CoverageReport::from_records(&cells, &edges);
    if !report.sparse_cells.is_empty() || !report.sparse_edges.is_empty() {
        warn!(
            sparse_cells = report.sparse_cells.len(),
            sparse_edges = report.sparse_edges.len(),
            "Some entities have no fine-data coverage"
        );
    }
    if !report.disconnected_edges.is_empty() {
        warn!(
            disconnected_edges = report.disconnected_edges.len(),
            "Some edge corridors do not connect their two sides"
        );
    }
    info!(
        boundary_edges = report.boundary_edges.len(),
        "Thin-wall topography complete"
    );

    TopographyDataset {
        grid,
        convention: config.convention,
        cells,
        edges,
        report,
    }
}

/// Higher (more obstructing) of the adjacent cell means.
fn step_depth(edge: &CoarseEdge, cells: &[CellRecord], convention: ValueConvention) -> Option<f64> {
    edge.adjacent_cells()
        .into_iter()
        .filter_map(|c| cells[c.get()].mean_depth)
        .map(|m| convention.to_obstruction(m))
        .reduce(f64::max)
        .map(|o| convention.to_value(o))
}

/// Map `f` over entities, on the rayon pool when enabled.
///
/// Output order always matches input order.
fn map_entities<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            use rayon::prelude::*;
            return items.par_iter().map(f).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    items.iter().map(f).collect()
}

/// Run two independent passes, concurrently when enabled.
fn join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return rayon::join(a, b);
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (a(), b())
}
