//! Per-entity output records and the assembled dataset.

use serde::{Deserialize, Serialize};

use crate::elevation::{ElevationStats, ValueConvention};
use crate::grid::Grid;
use crate::types::{CellIndex, CoverageFlag, EdgeIndex};

/// Output for one coarse cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Cell identity
    pub id: CellIndex,
    /// Weighted mean of contributing samples
    pub mean_depth: Option<f64>,
    /// Low/mean/high of contributing samples
    pub stats: Option<ElevationStats>,
    /// Number of contributing samples
    pub n_samples: usize,
    /// Sum of sample weights
    pub total_weight: f64,
    /// Coverage status
    pub flag: CoverageFlag,
}

/// Output for one coarse edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Edge identity
    pub id: EdgeIndex,
    /// Adjacent cells, first (source side) cell first
    pub adjacent_cells: Vec<CellIndex>,
    /// Minimax crossing level
    pub barrier_depth: Option<f64>,
    /// Higher of the adjacent cell means (step topography)
    pub step_depth: Option<f64>,
    /// Corridor low/mean/high
    pub stats: Option<ElevationStats>,
    /// Number of corridor samples
    pub n_samples: usize,
    /// Coverage status
    pub flag: CoverageFlag,
}

/// Summary of per-entity coverage flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Total cells
    pub n_cells: usize,
    /// Total edges
    pub n_edges: usize,
    /// Cells without contributing samples
    pub sparse_cells: Vec<CellIndex>,
    /// Edges with empty corridors
    pub sparse_edges: Vec<EdgeIndex>,
    /// Domain boundary edges
    pub boundary_edges: Vec<EdgeIndex>,
    /// Interior edges whose sides never connected
    pub disconnected_edges: Vec<EdgeIndex>,
}

impl CoverageReport {
    /// Tally the flags of finished records.
    pub fn from_records(cells: &[CellRecord], edges: &[EdgeRecord]) -> Self {
        let edges_with = |flag: CoverageFlag| -> Vec<EdgeIndex> {
            edges.iter().filter(|e| e.flag == flag).map(|e| e.id).collect()
        };
        Self {
            n_cells: cells.len(),
            n_edges: edges.len(),
            sparse_cells: cells
                .iter()
                .filter(|c| c.flag.is_sparse())
                .map(|c| c.id)
                .collect(),
            sparse_edges: edges_with(CoverageFlag::SparseCoverage),
            boundary_edges: edges_with(CoverageFlag::DomainBoundary),
            disconnected_edges: edges_with(CoverageFlag::Disconnected),
        }
    }

    /// Whether every cell and edge has a defined value.
    pub fn is_complete(&self) -> bool {
        self.sparse_cells.is_empty() && self.sparse_edges.is_empty()
    }
}

/// A populated grid: the topology plus one record per cell and per edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopographyDataset {
    pub(crate) grid: Grid,
    pub(crate) convention: ValueConvention,
    pub(crate) cells: Vec<CellRecord>,
    pub(crate) edges: Vec<EdgeRecord>,
    pub(crate) report: CoverageReport,
}

impl TopographyDataset {
    /// The coarse grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Value convention of every depth in the dataset.
    pub fn convention(&self) -> ValueConvention {
        self.convention
    }

    /// Cell records, indexed by `CellIndex`.
    pub fn cells(&self) -> &[CellRecord] {
        &self.cells
    }

    /// Edge records, indexed by `EdgeIndex`.
    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Record of one cell.
    pub fn cell(&self, id: CellIndex) -> Option<&CellRecord> {
        self.cells.get(id.get())
    }

    /// Record of one edge.
    pub fn edge(&self, id: EdgeIndex) -> Option<&EdgeRecord> {
        self.edges.get(id.get())
    }

    /// Coverage summary.
    pub fn report(&self) -> &CoverageReport {
        &self.report
    }

    /// Mean depth of every cell.
    pub fn mean_depths(&self) -> Vec<Option<f64>> {
        self.cells.iter().map(|c| c.mean_depth).collect()
    }

    /// Barrier depth of every edge.
    pub fn barrier_depths(&self) -> Vec<Option<f64>> {
        self.edges.iter().map(|e| e.barrier_depth).collect()
    }
}
