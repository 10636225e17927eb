//! Cell mean depth aggregation.
//!
//! Each coarse cell gets the weighted arithmetic mean of the fine samples
//! that fall in it. Two weightings are supported:
//!
//! - [`AggregationWeighting::Uniform`]: every sample strictly inside the
//!   polygon has weight 1; a sample on the boundary is shared with the
//!   neighbouring cells (½ on a side, the interior angle over 2π at a
//!   corner)
//! - [`AggregationWeighting::AreaFraction`]: every sample stands for a
//!   square footprint of side `spacing`, weighted by the fraction of that
//!   footprint inside the polygon
//!
//! A cell with no contributing samples has no mean and is flagged
//! [`CoverageFlag::SparseCoverage`].

use serde::{Deserialize, Serialize};

use crate::elevation::{ElevationStats, SourceIndex, StatsAccumulator};
use crate::geometry;
use crate::grid::CoarseCell;
use crate::types::{Bounds2D, CoverageFlag};

/// Footprint fractions at or below this are treated as no overlap.
const MIN_FRACTION: f64 = 1e-12;

/// How fine samples are weighted in a cell mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationWeighting {
    /// Unit weight for each sample inside the cell, split on its boundary.
    #[default]
    Uniform,
    /// Weight by the covered fraction of each sample's footprint.
    AreaFraction,
}

/// Result of aggregating one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellAggregate {
    /// Weighted mean, `None` without coverage
    pub mean: Option<f64>,
    /// Low/mean/high of the contributing samples
    pub stats: Option<ElevationStats>,
    /// Number of contributing samples
    pub n_samples: usize,
    /// Sum of contributing weights
    pub total_weight: f64,
    /// Coverage status
    pub flag: CoverageFlag,
}

/// Computes cell means from a [`SourceIndex`].
#[derive(Clone, Copy, Debug)]
pub struct CellAggregator {
    weighting: AggregationWeighting,
    spacing: f64,
}

impl CellAggregator {
    /// Create an aggregator for fine data of nominal `spacing`.
    pub fn new(weighting: AggregationWeighting, spacing: f64) -> Self {
        Self { weighting, spacing }
    }

    /// Weighting in use.
    pub fn weighting(&self) -> AggregationWeighting {
        self.weighting
    }

    /// Aggregate the samples of one cell.
    pub fn aggregate(&self, cell: &CoarseCell, index: &SourceIndex<'_>) -> CellAggregate {
        let mut acc = StatsAccumulator::new();
        match self.weighting {
            AggregationWeighting::Uniform => {
                let tol = geometry::REL_EPS * cell.bounds.diagonal().max(self.spacing);
                for i in index.samples_in_polygon(&cell.polygon) {
                    let s = index.sample(i);
                    let share = geometry::boundary_share(&cell.polygon, s.position(), tol);
                    if share > MIN_FRACTION {
                        acc.push(s.value, share);
                    }
                }
            }
            AggregationWeighting::AreaFraction => {
                let half = 0.5 * self.spacing;
                let footprint_area = self.spacing * self.spacing;
                for i in index.samples_near_polygon(&cell.polygon, half) {
                    let s = index.sample(i);
                    let footprint = Bounds2D::new(s.x - half, s.x + half, s.y - half, s.y + half);
                    let fraction =
                        (geometry::overlap_area(&cell.polygon, &footprint) / footprint_area).min(1.0);
                    if fraction > MIN_FRACTION {
                        acc.push(s.value, fraction);
                    }
                }
            }
        }

        let stats = acc.finish();
        CellAggregate {
            mean: stats.map(|s| s.mean),
            stats,
            n_samples: acc.count(),
            total_weight: acc.total_weight(),
            flag: if stats.is_some() {
                CoverageFlag::Covered
            } else {
                CoverageFlag::SparseCoverage
            },
        }
    }
}
