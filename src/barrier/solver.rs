//! Minimax barrier depth per edge.

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::elevation::{ElevationStats, SourceIndex, ValueConvention};
use crate::grid::CoarseEdge;
use crate::types::CoverageFlag;

use super::corridor::{Corridor, CorridorSample, Side};
use super::union_find::DisjointSet;

/// Result of solving one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct BarrierOutcome {
    /// Barrier value in the run's convention, `None` without coverage
    pub depth: Option<f64>,
    /// Corridor low/mean/high in the run's convention
    pub stats: Option<ElevationStats>,
    /// Number of corridor samples
    pub n_samples: usize,
    /// Coverage status
    pub flag: CoverageFlag,
}

/// Computes the bottleneck obstruction across each edge corridor.
///
/// Corridor samples are activated in ascending obstruction order and merged
/// with already active neighbours in a [`DisjointSet`] that also holds a
/// source and a sink terminal. The level of the batch that first connects
/// the two terminals is the barrier. Equal obstruction values form a single
/// batch, so the result does not depend on sample order.
///
/// # Example
///
/// ```
/// use thinwall_rs::barrier::{BarrierSolver, CorridorSample, Side};
/// use thinwall_rs::types::SampleIndex;
///
/// let row = [(0.0, Side::Source, -10.0), (1.0, Side::OnEdge, -2.0), (2.0, Side::Sink, -10.0)];
/// let samples: Vec<CorridorSample> = row
///     .iter()
///     .enumerate()
///     .map(|(i, &(x, side, obstruction))| CorridorSample {
///         index: SampleIndex::new(i),
///         position: (x, 0.0),
///         obstruction,
///         side,
///     })
///     .collect();
///
/// assert_eq!(BarrierSolver::bottleneck(&samples, 1.0), Some(-2.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BarrierSolver {
    half_width: f64,
    neighbour_radius: f64,
    convention: ValueConvention,
}

impl BarrierSolver {
    /// Create a solver with corridor half-width and neighbour radius.
    pub fn new(half_width: f64, neighbour_radius: f64, convention: ValueConvention) -> Self {
        Self {
            half_width,
            neighbour_radius,
            convention,
        }
    }

    /// Corridor half-width.
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Neighbour radius.
    pub fn neighbour_radius(&self) -> f64 {
        self.neighbour_radius
    }

    /// Solve one edge.
    pub fn solve(&self, edge: &CoarseEdge, index: &SourceIndex<'_>) -> BarrierOutcome {
        let corridor = Corridor::collect(edge, index, self.half_width, self.convention);
        self.solve_corridor(&corridor, edge.is_boundary())
    }

    /// Solve an already collected corridor.
    pub fn solve_corridor(&self, corridor: &Corridor, boundary: bool) -> BarrierOutcome {
        let Some(stats) = corridor.stats() else {
            return BarrierOutcome {
                depth: None,
                stats: None,
                n_samples: 0,
                flag: CoverageFlag::SparseCoverage,
            };
        };

        let (obstruction, flag) = if boundary {
            (stats.low, CoverageFlag::DomainBoundary)
        } else {
            match Self::bottleneck(corridor.samples(), self.neighbour_radius) {
                Some(level) => (level, CoverageFlag::Covered),
                None => (stats.high, CoverageFlag::Disconnected),
            }
        };

        BarrierOutcome {
            depth: Some(self.convention.to_value(obstruction)),
            stats: Some(stats.to_convention(self.convention)),
            n_samples: corridor.len(),
            flag,
        }
    }

    /// Lowest obstruction level at which the source and sink sides are
    /// joined through samples no higher than that level.
    ///
    /// Two samples are neighbours when their distance is at most `radius`.
    /// Returns `None` when either side has no samples or the sides never
    /// connect.
    pub fn bottleneck(samples: &[CorridorSample], radius: f64) -> Option<f64> {
        let k = samples.len();
        let has_side = |side| samples.iter().any(|s| s.side == side);
        if !has_side(Side::Source) || !has_side(Side::Sink) {
            return None;
        }

        let source = k;
        let sink = k + 1;
        let mut sets = DisjointSet::new(k + 2);
        let mut active = vec![false; k];

        let tree: RTree<GeomWithData<[f64; 2], usize>> = RTree::bulk_load(
            samples
                .iter()
                .enumerate()
                .map(|(i, s)| GeomWithData::new([s.position.0, s.position.1], i))
                .collect(),
        );
        let reach = radius.max(0.0) * (1.0 + crate::geometry::REL_EPS);
        let reach2 = reach * reach;

        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| {
            samples[a]
                .obstruction
                .total_cmp(&samples[b].obstruction)
                .then(a.cmp(&b))
        });

        let mut start = 0;
        while start < k {
            let level = samples[order[start]].obstruction;
            let end = order[start..]
                .iter()
                .position(|&i| samples[i].obstruction != level)
                .map_or(k, |n| start + n);

            for &i in &order[start..end] {
                active[i] = true;
                match samples[i].side {
                    Side::Source => {
                        sets.union(i, source);
                    }
                    Side::Sink => {
                        sets.union(i, sink);
                    }
                    Side::OnEdge => {}
                }
                let (x, y) = samples[i].position;
                for neighbour in tree.locate_within_distance([x, y], reach2) {
                    if active[neighbour.data] {
                        sets.union(i, neighbour.data);
                    }
                }
            }

            if sets.connected(source, sink) {
                return Some(level);
            }
            start = end;
        }
        None
    }
}
