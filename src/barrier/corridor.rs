//! Corridor sample collection and side partitioning.

use crate::elevation::{ElevationStats, SourceIndex, StatsAccumulator, ValueConvention};
use crate::geometry::{self, REL_EPS};
use crate::grid::CoarseEdge;
use crate::types::SampleIndex;

/// Which adjacent cell a corridor sample is nearest to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Left of the edge geometry, towards the edge's first cell.
    Source,
    /// Right of the edge geometry, towards the second cell.
    Sink,
    /// On the edge line itself; joins neither terminal.
    OnEdge,
}

/// A fine sample inside an edge corridor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorridorSample {
    /// Index into the elevation field
    pub index: SampleIndex,
    /// Sample position
    pub position: (f64, f64),
    /// Obstruction value (larger blocks more)
    pub obstruction: f64,
    /// Side of the edge
    pub side: Side,
}

/// The samples within the buffered corridor around one edge.
#[derive(Clone, Debug, Default)]
pub struct Corridor {
    samples: Vec<CorridorSample>,
}

impl Corridor {
    /// Collect the corridor of `edge` with the given half-width.
    ///
    /// Samples are classified by their signed offset from the edge line,
    /// with offsets within a relative tolerance treated as on the edge.
    pub fn collect(
        edge: &CoarseEdge,
        index: &SourceIndex<'_>,
        half_width: f64,
        convention: ValueConvention,
    ) -> Self {
        let tol = REL_EPS * edge.length().max(half_width);
        let samples = index
            .samples_in_corridor(&edge.geometry, half_width)
            .into_iter()
            .map(|i| {
                let s = index.sample(i);
                let offset = geometry::signed_offset(s.position(), &edge.geometry);
                let side = if offset > tol {
                    Side::Source
                } else if offset < -tol {
                    Side::Sink
                } else {
                    Side::OnEdge
                };
                CorridorSample {
                    index: i,
                    position: s.position(),
                    obstruction: convention.to_obstruction(s.value),
                    side,
                }
            })
            .collect();
        Self { samples }
    }

    /// Build a corridor from already classified samples.
    pub fn from_samples(samples: Vec<CorridorSample>) -> Self {
        Self { samples }
    }

    /// Corridor samples.
    pub fn samples(&self) -> &[CorridorSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the corridor holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples on `side`.
    pub fn count(&self, side: Side) -> usize {
        self.samples.iter().filter(|s| s.side == side).count()
    }

    /// Obstruction statistics over the whole corridor.
    pub fn stats(&self) -> Option<ElevationStats> {
        let mut acc = StatsAccumulator::new();
        for s in &self.samples {
            acc.push(s.obstruction, 1.0);
        }
        acc.finish()
    }
}
