//! Per-entity coverage flags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coverage status attached to every cell and edge result.
///
/// None of these abort a run; they tell the consumer how the value was
/// obtained (or why it is missing).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageFlag {
    /// Value computed from contributing fine samples.
    #[default]
    Covered,
    /// No fine samples contributed; the value is undefined.
    SparseCoverage,
    /// Edge with a single adjacent cell; the value is the corridor minimum.
    DomainBoundary,
    /// Interior edge whose corridor samples never link the two sides under
    /// the neighbour rule; the value is the corridor maximum.
    Disconnected,
}

impl CoverageFlag {
    /// Whether the associated value is undefined.
    pub fn is_sparse(self) -> bool {
        self == Self::SparseCoverage
    }
}

impl fmt::Display for CoverageFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Covered => "Covered",
            Self::SparseCoverage => "SparseCoverage",
            Self::DomainBoundary => "DomainBoundary",
            Self::Disconnected => "Disconnected",
        };
        f.write_str(name)
    }
}
