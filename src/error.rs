//! Error types for thin-wall topography generation.
//!
//! Only run-level failures live here. Per-entity conditions such as sparse
//! fine-data coverage are reported through
//! [`CoverageFlag`](crate::types::CoverageFlag) and never abort a run.

use thiserror::Error;

use crate::types::SampleIndex;

/// Errors that abort a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThinWallError {
    /// Coarse grid polygons do not tile the domain consistently.
    #[error("Invalid topology: {reason}")]
    InvalidTopology { reason: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A fine sample could not be accepted into the elevation field.
    #[error("Invalid sample {index}: {reason}")]
    InvalidSample { index: SampleIndex, reason: String },

    /// The elevation field contains no samples.
    #[error("Elevation field is empty")]
    EmptyField,

    /// A structured post-pass needs values an entity does not have.
    #[error("Incomplete coverage: {0}")]
    IncompleteCoverage(String),
}

impl ThinWallError {
    /// Create an invalid topology error.
    pub fn invalid_topology(reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            reason: reason.into(),
        }
    }

    /// Create an invalid sample error for the sample at input position `index`.
    pub fn invalid_sample(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSample {
            index: SampleIndex::new(index),
            reason: reason.into(),
        }
    }

    /// Whether this error was raised by grid construction.
    pub fn is_topology(&self) -> bool {
        matches!(self, Self::InvalidTopology { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ThinWallError>;
