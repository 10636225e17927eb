//! Fine elevation data and its spatial index.
//!
//! - [`ElevationField`]: validated, canonically ordered fine samples
//! - [`SourceIndex`]: R-tree answering "samples in polygon" and "samples in
//!   corridor" queries
//! - [`ElevationStats`]: low/mean/high summaries of contributing samples

mod field;
mod index;
mod stats;

pub use field::{CoordinateReference, ElevationField, FineSample, ValueConvention};
pub use index::SourceIndex;
pub use stats::{ElevationStats, StatsAccumulator};
