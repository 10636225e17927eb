//! Low/mean/high statistics over contributing samples.

use serde::{Deserialize, Serialize};

use super::field::ValueConvention;

/// Minimum, (weighted) mean and maximum of a set of values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElevationStats {
    /// Smallest value
    pub low: f64,
    /// Weighted mean
    pub mean: f64,
    /// Largest value
    pub high: f64,
}

impl ElevationStats {
    /// Stats of a single value.
    pub fn constant(value: f64) -> Self {
        Self {
            low: value,
            mean: value,
            high: value,
        }
    }

    /// Convert obstruction statistics to `convention`.
    ///
    /// Negation reverses order, so `low` and `high` swap for depths.
    pub fn to_convention(self, convention: ValueConvention) -> Self {
        let low = convention.to_value(self.low);
        let high = convention.to_value(self.high);
        Self {
            low: low.min(high),
            mean: convention.to_value(self.mean),
            high: low.max(high),
        }
    }

    /// Convert statistics given in `convention` to obstruction values.
    ///
    /// The mapping is its own inverse, so this is [`Self::to_convention`]
    /// read the other way.
    pub fn to_obstruction(self, convention: ValueConvention) -> Self {
        self.to_convention(convention)
    }

    /// Whether `value` lies within `[low, high]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Incremental weighted statistics.
///
/// The mean is accumulated as offsets from the first pushed value, so a set
/// of identical values yields exactly that value.
#[derive(Clone, Debug, Default)]
pub struct StatsAccumulator {
    reference: Option<f64>,
    low: f64,
    high: f64,
    weighted_offset: f64,
    total_weight: f64,
    count: usize,
}

impl StatsAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value with positive weight. Non-positive weights are ignored.
    pub fn push(&mut self, value: f64, weight: f64) {
        if !(weight > 0.0) {
            return;
        }
        let reference = *self.reference.get_or_insert(value);
        if self.count == 0 {
            self.low = value;
            self.high = value;
        } else {
            self.low = self.low.min(value);
            self.high = self.high.max(value);
        }
        self.weighted_offset += weight * (value - reference);
        self.total_weight += weight;
        self.count += 1;
    }

    /// Number of values pushed with positive weight.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sum of the accepted weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Final statistics, or `None` if nothing was accepted.
    pub fn finish(&self) -> Option<ElevationStats> {
        let reference = self.reference?;
        let mean = reference + self.weighted_offset / self.total_weight;
        Some(ElevationStats {
            low: self.low,
            // Rounding can push the mean a hair outside the range
            mean: mean.clamp(self.low, self.high),
            high: self.high,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_values_are_exact() {
        let mut acc = StatsAccumulator::new();
        for w in [0.1, 0.7, 0.2, 1.0] {
            acc.push(-12.345_678_9, w);
        }
        let stats = acc.finish().unwrap();
        assert_eq!(stats, ElevationStats::constant(-12.345_678_9));
        assert_eq!(acc.count(), 4);
    }

    #[test]
    fn test_weighted_mean() {
        let mut acc = StatsAccumulator::new();
        acc.push(1.0, 1.0);
        acc.push(4.0, 2.0);
        acc.push(100.0, 0.0);
        let stats = acc.finish().unwrap();
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert_eq!((stats.low, stats.high), (1.0, 4.0));
        assert_eq!(acc.count(), 2);
        assert!((acc.total_weight() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        assert!(StatsAccumulator::new().finish().is_none());
    }

    #[test]
    fn test_depth_conversion_swaps_extremes() {
        let obstruction = ElevationStats {
            low: -10.0,
            mean: -6.0,
            high: -2.0,
        };
        let depth = obstruction.to_convention(ValueConvention::Depth);
        assert_eq!(
            depth,
            ElevationStats {
                low: 2.0,
                mean: 6.0,
                high: 10.0
            }
        );
        assert_eq!(obstruction.to_convention(ValueConvention::Elevation), obstruction);
    }
}
