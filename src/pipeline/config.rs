//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregationWeighting;
use crate::elevation::ValueConvention;
use crate::error::{Result, ThinWallError};

/// Configuration for a thin-wall run.
///
/// Distances left as `None` default to multiples of the fine grid spacing
/// and are resolved per run with [`ThinWallConfig::resolve`].
///
/// # Example
///
/// ```
/// use thinwall_rs::aggregate::AggregationWeighting;
/// use thinwall_rs::pipeline::ThinWallConfig;
///
/// let config = ThinWallConfig::new()
///     .with_edge_corridor_width(30.0)
///     .with_aggregation_weighting(AggregationWeighting::AreaFraction);
///
/// let resolved = config.resolve(10.0).unwrap();
/// assert_eq!(resolved.corridor_half_width, 30.0);
/// assert_eq!(resolved.topology_tolerance, 5.0);
/// assert_eq!(resolved.neighbour_radius, 10.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThinWallConfig {
    /// Corridor half-width around each edge (default: one fine spacing)
    pub edge_corridor_width: Option<f64>,
    /// Vertex welding and tiling tolerance (default: half a fine spacing)
    pub topology_tolerance: Option<f64>,
    /// Cell mean weighting
    pub aggregation_weighting: AggregationWeighting,
    /// Sign convention of the sample values
    pub value_convention: ValueConvention,
    /// Distance within which corridor samples are neighbours
    /// (default: one fine spacing)
    pub neighbour_radius: Option<f64>,
    /// Run the cell and edge passes on the rayon pool
    pub parallel: bool,
}

impl Default for ThinWallConfig {
    fn default() -> Self {
        Self {
            edge_corridor_width: None,
            topology_tolerance: None,
            aggregation_weighting: AggregationWeighting::Uniform,
            value_convention: ValueConvention::Elevation,
            neighbour_radius: None,
            parallel: true,
        }
    }
}

impl ThinWallConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the corridor half-width.
    pub fn with_edge_corridor_width(mut self, width: f64) -> Self {
        self.edge_corridor_width = Some(width);
        self
    }

    /// Set the topology tolerance.
    pub fn with_topology_tolerance(mut self, tolerance: f64) -> Self {
        self.topology_tolerance = Some(tolerance);
        self
    }

    /// Set the cell mean weighting.
    pub fn with_aggregation_weighting(mut self, weighting: AggregationWeighting) -> Self {
        self.aggregation_weighting = weighting;
        self
    }

    /// Set the value convention.
    pub fn with_value_convention(mut self, convention: ValueConvention) -> Self {
        self.value_convention = convention;
        self
    }

    /// Set the neighbour radius used by the barrier search.
    pub fn with_neighbour_radius(mut self, radius: f64) -> Self {
        self.neighbour_radius = Some(radius);
        self
    }

    /// Enable or disable parallel passes.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the explicitly set distances.
    pub fn validate(&self) -> Result<()> {
        if let Some(w) = self.edge_corridor_width {
            check_positive("edge_corridor_width", w)?;
        }
        if let Some(t) = self.topology_tolerance {
            if !(t.is_finite() && t >= 0.0) {
                return Err(ThinWallError::InvalidConfig(format!(
                    "topology_tolerance must be finite and non-negative, got {t}"
                )));
            }
        }
        if let Some(r) = self.neighbour_radius {
            check_positive("neighbour_radius", r)?;
        }
        Ok(())
    }

    /// Validate and fill in spacing-based defaults.
    pub fn resolve(&self, spacing: f64) -> Result<ResolvedConfig> {
        self.validate()?;
        check_positive("fine grid spacing", spacing)?;
        Ok(ResolvedConfig {
            spacing,
            corridor_half_width: self.edge_corridor_width.unwrap_or(spacing),
            topology_tolerance: self.topology_tolerance.unwrap_or(0.5 * spacing),
            neighbour_radius: self.neighbour_radius.unwrap_or(spacing),
            weighting: self.aggregation_weighting,
            convention: self.value_convention,
            parallel: self.parallel,
        })
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ThinWallError::InvalidConfig(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

/// Configuration with every distance made concrete.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedConfig {
    /// Fine grid spacing
    pub spacing: f64,
    /// Corridor half-width
    pub corridor_half_width: f64,
    /// Vertex welding tolerance
    pub topology_tolerance: f64,
    /// Barrier neighbour radius
    pub neighbour_radius: f64,
    /// Cell mean weighting
    pub weighting: AggregationWeighting,
    /// Sample value convention
    pub convention: ValueConvention,
    /// Parallel passes
    pub parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_spacing() {
        let resolved = ThinWallConfig::default().resolve(4.0).unwrap();
        assert_eq!(resolved.corridor_half_width, 4.0);
        assert_eq!(resolved.topology_tolerance, 2.0);
        assert_eq!(resolved.neighbour_radius, 4.0);
        assert_eq!(resolved.weighting, AggregationWeighting::Uniform);
        assert_eq!(resolved.convention, ValueConvention::Elevation);
        assert!(resolved.parallel);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ThinWallConfig::new().with_edge_corridor_width(0.0).validate().is_err());
        assert!(ThinWallConfig::new().with_neighbour_radius(f64::NAN).validate().is_err());
        assert!(ThinWallConfig::new().with_topology_tolerance(-1.0).validate().is_err());
        assert!(ThinWallConfig::new().with_topology_tolerance(0.0).validate().is_ok());
        assert!(matches!(
            ThinWallConfig::new().resolve(0.0),
            Err(ThinWallError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_serde() {
        let config = ThinWallConfig::new()
            .with_value_convention(ValueConvention::Depth)
            .with_parallel(false);
        let json = serde_json::to_string(&config).unwrap();
        let back: ThinWallConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
