//! Fine-resolution elevation samples.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThinWallError};
use crate::types::{Bounds2D, SampleIndex};

/// Declared coordinate reference of the sample and grid coordinates.
///
/// No transform is ever applied: distances (spacing, corridor width,
/// tolerances) are measured in the declared units, metres for `Planar` and
/// degrees for `Geographic`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateReference {
    /// Projected planar coordinates.
    #[default]
    Planar,
    /// Longitude/latitude in degrees.
    Geographic,
}

/// Sign convention of sample values.
///
/// Kernels work on the *obstruction* value, which grows with blocking:
/// elevation itself, or negated depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueConvention {
    /// Positive-up elevation (topography, or negative bathymetry).
    #[default]
    Elevation,
    /// Positive-down depth below a datum.
    Depth,
}

impl ValueConvention {
    /// Convert a value in this convention to an obstruction value.
    #[inline]
    pub fn to_obstruction(self, value: f64) -> f64 {
        match self {
            Self::Elevation => value,
            Self::Depth => -value,
        }
    }

    /// Convert an obstruction value back to this convention.
    #[inline]
    pub fn to_value(self, obstruction: f64) -> f64 {
        match self {
            Self::Elevation => obstruction,
            Self::Depth => -obstruction,
        }
    }
}

/// A single fine-resolution sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FineSample {
    /// x-coordinate (easting or longitude)
    pub x: f64,
    /// y-coordinate (northing or latitude)
    pub y: f64,
    /// Elevation or depth, per the run's [`ValueConvention`]
    pub value: f64,
}

impl FineSample {
    /// Create a new sample.
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Sample position.
    #[inline]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then(self.y.total_cmp(&other.y))
            .then(self.value.total_cmp(&other.value))
    }
}

/// The full set of fine samples for a run.
///
/// Samples are stored in a canonical order (sorted by x, y, value) with exact
/// duplicates removed, so every result derived from the field is independent
/// of the order in which samples were supplied and of repeated samples.
///
/// # Example
///
/// ```
/// use thinwall_rs::elevation::{CoordinateReference, ElevationField, FineSample};
///
/// let field = ElevationField::new(
///     CoordinateReference::Planar,
///     1.0,
///     vec![
///         FineSample::new(1.0, 0.0, -20.0),
///         FineSample::new(0.0, 0.0, -10.0),
///         FineSample::new(0.0, 0.0, -10.0),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(field.len(), 2);
/// assert_eq!(field.n_duplicates_removed(), 1);
/// assert_eq!(field.samples()[0].value, -10.0);
/// ```
#[derive(Clone, Debug)]
pub struct ElevationField {
    reference: CoordinateReference,
    spacing: f64,
    samples: Vec<FineSample>,
    n_duplicates_removed: usize,
}

impl ElevationField {
    /// Build a field from unordered samples.
    ///
    /// # Errors
    /// * `InvalidConfig` if `spacing` is not finite and positive
    /// * `InvalidSample` for a non-finite coordinate or value (the index is
    ///   the sample's input position)
    /// * `EmptyField` if no samples are given
    pub fn new<I>(reference: CoordinateReference, spacing: f64, samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = FineSample>,
    {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ThinWallError::InvalidConfig(format!(
                "fine grid spacing must be finite and positive, got {spacing}"
            )));
        }

        let mut samples: Vec<FineSample> = samples.into_iter().collect();
        for (i, s) in samples.iter().enumerate() {
            if !(s.x.is_finite() && s.y.is_finite()) {
                return Err(ThinWallError::invalid_sample(i, "coordinate is not finite"));
            }
            if !s.value.is_finite() {
                return Err(ThinWallError::invalid_sample(i, "value is not finite"));
            }
        }
        if samples.is_empty() {
            return Err(ThinWallError::EmptyField);
        }

        samples.sort_by(FineSample::canonical_cmp);
        let n_input = samples.len();
        samples.dedup_by(|a, b| a.canonical_cmp(b) == Ordering::Equal);
        let n_duplicates_removed = n_input - samples.len();

        Ok(Self {
            reference,
            spacing,
            samples,
            n_duplicates_removed,
        })
    }

    /// Build a field from a regular raster of cell-centred values.
    ///
    /// `values` is row-major (`values[j * nx + i]`), with sample `(i, j)` at
    /// `(x0 + i * spacing, y0 + j * spacing)`. NaN entries are treated as
    /// no-data and skipped.
    pub fn from_regular_grid(
        reference: CoordinateReference,
        origin: (f64, f64),
        spacing: f64,
        nx: usize,
        ny: usize,
        values: &[f64],
    ) -> Result<Self> {
        if values.len() != nx * ny {
            return Err(ThinWallError::InvalidConfig(format!(
                "raster of {nx} x {ny} needs {} values, got {}",
                nx * ny,
                values.len()
            )));
        }
        let (x0, y0) = origin;
        let samples = (0..ny).flat_map(|j| {
            (0..nx).filter_map(move |i| {
                let v = values[j * nx + i];
                (!v.is_nan()).then(|| {
                    FineSample::new(x0 + i as f64 * spacing, y0 + j as f64 * spacing, v)
                })
            })
        });
        Self::new(reference, spacing, samples)
    }

    /// Declared coordinate reference.
    pub fn reference(&self) -> CoordinateReference {
        self.reference
    }

    /// Nominal fine grid spacing.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Number of (distinct) samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the field has no samples (never true for a constructed field).
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of exact duplicates dropped at construction.
    pub fn n_duplicates_removed(&self) -> usize {
        self.n_duplicates_removed
    }

    /// Samples in canonical order.
    pub fn samples(&self) -> &[FineSample] {
        &self.samples
    }

    /// Sample by index.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[inline]
    pub fn sample(&self, index: SampleIndex) -> &FineSample {
        &self.samples[index]
    }

    /// Envelope of all sample positions.
    pub fn bounds(&self) -> Bounds2D {
        Bounds2D::from_points(self.samples.iter().map(FineSample::position))
            .unwrap_or_else(|| Bounds2D::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Minimum and maximum sample value.
    pub fn value_range(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.value), hi.max(s.value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_is_input_independent() {
        let a = vec![
            FineSample::new(2.0, 0.0, 1.0),
            FineSample::new(0.0, 1.0, 3.0),
            FineSample::new(0.0, 0.0, 2.0),
        ];
        let mut b = a.clone();
        b.reverse();
        b.push(a[1]);

        let fa = ElevationField::new(CoordinateReference::Planar, 1.0, a).unwrap();
        let fb = ElevationField::new(CoordinateReference::Planar, 1.0, b).unwrap();
        assert_eq!(fa.samples(), fb.samples());
        assert_eq!(fb.n_duplicates_removed(), 1);
        assert_eq!(fa.samples()[0], FineSample::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_same_position_different_value_kept() {
        let field = ElevationField::new(
            CoordinateReference::Planar,
            1.0,
            vec![FineSample::new(0.0, 0.0, 1.0), FineSample::new(0.0, 0.0, 2.0)],
        )
        .unwrap();
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let err = ElevationField::new(
            CoordinateReference::Planar,
            1.0,
            vec![FineSample::new(0.0, 0.0, 1.0), FineSample::new(0.0, 1.0, f64::NAN)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ThinWallError::InvalidSample {
                index: SampleIndex::new(1),
                reason: "value is not finite".to_string()
            }
        );

        assert!(matches!(
            ElevationField::new(CoordinateReference::Planar, 0.0, vec![FineSample::new(0.0, 0.0, 1.0)]),
            Err(ThinWallError::InvalidConfig(_))
        ));
        assert_eq!(
            ElevationField::new(CoordinateReference::Geographic, 1.0, Vec::new()).unwrap_err(),
            ThinWallError::EmptyField
        );
    }

    #[test]
    fn test_from_regular_grid_skips_nodata() {
        let values = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0];
        let field = ElevationField::from_regular_grid(
            CoordinateReference::Planar,
            (0.5, 0.5),
            1.0,
            3,
            2,
            &values,
        )
        .unwrap();
        assert_eq!(field.len(), 5);
        assert_eq!(field.value_range(), (1.0, 6.0));
        assert_eq!(field.bounds(), Bounds2D::new(0.5, 2.5, 0.5, 1.5));

        assert!(ElevationField::from_regular_grid(
            CoordinateReference::Planar,
            (0.0, 0.0),
            1.0,
            2,
            2,
            &values
        )
        .is_err());
    }

    #[test]
    fn test_value_convention() {
        assert_eq!(ValueConvention::Depth.to_obstruction(10.0), -10.0);
        assert_eq!(ValueConvention::Depth.to_value(-2.0), 2.0);
        assert_eq!(ValueConvention::Elevation.to_obstruction(3.0), 3.0);
    }
}
