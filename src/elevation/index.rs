//! R-tree index over the fine samples.

use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

use crate::geometry::{self, REL_EPS};
use crate::types::{Bounds2D, SampleIndex};

use super::field::{ElevationField, FineSample};

type IndexedPoint = GeomWithData<[f64; 2], SampleIndex>;

/// Spatial index answering polygon and corridor queries on an
/// [`ElevationField`].
///
/// The tree is bulk-loaded once; queries are read-only and may run from
/// many threads at once. Every query returns sample indices sorted
/// ascending, and an empty result is not an error.
pub struct SourceIndex<'f> {
    field: &'f ElevationField,
    tree: RTree<IndexedPoint>,
}

impl<'f> SourceIndex<'f> {
    /// Bulk-load the index for `field`.
    pub fn build(field: &'f ElevationField) -> Self {
        let points: Vec<IndexedPoint> = field
            .samples()
            .iter()
            .enumerate()
            .map(|(i, s)| GeomWithData::new([s.x, s.y], SampleIndex::new(i)))
            .collect();
        Self {
            field,
            tree: RTree::bulk_load(points),
        }
    }

    /// The indexed field.
    pub fn field(&self) -> &'f ElevationField {
        self.field
    }

    /// Number of indexed samples.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Look up a sample.
    #[inline]
    pub fn sample(&self, index: SampleIndex) -> &'f FineSample {
        self.field.sample(index)
    }

    /// All samples whose position lies in the closed envelope.
    pub fn samples_in_envelope(&self, bounds: &Bounds2D) -> Vec<SampleIndex> {
        let (lo, hi) = bounds.corners();
        let mut found: Vec<SampleIndex> = self
            .tree
            .locate_in_envelope(&AABB::from_corners(lo, hi))
            .map(|p| p.data)
            .collect();
        found.sort_unstable();
        found
    }

    /// All samples inside `polygon`, boundary inclusive.
    ///
    /// Points within a relative tolerance of the boundary count as inside, so
    /// a sample on an edge shared by two cells belongs to both.
    pub fn samples_in_polygon(&self, polygon: &[(f64, f64)]) -> Vec<SampleIndex> {
        let Some(bounds) = Bounds2D::from_points(polygon.iter().copied()) else {
            return Vec::new();
        };
        let tol = self.tolerance(&bounds);
        self.samples_in_envelope(&bounds.buffered(tol))
            .into_iter()
            .filter(|&i| geometry::contains_point(polygon, self.sample(i).position(), tol))
            .collect()
    }

    /// Candidate samples whose position is within `margin` of the polygon
    /// envelope.
    ///
    /// Used for footprint weighting, where a sample just outside the polygon
    /// may still cover part of it. The caller computes the actual overlap.
    pub fn samples_near_polygon(&self, polygon: &[(f64, f64)], margin: f64) -> Vec<SampleIndex> {
        match Bounds2D::from_points(polygon.iter().copied()) {
            Some(bounds) => self.samples_in_envelope(&bounds.buffered(margin.max(0.0))),
            None => Vec::new(),
        }
    }

    /// All samples within `half_width` of the polyline `line`.
    ///
    /// The corridor has flat caps: a sample beyond either end of the line is
    /// excluded even when it is within `half_width` of the endpoint, so a
    /// corridor never reaches into the cells diagonal to an edge.
    pub fn samples_in_corridor(&self, line: &[(f64, f64)], half_width: f64) -> Vec<SampleIndex> {
        let Some(bounds) = Bounds2D::from_points(line.iter().copied()) else {
            return Vec::new();
        };
        let tol = self.tolerance(&bounds);
        let reach = half_width.max(0.0) + tol;
        self.samples_in_envelope(&bounds.buffered(reach))
            .into_iter()
            .filter(|&i| geometry::flat_cap_distance(self.sample(i).position(), line, tol) <= reach)
            .collect()
    }

    fn tolerance(&self, bounds: &Bounds2D) -> f64 {
        REL_EPS * bounds.diagonal().max(self.field.spacing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation::CoordinateReference;

    fn lattice(n: usize) -> ElevationField {
        let values: Vec<f64> = (0..n * n).map(|k| k as f64).collect();
        ElevationField::from_regular_grid(
            CoordinateReference::Planar,
            (0.0, 0.0),
            1.0,
            n,
            n,
            &values,
        )
        .unwrap()
    }

    #[test]
    fn test_polygon_query_matches_scan() {
        let field = lattice(12);
        let index = SourceIndex::build(&field);
        let triangle = vec![(0.5, 0.5), (9.3, 1.7), (3.1, 8.2)];

        let brute: Vec<SampleIndex> = field
            .samples()
            .iter()
            .enumerate()
            .filter(|(_, s)| geometry::contains_point(&triangle, s.position(), 1e-9))
            .map(|(i, _)| SampleIndex::new(i))
            .collect();

        assert!(!brute.is_empty());
        assert_eq!(index.samples_in_polygon(&triangle), brute);
    }

    #[test]
    fn test_polygon_query_is_boundary_inclusive() {
        let field = lattice(4);
        let index = SourceIndex::build(&field);
        let square = vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)];
        // 3 x 3 lattice points including the edges
        assert_eq!(index.samples_in_polygon(&square).len(), 9);
    }

    #[test]
    fn test_corridor_query_matches_scan() {
        let field = lattice(12);
        let index = SourceIndex::build(&field);
        let line = vec![(1.0, 1.0), (6.0, 3.0), (8.0, 9.0)];
        let half_width = 1.3;

        let brute: Vec<SampleIndex> = field
            .samples()
            .iter()
            .enumerate()
            .filter(|(_, s)| geometry::flat_cap_distance(s.position(), &line, 0.0) <= half_width)
            .map(|(i, _)| SampleIndex::new(i))
            .collect();

        assert_eq!(index.samples_in_corridor(&line, half_width), brute);
    }

    #[test]
    fn test_corridor_excludes_samples_past_the_ends() {
        let field = lattice(6);
        let index = SourceIndex::build(&field);
        let line = vec![(1.0, 0.0), (1.0, 3.0)];

        let found = index.samples_in_corridor(&line, 1.0);
        // x in {0, 1, 2}, y in {0, 1, 2, 3}
        assert_eq!(found.len(), 12);
        assert!(found.iter().all(|&i| index.sample(i).y <= 3.0));
    }

    #[test]
    fn test_empty_results() {
        let field = lattice(3);
        let index = SourceIndex::build(&field);
        assert_eq!(index.len(), 9);
        let far = vec![(100.0, 100.0), (101.0, 100.0), (101.0, 101.0)];
        assert!(index.samples_in_polygon(&far).is_empty());
        assert!(index.samples_in_corridor(&far, 0.5).is_empty());
        assert!(index.samples_in_polygon(&[]).is_empty());
    }

    #[test]
    fn test_near_polygon_includes_margin() {
        let field = lattice(6);
        let index = SourceIndex::build(&field);
        let square = vec![(1.2, 1.2), (2.8, 1.2), (2.8, 2.8), (1.2, 2.8)];
        assert_eq!(index.samples_in_polygon(&square).len(), 1);
        assert_eq!(index.samples_near_polygon(&square, 0.5).len(), 9);
    }
}
