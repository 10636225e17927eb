//! Integration tests for structured refinement and coarsening.
//!
//! These tests verify:
//! - A 4 x 4 rectilinear dataset maps onto cells, u-faces and v-faces
//! - A wall on a block's outer face survives two coarsenings
//! - A corner cell walled off inside its block moves the wall outwards
//! - Coarsening keeps the extremes and averages the means

use thinwall_rs::grid::Grid;
use thinwall_rs::{
    CoordinateReference, ElevationField, Measure, StructuredTopography, ThinWallPipeline,
};

const SPACING: f64 = 0.25;
const FLOOR: f64 = -10.0;
const WALL: f64 = 100.0;

/// 16 x 16 samples over [0, 4]², walls wherever `is_wall` holds.
fn field(is_wall: impl Fn(f64, f64) -> bool) -> ElevationField {
    let n = 16;
    let origin = 0.5 * SPACING;
    let values: Vec<f64> = (0..n * n)
        .map(|k| {
            let x = origin + (k % n) as f64 * SPACING;
            let y = origin + (k / n) as f64 * SPACING;
            if is_wall(x, y) {
                WALL
            } else {
                FLOOR
            }
        })
        .collect();
    ElevationField::from_regular_grid(
        CoordinateReference::Planar,
        (origin, origin),
        SPACING,
        n,
        n,
        &values,
    )
    .unwrap()
}

fn structured(field: &ElevationField) -> StructuredTopography {
    let axis = [0.0, 1.0, 2.0, 3.0, 4.0];
    let grid = Grid::rectilinear(&axis, &axis).unwrap();
    let dataset = ThinWallPipeline::default().run_on_grid(&grid, field).unwrap();
    StructuredTopography::from_dataset(&dataset).unwrap()
}

fn adjust_all(topography: &mut StructuredTopography) {
    topography.push_corners(true).unwrap();
    topography.lower_tallest_buttress().unwrap();
    topography.fold_out_central_ridges().unwrap();
    topography.invert_exterior_corners().unwrap();
}

/// Whether a sample sits in the corridor straddling `at` (one sample each side).
fn straddles(coordinate: f64, at: f64) -> bool {
    (coordinate - at).abs() < SPACING
}

#[test]
fn test_wall_on_block_face_survives_coarsening() {
    let field = field(|x, _| straddles(x, 2.0));
    let mut topography = structured(&field);
    assert_eq!((topography.nj(), topography.ni()), (4, 4));

    for j in 0..4 {
        assert_eq!(topography.u_stats(Measure::Simple, j, 2).low, WALL);
        assert_eq!(topography.u_stats(Measure::Simple, j, 1).low, FLOOR);
    }

    adjust_all(&mut topography);
    // No sill inside the blocks to rearrange
    let (simple, effective) = (
        topography.layer(Measure::Simple),
        topography.layer(Measure::Effective),
    );
    assert_eq!(effective.u.low, simple.u.low);
    assert_eq!(effective.v.low, simple.v.low);
    assert_eq!(effective.cells.low, simple.cells.low);

    let half = topography.coarsen().unwrap();
    assert_eq!((half.nj(), half.ni()), (2, 2));
    for j in 0..2 {
        assert_eq!(half.u_stats(Measure::Effective, j, 1).low, WALL);
        assert_eq!(half.u_stats(Measure::Effective, j, 0).low, FLOOR);
        assert_eq!(half.v_stats(Measure::Effective, 1, j).low, FLOOR);
    }

    // At the coarsest level the wall is inside the single cell
    let single = half.coarsen().unwrap();
    assert_eq!((single.nj(), single.ni()), (1, 1));
    assert_eq!(single.u_stats(Measure::Effective, 0, 0).low, FLOOR);
    assert_eq!(single.cell_stats(Measure::Effective, 0, 0).high, WALL);
    assert_eq!(single.cell_stats(Measure::Effective, 0, 0).low, FLOOR);
}

#[test]
fn test_walled_corner_cell_moves_wall_outwards() {
    // Walls along the east and north faces of cell (0, 0)
    let field = field(|x, y| (straddles(x, 1.0) && y < 1.25) || (straddles(y, 1.0) && x < 1.25));
    let mut topography = structured(&field);

    assert_eq!(topography.u_stats(Measure::Simple, 0, 1).low, WALL);
    assert_eq!(topography.v_stats(Measure::Simple, 1, 0).low, WALL);
    assert_eq!(topography.u_stats(Measure::Simple, 1, 1).low, FLOOR);
    assert_eq!(topography.v_stats(Measure::Simple, 1, 1).low, FLOOR);
    assert_eq!(topography.u_stats(Measure::Simple, 0, 0).low, FLOOR);

    adjust_all(&mut topography);

    // The cell joins its block and the wall moves to the block's outside
    assert_eq!(topography.u_stats(Measure::Effective, 0, 1).low, FLOOR);
    assert_eq!(topography.v_stats(Measure::Effective, 1, 0).low, FLOOR);
    assert_eq!(topography.cell_stats(Measure::Effective, 0, 0).low, FLOOR);
    assert_eq!(topography.u_stats(Measure::Effective, 0, 0).low, WALL);
    assert_eq!(topography.v_stats(Measure::Effective, 0, 0).low, WALL);
    // Simple values are left alone
    assert_eq!(topography.u_stats(Measure::Simple, 0, 1).low, WALL);

    topography.init_effective();
    assert_eq!(
        topography.layer(Measure::Effective),
        topography.layer(Measure::Simple)
    );
}

#[test]
fn test_coarsen_keeps_extremes_and_averages_means() {
    let field = field(|x, y| straddles(x + y, 3.0));
    let topography = structured(&field);
    let single = topography.coarsen().unwrap().coarsen().unwrap();

    let fine: Vec<_> = (0..4)
        .flat_map(|j| (0..4).map(move |i| (j, i)))
        .map(|(j, i)| topography.cell_stats(Measure::Simple, j, i))
        .collect();
    let low = fine.iter().map(|s| s.low).fold(f64::INFINITY, f64::min);
    let high = fine.iter().map(|s| s.high).fold(f64::NEG_INFINITY, f64::max);
    let mean = fine.iter().map(|s| s.mean).sum::<f64>() / 16.0;

    let merged = single.cell_stats(Measure::Simple, 0, 0);
    assert_eq!(merged.low, low);
    assert_eq!(merged.high, high);
    assert!((merged.mean - mean).abs() < 1e-9);
}
