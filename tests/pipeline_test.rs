//! Integration tests for whole-run properties.
//!
//! These tests verify:
//! - Determinism across runs and against sample order and duplicates
//! - Sequential and parallel runs agree
//! - Barrier monotonicity and bounds
//! - Topology errors, including crossing cells, abort before aggregation

use thinwall_rs::aggregate::AggregationWeighting;
use thinwall_rs::grid::rectilinear_polygons;
use thinwall_rs::logging;
use thinwall_rs::{
    CoordinateReference, CoverageFlag, ElevationField, FineSample, Grid, ThinWallConfig,
    ThinWallError, ThinWallPipeline,
};

/// Deterministic pseudo-random terrain on a regular lattice.
fn terrain(nx: usize, ny: usize, spacing: f64) -> Vec<FineSample> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut samples = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let noise = (state % 1000) as f64 / 100.0;
            let x = (i as f64 + 0.5) * spacing;
            let y = (j as f64 + 0.5) * spacing;
            samples.push(FineSample::new(x, y, -20.0 + 2.0 * (x * 0.7).sin() + noise));
        }
    }
    samples
}

fn field(samples: Vec<FineSample>) -> ElevationField {
    ElevationField::new(CoordinateReference::Planar, 0.25, samples).unwrap()
}

fn polygons() -> Vec<Vec<(f64, f64)>> {
    rectilinear_polygons(&[0.0, 1.5, 3.0, 4.0], &[0.0, 1.0, 2.5, 4.0])
}

#[test]
fn test_runs_are_deterministic() {
    let _ = logging::init_logging("thinwall_rs=debug");

    let samples = terrain(16, 16, 0.25);
    let pipeline = ThinWallPipeline::default();
    let a = pipeline.run(&polygons(), &field(samples.clone())).unwrap();
    let b = pipeline.run(&polygons(), &field(samples)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_sample_order_and_duplicates_do_not_matter() {
    let samples = terrain(16, 16, 0.25);
    let mut shuffled = samples.clone();
    shuffled.reverse();
    shuffled.rotate_left(37);
    shuffled.extend(samples.iter().step_by(5).copied());

    for weighting in [AggregationWeighting::Uniform, AggregationWeighting::AreaFraction] {
        let pipeline =
            ThinWallPipeline::new(ThinWallConfig::new().with_aggregation_weighting(weighting));
        let a = pipeline.run(&polygons(), &field(samples.clone())).unwrap();
        let b = pipeline.run(&polygons(), &field(shuffled.clone())).unwrap();
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.edges(), b.edges());
    }
}

#[test]
fn test_sequential_matches_parallel() {
    let samples = terrain(16, 16, 0.25);
    let sequential = ThinWallPipeline::new(ThinWallConfig::new().with_parallel(false))
        .run(&polygons(), &field(samples.clone()))
        .unwrap();
    let parallel = ThinWallPipeline::new(ThinWallConfig::new().with_parallel(true))
        .run(&polygons(), &field(samples))
        .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_barrier_bounds() {
    let dataset = ThinWallPipeline::default()
        .run(&polygons(), &field(terrain(16, 16, 0.25)))
        .unwrap();

    assert!(dataset.report().is_complete());
    for edge in dataset.edges() {
        let depth = edge.barrier_depth.unwrap();
        let stats = edge.stats.unwrap();
        assert!(stats.contains(depth), "edge {} out of range", edge.id);
        match edge.flag {
            CoverageFlag::DomainBoundary => assert_eq!(depth, stats.low),
            CoverageFlag::Disconnected => assert_eq!(depth, stats.high),
            CoverageFlag::Covered => assert_eq!(edge.adjacent_cells.len(), 2),
            CoverageFlag::SparseCoverage => unreachable!(),
        }
    }
}

#[test]
fn test_raising_a_sample_never_lowers_barriers() {
    let samples = terrain(16, 16, 0.25);
    let pipeline = ThinWallPipeline::default();
    let base = pipeline.run(&polygons(), &field(samples.clone())).unwrap();

    for k in [0, 17, 95, 130, 200, 255] {
        let mut raised = samples.clone();
        raised[k].value += 25.0;
        let after = pipeline.run(&polygons(), &field(raised)).unwrap();
        for (before, now) in base.edges().iter().zip(after.edges()) {
            assert!(now.barrier_depth.unwrap() >= before.barrier_depth.unwrap());
        }
    }
}

#[test]
fn test_run_on_grid_matches_run() {
    let samples = terrain(16, 16, 0.25);
    let grid = Grid::rectilinear(&[0.0, 1.5, 3.0, 4.0], &[0.0, 1.0, 2.5, 4.0]).unwrap();
    let pipeline = ThinWallPipeline::default();
    let from_grid = pipeline.run_on_grid(&grid, &field(samples.clone())).unwrap();
    let from_polygons = pipeline.run(&polygons(), &field(samples)).unwrap();
    assert_eq!(from_grid.cells(), from_polygons.cells());
    assert_eq!(from_grid.edges(), from_polygons.edges());
    assert_eq!(from_grid.grid().n_edges(), 24);
}

#[test]
fn test_topology_error_aborts() {
    let overlapping = vec![
        vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)],
        vec![(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)],
    ];
    let err = ThinWallPipeline::default()
        .run(&overlapping, &field(terrain(4, 4, 0.25)))
        .unwrap_err();
    assert!(matches!(err, ThinWallError::InvalidTopology { .. }));
}

#[test]
fn test_crossing_cells_abort() {
    // The cells cross like a plus sign; no corner of either lies in the other
    let crossing = vec![
        vec![(1.5, 0.0), (2.0, 0.0), (2.0, 4.0), (1.5, 4.0)],
        vec![(0.0, 1.5), (4.0, 1.5), (4.0, 2.0), (0.0, 2.0)],
    ];
    let err = ThinWallPipeline::default()
        .run(&crossing, &field(terrain(16, 16, 0.25)))
        .unwrap_err();
    assert!(matches!(err, ThinWallError::InvalidTopology { .. }));
}

#[test]
fn test_dataset_serializes() {
    let dataset = ThinWallPipeline::default()
        .run(&polygons(), &field(terrain(8, 8, 0.5)))
        .unwrap();
    let json = serde_json::to_value(&dataset).unwrap();
    assert_eq!(json["cells"].as_array().unwrap().len(), 9);
    assert_eq!(json["edges"].as_array().unwrap().len(), 24);
}
