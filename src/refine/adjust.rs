//! Effective thin-wall adjustments within 2 × 2 blocks.
//!
//! Every kernel treats each 2 × 2 block of cells as one cell of the next
//! coarser level. The block interior is a cross of four half-faces (the
//! "arms") meeting at the block centre. Kernels reshape that cross, the
//! block's cells and its outer faces so that connectivity across the block
//! survives when the block is coarsened. Kernels that read a neighbouring
//! block's faces take all their decisions before writing anything.
//!
//! For the block whose lower-left cell is `(j, i)`:
//!
//! | Arm   | Face                |
//! |-------|---------------------|
//! | south | `u[(j, i + 1)]`     |
//! | north | `u[(j + 1, i + 1)]` |
//! | west  | `v[(j + 1, i)]`     |
//! | east  | `v[(j + 1, i + 1)]` |

use super::array::Array2;
use super::layer::ThinWallLayer;

/// Lower-left cell of every 2 × 2 block.
fn block_origins(nj: usize, ni: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..nj / 2).flat_map(move |jb| (0..ni / 2).map(move |ib| (2 * jb, 2 * ib)))
}

/// Fold the south-west corner of each block out to its outer faces when
/// the corner's inner sill is higher than the opposite ridge.
///
/// The south-west cell is cut off by the corner ridge; its outer faces take
/// on that ridge and the inner arms drop to the opposite ridge so no new
/// diagonal connection opens through the block.
pub(crate) fn push_corner_sw(layer: &mut ThinWallLayer, update_interior_mean_max: bool) {
    let (nj, ni) = (layer.nj(), layer.ni());
    let ThinWallLayer { cells: c, u, v } = layer;

    for (j, i) in block_origins(nj, ni) {
        let sill = u.low[(j, i + 1)].min(v.low[(j + 1, i)]);
        let corner_mean = 0.5 * (u.mean[(j, i + 1)] + v.mean[(j + 1, i)]);
        let corner_high = u.high[(j, i + 1)].max(v.high[(j + 1, i)]);
        let opposite_ridge = u.low[(j + 1, i + 1)].max(v.low[(j + 1, i + 1)]);
        let outer_mean =
            (c.mean[(j, i + 1)] + c.mean[(j + 1, i)] + c.mean[(j + 1, i + 1)]) / 3.0;
        if sill <= opposite_ridge {
            continue;
        }

        u.low[(j, i + 1)] = opposite_ridge;
        v.low[(j + 1, i)] = opposite_ridge;

        u.low[(j, i)] = u.low[(j, i)].max(sill);
        v.low[(j, i)] = v.low[(j, i)].max(sill);
        u.mean[(j, i)] = u.mean[(j, i)].max(corner_mean);
        v.mean[(j, i)] = v.mean[(j, i)].max(corner_mean);
        u.high[(j, i)] = u.high[(j, i)].max(corner_high);
        v.high[(j, i)] = v.high[(j, i)].max(corner_high);

        c.low[(j, i)] = opposite_ridge;
        if update_interior_mean_max {
            c.mean[(j, i)] = c.mean[(j, i)].max(outer_mean);
            c.high[(j, i)] = c.high[(j, i)].max(opposite_ridge);
            u.mean[(j, i + 1)] = opposite_ridge;
            v.mean[(j + 1, i)] = opposite_ridge;
            u.high[(j, i + 1)] = opposite_ridge;
            v.high[(j + 1, i)] = opposite_ridge;
        }
    }
}

/// Lower any arm that stands above all three others down to the tallest of
/// them. Applied to one statistic (low or mean) at a time.
pub(crate) fn lower_tallest_arm(u: &mut Array2, v: &mut Array2) {
    let (nj, ni) = u.shape();
    for (j, i) in block_origins(nj, ni.saturating_sub(1)) {
        let faces = [(j, i + 1), (j + 1, i + 1)];
        let mut arms = [u[faces[0]], u[faces[1]], v[(j + 1, i)], v[(j + 1, i + 1)]];
        for k in 0..arms.len() {
            let others = (0..arms.len())
                .filter(|&m| m != k)
                .map(|m| arms[m])
                .fold(f64::NEG_INFINITY, f64::max);
            if arms[k] > others {
                arms[k] = others;
            }
        }
        u[faces[0]] = arms[0];
        u[faces[1]] = arms[1];
        v[(j + 1, i)] = arms[2];
        v[(j + 1, i + 1)] = arms[3];
    }
}

/// Fold a dominant east-west ridge through the block centre out onto the
/// outer faces of the block's southern half.
///
/// Applies when the east-west ridge is at least as high as both north-south
/// arms (and strictly above one of them) and the southern half is the
/// higher one to fold onto: a taller south arm, or equal arms with higher
/// southern cells or southern faces.
pub(crate) fn fold_ridge_south(layer: &mut ThinWallLayer) {
    let (nj, ni) = (layer.nj(), layer.ni());
    let ThinWallLayer { cells: c, u, v } = layer;

    let folds: Vec<(usize, usize, f64, f64)> = block_origins(nj, ni)
        .filter_map(|(j, i)| {
            let ridge = v.low[(j + 1, i)].min(v.low[(j + 1, i + 1)]);
            let south_arm = u.low[(j, i + 1)];
            let north_arm = u.low[(j + 1, i + 1)];
            let arm_min = south_arm.min(north_arm);
            let arm_max = south_arm.max(north_arm);

            let ridge_dominates = ridge > arm_min && ridge >= arm_max;
            let south_cells_higher =
                c.low[(j, i)] + c.low[(j, i + 1)] > c.low[(j + 1, i)] + c.low[(j + 1, i + 1)];
            let south_faces_higher =
                v.low[(j, i)] + v.low[(j, i + 1)] > v.low[(j + 2, i)] + v.low[(j + 2, i + 1)];
            let south_is_higher = south_arm > north_arm
                || (south_arm >= north_arm && (south_cells_higher || south_faces_higher));

            (ridge_dominates && south_is_higher).then_some((j, i, ridge, arm_min))
        })
        .collect();

    for (j, i, ridge, arm_min) in folds {
        u.low[(j, i)] = u.low[(j, i)].max(ridge);
        v.low[(j, i)] = v.low[(j, i)].max(ridge);
        v.low[(j, i + 1)] = v.low[(j, i + 1)].max(ridge);
        u.low[(j, i + 2)] = u.low[(j, i + 2)].max(ridge);

        v.low[(j + 1, i)] = arm_min;
        v.low[(j + 1, i + 1)] = arm_min;
        c.low[(j, i)] = arm_min;
        c.low[(j, i + 1)] = arm_min;
        u.low[(j, i + 1)] = arm_min;
    }
}

/// Block corner, named by compass direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Corner {
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl Corner {
    const ALL: [Corner; 4] = [
        Corner::SouthWest,
        Corner::SouthEast,
        Corner::NorthWest,
        Corner::NorthEast,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Offsets of the (u, v) outer faces meeting at this corner.
    fn outer(self) -> ((usize, usize), (usize, usize)) {
        match self {
            Corner::SouthWest => ((0, 0), (0, 0)),
            Corner::SouthEast => ((0, 2), (0, 1)),
            Corner::NorthWest => ((1, 0), (2, 0)),
            Corner::NorthEast => ((1, 2), (2, 1)),
        }
    }

    /// Offsets of the (u, v) arms bounding this corner's cell.
    fn inner(self) -> ((usize, usize), (usize, usize)) {
        match self {
            Corner::SouthWest => ((0, 1), (1, 0)),
            Corner::SouthEast => ((0, 1), (1, 1)),
            Corner::NorthWest => ((1, 1), (1, 0)),
            Corner::NorthEast => ((1, 1), (1, 1)),
        }
    }

    fn adjacent(self) -> [Corner; 2] {
        match self {
            Corner::SouthWest | Corner::NorthEast => [Corner::SouthEast, Corner::NorthWest],
            Corner::SouthEast | Corner::NorthWest => [Corner::SouthWest, Corner::NorthEast],
        }
    }

    fn opposite(self) -> Corner {
        match self {
            Corner::SouthWest => Corner::NorthEast,
            Corner::SouthEast => Corner::NorthWest,
            Corner::NorthWest => Corner::SouthEast,
            Corner::NorthEast => Corner::SouthWest,
        }
    }
}

/// Sill levels of one block corner.
#[derive(Clone, Copy, Debug)]
struct CornerLevels {
    /// Higher of the two outer faces: the exterior connection at the corner
    exterior: f64,
    /// Lower of the two arms: the connection into the block
    sill: f64,
    /// Higher of the two arms: the ridge cutting the corner off
    ridge: f64,
}

fn corner_levels(u: &Array2, v: &Array2, (j, i): (usize, usize), corner: Corner) -> CornerLevels {
    let at = |(dj, di): (usize, usize)| (j + dj, i + di);
    let (ou, ov) = corner.outer();
    let (iu, iv) = corner.inner();
    let (arm_u, arm_v) = (u[at(iu)], v[at(iv)]);
    CornerLevels {
        exterior: u[at(ou)].max(v[at(ov)]),
        sill: arm_u.min(arm_v),
        ridge: arm_u.max(arm_v),
    }
}

/// Expand a block's deepest exterior corner to fill the whole block.
///
/// A corner qualifies when its exterior connection is strictly deeper than
/// the other three corners and than its own sill into the block. The arms
/// and cells deepen to that level, and the other corners' outer faces are
/// raised to the ridges that used to cut them off.
pub(crate) fn invert_exterior_corners(layer: &mut ThinWallLayer) {
    let (nj, ni) = (layer.nj(), layer.ni());
    let ThinWallLayer { cells: c, u, v } = layer;

    let inversions: Vec<((usize, usize), Corner, [CornerLevels; 4])> = block_origins(nj, ni)
        .filter_map(|origin| {
            let levels = Corner::ALL.map(|corner| corner_levels(&u.low, &v.low, origin, corner));
            Corner::ALL
                .into_iter()
                .find(|&corner| {
                    let own = levels[corner.slot()];
                    let others = Corner::ALL
                        .into_iter()
                        .filter(|&other| other != corner)
                        .map(|other| levels[other.slot()].exterior)
                        .fold(f64::INFINITY, f64::min);
                    own.exterior < others && own.exterior < own.sill
                })
                .map(|corner| (origin, corner, levels))
        })
        .collect();

    for ((j, i), corner, levels) in inversions {
        let deep = levels[corner.slot()].exterior;
        for face in [(j, i + 1), (j + 1, i + 1)] {
            u.low[face] = u.low[face].min(deep);
        }
        for face in [(j + 1, i), (j + 1, i + 1)] {
            v.low[face] = v.low[face].min(deep);
        }
        for cell in [(j, i), (j, i + 1), (j + 1, i), (j + 1, i + 1)] {
            c.low[cell] = c.low[cell].min(deep);
        }

        let [a, b] = corner.adjacent();
        let (ridge_a, ridge_b) = (levels[a.slot()].ridge, levels[b.slot()].ridge);
        raise_outer_faces(&mut u.low, &mut v.low, (j, i), a, ridge_a);
        raise_outer_faces(&mut u.low, &mut v.low, (j, i), b, ridge_b);
        raise_outer_faces(&mut u.low, &mut v.low, (j, i), corner.opposite(), ridge_a.min(ridge_b));
    }
}

fn raise_outer_faces(
    u: &mut Array2,
    v: &mut Array2,
    (j, i): (usize, usize),
    corner: Corner,
    level: f64,
) {
    let ((uj, ui), (vj, vi)) = corner.outer();
    let (fu, fv) = ((j + uj, i + ui), (j + vj, i + vi));
    u[fu] = u[fu].max(level);
    v[fv] = v[fv].max(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation::ElevationStats;
    use crate::refine::array::StatsArray;

    /// One 2 × 2 block: flat cells at `floor`, every face at `floor`.
    fn flat_block(floor: f64) -> ThinWallLayer {
        let flat = |_: usize, _: usize| ElevationStats::constant(floor);
        ThinWallLayer::new(
            StatsArray::from_fn(2, 2, flat),
            StatsArray::from_fn(2, 3, flat),
            StatsArray::from_fn(3, 2, flat),
        )
        .unwrap()
    }

    fn set_low(a: &mut StatsArray, at: (usize, usize), value: f64) {
        a.low[at] = value;
        a.mean[at] = value;
        a.high[at] = value;
    }

    #[test]
    fn test_block_origins() {
        let origins: Vec<_> = block_origins(4, 6).collect();
        assert_eq!(origins.len(), 6);
        assert_eq!(origins[0], (0, 0));
        assert_eq!(origins[5], (2, 4));
        // Odd trailing rows and columns are not part of any block
        assert_eq!(block_origins(3, 3).count(), 1);
    }

    #[test]
    fn test_push_corner_folds_high_sill_outwards() {
        let mut layer = flat_block(-10.0);
        // A ridge cuts off the south-west cell
        set_low(&mut layer.u, (0, 1), 5.0);
        set_low(&mut layer.v, (1, 0), 7.0);
        push_corner_sw(&mut layer, true);

        // The sill moves onto the outer faces
        assert_eq!(layer.u.low[(0, 0)], 5.0);
        assert_eq!(layer.v.low[(0, 0)], 5.0);
        assert_eq!(layer.u.high[(0, 0)], 7.0);
        assert_eq!(layer.u.mean[(0, 0)], 6.0);
        // Inner arms drop to the opposite ridge
        assert_eq!(layer.u.low[(0, 1)], -10.0);
        assert_eq!(layer.v.low[(1, 0)], -10.0);
        assert_eq!(layer.v.high[(1, 0)], -10.0);
        // The cell joins the rest of the block
        assert_eq!(layer.cells.low[(0, 0)], -10.0);
        // Faces of the other corners are untouched
        assert_eq!(layer.u.low[(1, 2)], -10.0);
    }

    #[test]
    fn test_push_corner_keeps_lower_sill() {
        let mut layer = flat_block(-10.0);
        set_low(&mut layer.u, (0, 1), 5.0);
        // The opposite ridge is higher than the sill
        set_low(&mut layer.u, (1, 1), 6.0);
        let before = layer.clone();
        push_corner_sw(&mut layer, true);
        assert_eq!(layer, before);
    }

    #[test]
    fn test_push_corner_without_interior_update() {
        let mut layer = flat_block(-10.0);
        set_low(&mut layer.u, (0, 1), 5.0);
        set_low(&mut layer.v, (1, 0), 5.0);
        push_corner_sw(&mut layer, false);
        assert_eq!(layer.u.low[(0, 1)], -10.0);
        // Mean and high of the arms are left alone
        assert_eq!(layer.u.mean[(0, 1)], 5.0);
        assert_eq!(layer.cells.high[(0, 0)], -10.0);
    }

    #[test]
    fn test_lower_tallest_arm() {
        let mut layer = flat_block(0.0);
        layer.u.low[(0, 1)] = 9.0;
        layer.u.low[(1, 1)] = 4.0;
        layer.v.low[(1, 0)] = 2.0;
        layer.v.low[(1, 1)] = 3.0;
        let ThinWallLayer { u, v, .. } = &mut layer;
        lower_tallest_arm(&mut u.low, &mut v.low);
        assert_eq!(layer.u.low[(0, 1)], 4.0);
        assert_eq!(layer.u.low[(1, 1)], 4.0);
        assert_eq!(layer.v.low[(1, 0)], 2.0);
        assert_eq!(layer.v.low[(1, 1)], 3.0);
    }

    #[test]
    fn test_fold_ridge_south() {
        let mut layer = flat_block(-10.0);
        // East-west ridge through the centre, south arm taller than north
        layer.v.low[(1, 0)] = 8.0;
        layer.v.low[(1, 1)] = 6.0;
        layer.u.low[(0, 1)] = 3.0;
        layer.u.low[(1, 1)] = 1.0;
        fold_ridge_south(&mut layer);

        // Outer faces of the southern half carry the ridge
        for face in [(0, 0), (0, 2)] {
            assert_eq!(layer.u.low[face], 6.0);
        }
        for face in [(0, 0), (0, 1)] {
            assert_eq!(layer.v.low[face], 6.0);
        }
        // The central ridge and southern interior drop to the lower arm
        assert_eq!(layer.v.low[(1, 0)], 1.0);
        assert_eq!(layer.v.low[(1, 1)], 1.0);
        assert_eq!(layer.u.low[(0, 1)], 1.0);
        assert_eq!(layer.cells.low[(0, 0)], 1.0);
        assert_eq!(layer.cells.low[(1, 0)], -10.0);
    }

    #[test]
    fn test_fold_ridge_needs_dominant_ridge() {
        let mut layer = flat_block(-10.0);
        layer.v.low[(1, 0)] = 2.0;
        layer.v.low[(1, 1)] = 2.0;
        layer.u.low[(0, 1)] = 3.0;
        let before = layer.clone();
        fold_ridge_south(&mut layer);
        assert_eq!(layer, before);
    }

    #[test]
    fn test_invert_deep_exterior_corner() {
        let mut layer = flat_block(0.0);
        // All arms form a plus-shaped wall at 10
        for face in [(0, 1), (1, 1)] {
            layer.u.low[face] = 10.0;
        }
        for face in [(1, 0), (1, 1)] {
            layer.v.low[face] = 10.0;
        }
        // Outer faces at 5 except a deep south-west corner
        for face in [(0, 2), (1, 0), (1, 2)] {
            layer.u.low[face] = 5.0;
        }
        for face in [(0, 1), (2, 0), (2, 1)] {
            layer.v.low[face] = 5.0;
        }
        layer.u.low[(0, 0)] = -20.0;
        layer.v.low[(0, 0)] = -30.0;

        invert_exterior_corners(&mut layer);

        // The block deepens to the corner's exterior level
        for face in [(0, 1), (1, 1)] {
            assert_eq!(layer.u.low[face], -20.0);
        }
        assert_eq!(layer.cells.low[(1, 1)], -20.0);
        // Other corners are walled off by the old ridges
        assert_eq!(layer.u.low[(0, 2)], 10.0);
        assert_eq!(layer.v.low[(2, 1)], 10.0);
        assert_eq!(layer.u.low[(1, 0)], 10.0);
        // The deep corner itself keeps its faces
        assert_eq!(layer.u.low[(0, 0)], -20.0);
    }

    #[test]
    fn test_invert_needs_a_unique_deepest_corner() {
        let mut layer = flat_block(0.0);
        layer.u.low[(0, 0)] = -5.0;
        layer.v.low[(0, 0)] = -5.0;
        layer.u.low[(1, 2)] = -5.0;
        layer.v.low[(2, 1)] = -5.0;
        let before = layer.clone();
        invert_exterior_corners(&mut layer);
        assert_eq!(layer, before);
    }
}
