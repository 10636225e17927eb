//! Structured (nj × ni) view of a rectilinear topography dataset.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::adjust;
use super::array::StatsArray;
use super::layer::ThinWallLayer;
use crate::elevation::{ElevationStats, ValueConvention};
use crate::error::{Result, ThinWallError};
use crate::grid::{CoarseCell, Grid};
use crate::pipeline::{EdgeRecord, TopographyDataset};
use crate::types::{CellIndex, EdgeIndex};

/// Which set of statistics to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    /// Values as computed from the fine data.
    #[default]
    Simple,
    /// Values after the thin-wall adjustments.
    Effective,
}

/// Simple and effective thin-wall statistics on a structured grid.
///
/// Built from a [`TopographyDataset`] whose grid is rectilinear and numbered
/// row-major (as [`Grid::rectilinear`] builds it). Each cell carries the
/// low/mean/high of its samples. Each face carries its barrier as `low`
/// together with the corridor mean and high, so `low` is the deepest level
/// at which the face can be crossed.
///
/// The adjustment operations act on the effective values only and treat
/// each 2 × 2 block of cells as one cell of the next coarser level;
/// [`StructuredTopography::coarsen`] then merges the blocks.
///
/// # Example
///
/// ```
/// use thinwall_rs::elevation::{CoordinateReference, ElevationField};
/// use thinwall_rs::grid::Grid;
/// use thinwall_rs::pipeline::ThinWallPipeline;
/// use thinwall_rs::refine::StructuredTopography;
///
/// let values: Vec<f64> = (0..64).map(|k| -10.0 + (k % 8) as f64).collect();
/// let field = ElevationField::from_regular_grid(
///     CoordinateReference::Planar,
///     (0.25, 0.25),
///     0.5,
///     8,
///     8,
///     &values,
/// )
/// .unwrap();
/// let grid = Grid::rectilinear(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 2.0, 4.0]).unwrap();
/// let dataset = ThinWallPipeline::default().run_on_grid(&grid, &field).unwrap();
///
/// let mut topography = StructuredTopography::from_dataset(&dataset).unwrap();
/// topography.push_corners(true).unwrap();
/// let coarse = topography.coarsen().unwrap();
/// assert_eq!((coarse.nj(), coarse.ni()), (1, 2));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuredTopography {
    convention: ValueConvention,
    simple: ThinWallLayer,
    effective: ThinWallLayer,
}

impl StructuredTopography {
    /// Build the structured view of a rectilinear dataset.
    ///
    /// Every cell needs a mean. A face without a barrier falls back to its
    /// step depth.
    pub fn from_dataset(dataset: &TopographyDataset) -> Result<Self> {
        let layout = RowMajorLayout::detect(dataset.grid())?;
        let convention = dataset.convention();
        let (nj, ni) = (layout.nj, layout.ni);

        let mut cells = Vec::with_capacity(nj * ni);
        for record in dataset.cells() {
            let stats = record.stats.ok_or_else(|| {
                ThinWallError::IncompleteCoverage(format!("cell {} has no samples", record.id))
            })?;
            cells.push(stats.to_obstruction(convention));
        }
        let face = |id: EdgeIndex| -> Result<ElevationStats> {
            let record = dataset.edge(id).ok_or_else(|| {
                ThinWallError::invalid_topology(format!("edge {id} has no record"))
            })?;
            face_stats(record, convention)
        };
        let u = collect_stats(nj, ni + 1, &layout.u_faces, &face)?;
        let v = collect_stats(nj + 1, ni, &layout.v_faces, &face)?;

        let simple = ThinWallLayer::new(StatsArray::from_fn(nj, ni, |j, i| cells[j * ni + i]), u, v)?;
        debug!(nj, ni, "Built structured topography");
        Ok(Self::from_layer(convention, simple))
    }

    /// Wrap a layer of obstruction statistics. Effective values start equal
    /// to the simple ones.
    pub fn from_layer(convention: ValueConvention, simple: ThinWallLayer) -> Self {
        Self {
            convention,
            effective: simple.clone(),
            simple,
        }
    }

    /// Number of cell rows.
    pub fn nj(&self) -> usize {
        self.simple.nj()
    }

    /// Number of cell columns.
    pub fn ni(&self) -> usize {
        self.simple.ni()
    }

    /// Value convention of the reported statistics.
    pub fn convention(&self) -> ValueConvention {
        self.convention
    }

    /// Obstruction statistics of one measure.
    pub fn layer(&self, measure: Measure) -> &ThinWallLayer {
        match measure {
            Measure::Simple => &self.simple,
            Measure::Effective => &self.effective,
        }
    }

    /// Cell `(j, i)` statistics in the dataset's convention.
    pub fn cell_stats(&self, measure: Measure, j: usize, i: usize) -> ElevationStats {
        self.layer(measure).cells.get(j, i).to_convention(self.convention)
    }

    /// West face of cell `(j, i)` (`i == ni` for the east boundary).
    pub fn u_stats(&self, measure: Measure, j: usize, i: usize) -> ElevationStats {
        self.layer(measure).u.get(j, i).to_convention(self.convention)
    }

    /// South face of cell `(j, i)` (`j == nj` for the north boundary).
    pub fn v_stats(&self, measure: Measure, j: usize, i: usize) -> ElevationStats {
        self.layer(measure).v.get(j, i).to_convention(self.convention)
    }

    /// Reset the effective values to the simple ones.
    pub fn init_effective(&mut self) {
        self.effective = self.simple.clone();
    }

    /// Replace the simple face values with step topography.
    pub fn set_edges_to_step(&mut self) {
        self.simple.set_faces_to_step();
    }

    /// Fold out the tallest corner of every block, in the order south-west,
    /// north-west, north-east, south-east.
    ///
    /// With `update_interior_mean_max` the mean and high of the folded cell
    /// and arms follow the new ridge as well as the low.
    pub fn push_corners(&mut self, update_interior_mean_max: bool) -> Result<()> {
        self.check_blocks()?;
        let layer = &mut self.effective;
        adjust::push_corner_sw(layer, update_interior_mean_max);
        layer.flip_j();
        adjust::push_corner_sw(layer, update_interior_mean_max);
        layer.flip_i();
        adjust::push_corner_sw(layer, update_interior_mean_max);
        layer.flip_j();
        adjust::push_corner_sw(layer, update_interior_mean_max);
        layer.flip_i();
        Ok(())
    }

    /// Lower every arm that stands above the other three, for lows then
    /// means.
    pub fn lower_tallest_buttress(&mut self) -> Result<()> {
        self.check_blocks()?;
        let ThinWallLayer { u, v, .. } = &mut self.effective;
        adjust::lower_tallest_arm(&mut u.low, &mut v.low);
        adjust::lower_tallest_arm(&mut u.mean, &mut v.mean);
        Ok(())
    }

    /// Fold dominant central ridges out to the block sides: south, north,
    /// west, then east.
    pub fn fold_out_central_ridges(&mut self) -> Result<()> {
        self.check_blocks()?;
        let layer = &mut self.effective;
        adjust::fold_ridge_south(layer);
        layer.flip_j();
        adjust::fold_ridge_south(layer);
        layer.transpose();
        adjust::fold_ridge_south(layer);
        layer.flip_j();
        adjust::fold_ridge_south(layer);
        layer.transpose();
        layer.flip_j();
        layer.flip_i();
        Ok(())
    }

    /// Expand the deepest exterior corner of each block over the block.
    pub fn invert_exterior_corners(&mut self) -> Result<()> {
        self.check_blocks()?;
        adjust::invert_exterior_corners(&mut self.effective);
        Ok(())
    }

    /// Merge 2 × 2 blocks of cells into a grid of half the resolution.
    ///
    /// Both measures are reduced: lows by minimum, means by average, highs
    /// by maximum.
    pub fn coarsen(&self) -> Result<Self> {
        self.check_blocks()?;
        let coarse = Self {
            convention: self.convention,
            simple: self.simple.coarsened(),
            effective: self.effective.coarsened(),
        };
        debug!(nj = coarse.nj(), ni = coarse.ni(), "Coarsened structured topography");
        Ok(coarse)
    }

    fn check_blocks(&self) -> Result<()> {
        let (nj, ni) = (self.nj(), self.ni());
        if nj % 2 != 0 || ni % 2 != 0 {
            return Err(ThinWallError::invalid_topology(format!(
                "2 x 2 block operations need an even number of rows and columns, got {nj} x {ni}"
            )));
        }
        Ok(())
    }
}

/// Barrier as low, corridor mean and high; step depth when no barrier.
fn face_stats(record: &EdgeRecord, convention: ValueConvention) -> Result<ElevationStats> {
    if let (Some(barrier), Some(stats)) = (record.barrier_depth, record.stats) {
        let sill = convention.to_obstruction(barrier);
        let corridor = stats.to_obstruction(convention);
        let high = corridor.high.max(sill);
        return Ok(ElevationStats {
            low: sill,
            mean: corridor.mean.clamp(sill, high),
            high,
        });
    }
    record
        .step_depth
        .map(|d| ElevationStats::constant(convention.to_obstruction(d)))
        .ok_or_else(|| {
            ThinWallError::IncompleteCoverage(format!(
                "edge {} has neither a barrier nor a step depth",
                record.id
            ))
        })
}

fn collect_stats(
    nj: usize,
    ni: usize,
    faces: &[EdgeIndex],
    face: &impl Fn(EdgeIndex) -> Result<ElevationStats>,
) -> Result<StatsArray> {
    let stats = faces.iter().map(|&id| face(id)).collect::<Result<Vec<_>>>()?;
    Ok(StatsArray::from_fn(nj, ni, |j, i| stats[j * ni + i]))
}

/// Face edges of a row-major rectilinear grid.
struct RowMajorLayout {
    nj: usize,
    ni: usize,
    /// West faces plus the east boundary, `(nj, ni + 1)` row-major
    u_faces: Vec<EdgeIndex>,
    /// South faces plus the north boundary, `(nj + 1, ni)` row-major
    v_faces: Vec<EdgeIndex>,
}

/// West, east, south and north edges of an axis-aligned quadrilateral.
struct CellFaces {
    west: EdgeIndex,
    east: EdgeIndex,
    south: EdgeIndex,
    north: EdgeIndex,
}

impl RowMajorLayout {
    fn detect(grid: &Grid) -> Result<Self> {
        let faces: Vec<CellFaces> = grid
            .cells()
            .iter()
            .map(|cell| classify_faces(grid, cell))
            .collect::<Result<_>>()?;
        let n = faces.len();

        // Walk the first row eastwards
        let mut ni = 1;
        let mut current = CellIndex::new(0);
        while let Some(next) = grid.neighbor(current, faces[current.get()].east) {
            if ni >= n {
                return Err(not_row_major("the first row does not end"));
            }
            ni += 1;
            current = next;
        }
        if n % ni != 0 {
            return Err(not_row_major(&format!("{n} cells do not fill rows of {ni}")));
        }
        let nj = n / ni;

        for (k, f) in faces.iter().enumerate() {
            let (j, i) = (k / ni, k % ni);
            let cell = CellIndex::new(k);
            let east = (i + 1 < ni).then(|| CellIndex::new(k + 1));
            let north = (j + 1 < nj).then(|| CellIndex::new(k + ni));
            if grid.neighbor(cell, f.east) != east || grid.neighbor(cell, f.north) != north {
                return Err(not_row_major(&format!(
                    "cell {cell} does not sit at row {j}, column {i}"
                )));
            }
        }

        let u_faces = (0..nj)
            .flat_map(|j| (0..=ni).map(move |i| (j, i)))
            .map(|(j, i)| {
                if i < ni {
                    faces[j * ni + i].west
                } else {
                    faces[j * ni + ni - 1].east
                }
            })
            .collect();
        let v_faces = (0..=nj)
            .flat_map(|j| (0..ni).map(move |i| (j, i)))
            .map(|(j, i)| {
                if j < nj {
                    faces[j * ni + i].south
                } else {
                    faces[(nj - 1) * ni + i].north
                }
            })
            .collect();

        Ok(Self {
            nj,
            ni,
            u_faces,
            v_faces,
        })
    }
}

fn not_row_major(reason: &str) -> ThinWallError {
    ThinWallError::invalid_topology(format!("grid is not row-major rectilinear: {reason}"))
}

fn classify_faces(grid: &Grid, cell: &CoarseCell) -> Result<CellFaces> {
    let not_quad = || {
        ThinWallError::invalid_topology(format!(
            "cell {} is not an axis-aligned quadrilateral",
            cell.id
        ))
    };
    if cell.edges.len() != 4 {
        return Err(not_quad());
    }

    let b = cell.bounds;
    let (mut west, mut east, mut south, mut north) = (None, None, None, None);
    for &e in &cell.edges {
        let edge = grid.edge(e);
        let slot = if edge.geometry.iter().all(|p| p.0 == b.x_min) {
            &mut west
        } else if edge.geometry.iter().all(|p| p.0 == b.x_max) {
            &mut east
        } else if edge.geometry.iter().all(|p| p.1 == b.y_min) {
            &mut south
        } else if edge.geometry.iter().all(|p| p.1 == b.y_max) {
            &mut north
        } else {
            return Err(not_quad());
        };
        if slot.replace(e).is_some() {
            return Err(not_quad());
        }
    }

    match (west, east, south, north) {
        (Some(west), Some(east), Some(south), Some(north)) => Ok(CellFaces {
            west,
            east,
            south,
            north,
        }),
        _ => Err(not_quad()),
    }
}
