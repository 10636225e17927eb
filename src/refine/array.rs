//! Row-major value arrays for structured grids.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::elevation::ElevationStats;

/// Dense `nj` × `ni` array indexed by `(j, i)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Array2 {
    nj: usize,
    ni: usize,
    data: Vec<f64>,
}

impl Array2 {
    /// Array with every entry set to `value`.
    pub fn filled(nj: usize, ni: usize, value: f64) -> Self {
        Self {
            nj,
            ni,
            data: vec![value; nj * ni],
        }
    }

    /// Array with entry `(j, i)` set to `f(j, i)`.
    pub fn from_fn(nj: usize, ni: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let data = (0..nj)
            .flat_map(|j| (0..ni).map(move |i| (j, i)))
            .map(|(j, i)| f(j, i))
            .collect();
        Self { nj, ni, data }
    }

    /// `(nj, ni)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nj, self.ni)
    }

    /// Entries in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Reverse the order of the rows.
    pub fn flip_j(&mut self) {
        let ni = self.ni;
        for j in 0..self.nj / 2 {
            let mirror = self.nj - 1 - j;
            for i in 0..ni {
                self.data.swap(j * ni + i, mirror * ni + i);
            }
        }
    }

    /// Reverse the order of the columns.
    pub fn flip_i(&mut self) {
        if self.ni == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.ni) {
            row.reverse();
        }
    }

    /// The transposed array.
    pub fn transposed(&self) -> Self {
        Self::from_fn(self.ni, self.nj, |j, i| self[(i, j)])
    }
}

impl Index<(usize, usize)> for Array2 {
    type Output = f64;

    #[inline]
    fn index(&self, (j, i): (usize, usize)) -> &f64 {
        debug_assert!(j < self.nj && i < self.ni);
        &self.data[j * self.ni + i]
    }
}

impl IndexMut<(usize, usize)> for Array2 {
    #[inline]
    fn index_mut(&mut self, (j, i): (usize, usize)) -> &mut f64 {
        debug_assert!(j < self.nj && i < self.ni);
        &mut self.data[j * self.ni + i]
    }
}

/// Low, mean and high arrays of one entity family (cells, u-edges or
/// v-edges).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsArray {
    /// Lowest value (the sill for edges)
    pub low: Array2,
    /// Mean value
    pub mean: Array2,
    /// Highest value
    pub high: Array2,
}

impl StatsArray {
    /// Arrays with entry `(j, i)` taken from `f(j, i)`.
    pub fn from_fn(nj: usize, ni: usize, mut f: impl FnMut(usize, usize) -> ElevationStats) -> Self {
        let stats: Vec<ElevationStats> = (0..nj)
            .flat_map(|j| (0..ni).map(move |i| (j, i)))
            .map(|(j, i)| f(j, i))
            .collect();
        let pick = |g: fn(&ElevationStats) -> f64| Array2::from_fn(nj, ni, |j, i| g(&stats[j * ni + i]));
        Self {
            low: pick(|s| s.low),
            mean: pick(|s| s.mean),
            high: pick(|s| s.high),
        }
    }

    /// `(nj, ni)`.
    pub fn shape(&self) -> (usize, usize) {
        self.mean.shape()
    }

    /// Statistics at `(j, i)`.
    pub fn get(&self, j: usize, i: usize) -> ElevationStats {
        ElevationStats {
            low: self.low[(j, i)],
            mean: self.mean[(j, i)],
            high: self.high[(j, i)],
        }
    }

    /// Set all three values at `(j, i)`.
    pub fn set(&mut self, j: usize, i: usize, stats: ElevationStats) {
        self.low[(j, i)] = stats.low;
        self.mean[(j, i)] = stats.mean;
        self.high[(j, i)] = stats.high;
    }

    pub(crate) fn flip_j(&mut self) {
        self.low.flip_j();
        self.mean.flip_j();
        self.high.flip_j();
    }

    pub(crate) fn flip_i(&mut self) {
        self.low.flip_i();
        self.mean.flip_i();
        self.high.flip_i();
    }

    pub(crate) fn transposed(&self) -> Self {
        Self {
            low: self.low.transposed(),
            mean: self.mean.transposed(),
            high: self.high.transposed(),
        }
    }

    /// Combine each 2 × 2 block into one entry: min of lows, mean of means,
    /// max of highs.
    pub(crate) fn reduce_blocks(&self) -> Self {
        let (nj, ni) = self.shape();
        self.reduce(nj / 2, ni / 2, |j, i| {
            [(2 * j, 2 * i), (2 * j, 2 * i + 1), (2 * j + 1, 2 * i), (2 * j + 1, 2 * i + 1)]
        })
    }

    /// Combine the two halves of each coarse u-edge (stacked in j).
    pub(crate) fn reduce_u_pairs(&self) -> Self {
        let (nj, ni) = self.shape();
        self.reduce(nj / 2, ni / 2 + 1, |j, i| [(2 * j, 2 * i), (2 * j + 1, 2 * i)])
    }

    /// Combine the two halves of each coarse v-edge (side by side in i).
    pub(crate) fn reduce_v_pairs(&self) -> Self {
        let (nj, ni) = self.shape();
        self.reduce(nj / 2 + 1, ni / 2, |j, i| [(2 * j, 2 * i), (2 * j, 2 * i + 1)])
    }

    fn reduce<const N: usize>(
        &self,
        nj: usize,
        ni: usize,
        members: impl Fn(usize, usize) -> [(usize, usize); N],
    ) -> Self {
        let n = N as f64;
        Self {
            low: Array2::from_fn(nj, ni, |j, i| {
                members(j, i).iter().map(|&k| self.low[k]).fold(f64::INFINITY, f64::min)
            }),
            mean: Array2::from_fn(nj, ni, |j, i| {
                members(j, i).iter().map(|&k| self.mean[k]).sum::<f64>() / n
            }),
            high: Array2::from_fn(nj, ni, |j, i| {
                members(j, i).iter().map(|&k| self.high[k]).fold(f64::NEG_INFINITY, f64::max)
            }),
        }
    }
}
