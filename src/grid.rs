//! Uniform-grid spatial index: head-of-chain (HOC) array plus the
//! linked chain stored in each particle's `link_next` (§4.E).

use log::warn;

use crate::kernel::Dimension;
use crate::particle::Particle;
use crate::vector::Vec3;

/// Per-axis padding and cell-count bookkeeping plus the HOC array.
///
/// The bounding box and cell count are computed once at construction
/// (`Grid::new`) from the initial particle cloud and then held fixed for
/// the run (§5 "Resource lifecycle" — the HOC array is not resized even if
/// particles later leave and the occupied region shrinks). Every step calls
/// `rebuild`, which only clears and repopulates the chains.
pub struct Grid {
    pub cell_size: f64,
    pub counts: [usize; 3],
    pub blpf: Vec3,
    pub trpr: Vec3,
    pub periodic: [bool; 3],
    dim: Dimension,
    hoc: Vec<Option<usize>>,
}

/// Outcome of placing one particle into the grid. `Real` covers both an
/// in-range cell and one clamped back inside the array from just outside it
/// (§4.E "clamped... otherwise it is reported as leaving").
enum Placement {
    Real([usize; 3]),
    Leaving,
}

impl Grid {
    /// Computes the bounding box, cell size, and cell counts from the
    /// current particle cloud (§4.E). `cell_factor` is 3.0 for the quintic
    /// spline kernel, 2.0 otherwise (`kernel::Kind::cell_factor`).
    pub fn new(
        positions: impl Iterator<Item = Vec3>,
        h_max: f64,
        cell_factor: f64,
        initial_dist: f64,
        dim: Dimension,
        periodic: [bool; 3],
    ) -> Self {
        assert!(h_max > 0.0, "h_max must be positive to build a grid");

        let mut min = Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut any = false;
        for p in positions {
            any = true;
            for axis in 0..3 {
                if p[axis] < min[axis] {
                    min[axis] = p[axis];
                }
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                }
            }
        }
        assert!(any, "cannot build a grid over zero particles");

        let jitter = initial_dist / 50.0;
        let non_periodic_pad = h_max / 2.0;
        let mut blpf = Vec3::zero();
        let mut trpr = Vec3::zero();
        let mut counts = [1usize; 3];
        let cell_size = cell_factor * h_max;

        for axis in 0..3 {
            if axis == 2 && dim == Dimension::Two {
                blpf[axis] = 0.0;
                trpr[axis] = cell_size;
                counts[axis] = 1;
                continue;
            }
            let pad = if periodic[axis] { jitter } else { non_periodic_pad };
            blpf[axis] = min[axis] - pad;
            trpr[axis] = max[axis] + pad;
            let span = (trpr[axis] - blpf[axis]).max(cell_size);
            let real_count = (span / cell_size).ceil().max(1.0) as usize;
            counts[axis] = if periodic[axis] { real_count + 2 } else { real_count };
        }

        let total = counts[0] * counts[1] * counts[2];
        Grid {
            cell_size,
            counts,
            blpf,
            trpr,
            periodic,
            dim,
            hoc: vec![None; total],
        }
    }

    #[inline]
    fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.counts[0] * (j + self.counts[1] * k)
    }

    pub fn head(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        self.hoc[self.flat_index(i, j, k)]
    }

    /// Real (non-ghost) index range for an axis — `0..counts[axis]` when not
    /// periodic, `1..counts[axis]-1` when periodic (the two ghost columns
    /// sit at index 0 and `counts[axis]-1`).
    pub fn real_range(&self, axis: usize) -> std::ops::Range<usize> {
        if self.periodic[axis] {
            1..(self.counts[axis] - 1)
        } else {
            0..self.counts[axis]
        }
    }

    fn locate(&self, pos: Vec3) -> Placement {
        let mut idx = [0usize; 3];
        for axis in 0..3 {
            if axis == 2 && self.dim == Dimension::Two {
                idx[axis] = 0;
                continue;
            }
            let real_count = if self.periodic[axis] {
                self.counts[axis] - 2
            } else {
                self.counts[axis]
            };
            let rel = (pos[axis] - self.blpf[axis]) / self.cell_size;
            let raw = rel.floor();

            if self.periodic[axis] {
                // Positions are expected to already be wrapped into
                // [blpf, trpr) by the integrator; fold defensively anyway.
                let wrapped = ((raw as i64).rem_euclid(real_count as i64)) as usize;
                idx[axis] = wrapped + 1;
                continue;
            }

            if raw < 0.0 {
                let overshoot = -raw * self.cell_size;
                if overshoot <= self.cell_size + f64::EPSILON {
                    idx[axis] = 0;
                } else {
                    return Placement::Leaving;
                }
            } else if raw as usize >= real_count {
                let overshoot = (raw as usize + 1 - real_count) as f64 * self.cell_size;
                if overshoot <= self.cell_size + f64::EPSILON {
                    idx[axis] = real_count - 1;
                } else {
                    return Placement::Leaving;
                }
            } else {
                idx[axis] = raw as usize;
            }
        }
        Placement::Real(idx)
    }

    /// Clears HOC and every particle's chain link, then re-inserts every
    /// particle by head-insertion, and re-aliases the ghost columns.
    /// Returns the indices of particles placed outside the padded bounding
    /// box (candidates for the leave-check in `Domain::solve` step 10).
    pub fn rebuild(&mut self, particles: &mut [Particle]) -> Vec<usize> {
        for slot in self.hoc.iter_mut() {
            *slot = None;
        }
        let mut leaving = Vec::new();

        for (pidx, p) in particles.iter_mut().enumerate() {
            p.link_next = None;
            match self.locate(p.x) {
                Placement::Real(idx) => {
                    p.cell = idx;
                    let flat = self.flat_index(idx[0], idx[1], idx[2]);
                    p.link_next = self.hoc[flat];
                    self.hoc[flat] = Some(pidx);
                }
                Placement::Leaving => {
                    warn!("particle {} left the domain bounding box", p.id);
                    leaving.push(pidx);
                }
            }
        }

        self.alias_ghost_columns();
        leaving
    }

    fn alias_ghost_columns(&mut self) {
        for axis in 0..3 {
            if !self.periodic[axis] {
                continue;
            }
            let n = self.counts[axis];
            let low_ghost = 0usize;
            let high_ghost = n - 1;
            let first_real = 1usize;
            let last_real = n - 2;

            let (other_a, other_b) = match axis {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            for a in 0..self.counts[other_a] {
                for b in 0..self.counts[other_b] {
                    let (lo, hi, first, last) =
                        self.with_axis(axis, other_a, other_b, a, b, low_ghost, high_ghost, first_real, last_real);
                    let flat_low = lo;
                    let flat_high = hi;
                    self.hoc[flat_low] = self.hoc[last];
                    self.hoc[flat_high] = self.hoc[first];
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn with_axis(
        &self,
        axis: usize,
        other_a: usize,
        other_b: usize,
        a: usize,
        b: usize,
        low: usize,
        high: usize,
        first: usize,
        last: usize,
    ) -> (usize, usize, usize, usize) {
        let mut coords_low = [0usize; 3];
        let mut coords_high = [0usize; 3];
        let mut coords_first = [0usize; 3];
        let mut coords_last = [0usize; 3];
        for c in [
            &mut coords_low,
            &mut coords_high,
            &mut coords_first,
            &mut coords_last,
        ]
        .iter_mut()
        {
            c[other_a] = a;
            c[other_b] = b;
        }
        coords_low[axis] = low;
        coords_high[axis] = high;
        coords_first[axis] = first;
        coords_last[axis] = last;
        (
            self.flat_index(coords_low[0], coords_low[1], coords_low[2]),
            self.flat_index(coords_high[0], coords_high[1], coords_high[2]),
            self.flat_index(coords_first[0], coords_first[1], coords_first[2]),
            self.flat_index(coords_last[0], coords_last[1], coords_last[2]),
        )
    }
}
