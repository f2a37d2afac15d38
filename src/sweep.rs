//! Neighbor sweep (§4.F): the 13-cell forward stencil over cell columns,
//! parallelized across x-columns with `rayon`, each worker draining a
//! thread-local pair buffer into the shared particles under per-particle
//! locks (§5's "fan-in by buffering").

use rayon::prelude::*;

use crate::grid::Grid;
use crate::interaction::{interact, InteractionParams};
use crate::particle::Particle;

/// Runs one full neighbor sweep, calling `interact` for every candidate pair
/// (§4.F) and collecting pairs with exactly one fixed particle into
/// `pairs_with_fixed` for the next step's no-slip pre-pass (§4.H).
pub fn run(
    particles: &[Particle],
    grid: &Grid,
    params: &InteractionParams,
    shepard_tick: bool,
) -> Vec<(usize, usize)> {
    let x_range: Vec<usize> = grid.real_range(0).collect();
    let y_range: Vec<usize> = grid.real_range(1).collect();
    let z_range: Vec<usize> = grid.real_range(2).collect();

    let column_results: Vec<Vec<(usize, usize)>> = x_range
        .par_iter()
        .map(|&q1| {
            let mut local_fixed_pairs = Vec::new();
            for &q2 in &y_range {
                for &q3 in &z_range {
                    sweep_one_column(
                        particles, grid, params, shepard_tick, q1, q2, q3, &mut local_fixed_pairs,
                    );
                }
            }
            local_fixed_pairs
        })
        .collect();

    column_results.into_iter().flatten().collect()
}

#[allow(clippy::too_many_arguments)]
fn sweep_one_column(
    particles: &[Particle],
    grid: &Grid,
    params: &InteractionParams,
    shepard_tick: bool,
    q1: usize,
    q2: usize,
    q3: usize,
    fixed_pairs: &mut Vec<(usize, usize)>,
) {
    let mut candidates: Vec<(usize, usize)> = Vec::new();

    // 1. Remainder of the same chain (ordered, each unordered pair once).
    let mut t = grid.head(q1, q2, q3);
    while let Some(ti) = t {
        let mut u = particles[ti].link_next;
        while let Some(ui) = u {
            candidates.push((ti, ui));
            u = particles[ui].link_next;
        }
        t = particles[ti].link_next;
    }

    // Helper to pair every particle of `q1,q2,q3`'s chain against every
    // particle of another (possibly ghost) cell's full chain.
    let mut pair_against = |other: (usize, usize, usize), candidates: &mut Vec<(usize, usize)>| {
        let mut t = grid.head(q1, q2, q3);
        while let Some(ti) = t {
            let mut u = grid.head(other.0, other.1, other.2);
            while let Some(ui) = u {
                candidates.push((ti, ui));
                u = particles[ui].link_next;
            }
            t = particles[ti].link_next;
        }
    };

    // 2. (q1+1, q2, q3)
    if q1 + 1 < grid.counts[0] {
        pair_against((q1 + 1, q2, q3), &mut candidates);
    }

    // 3. (q1-1..=q1+1, q2+1, q3)
    if q2 + 1 < grid.counts[1] {
        for di in [-1i64, 0, 1] {
            let ni = q1 as i64 + di;
            if ni >= 0 && (ni as usize) < grid.counts[0] {
                pair_against((ni as usize, q2 + 1, q3), &mut candidates);
            }
        }
    }

    // 4. (q1-1..=q1+1, q2-1..=q2+1, q3+1)
    if q3 + 1 < grid.counts[2] {
        for di in [-1i64, 0, 1] {
            let ni = q1 as i64 + di;
            if ni < 0 || (ni as usize) >= grid.counts[0] {
                continue;
            }
            for dj in [-1i64, 0, 1] {
                let nj = q2 as i64 + dj;
                if nj < 0 || (nj as usize) >= grid.counts[1] {
                    continue;
                }
                pair_against((ni as usize, nj as usize, q3 + 1), &mut candidates);
            }
        }
    }

    for (ti, ui) in candidates {
        let pi = &particles[ti];
        let pj = &particles[ui];
        if !pi.is_free && !pj.is_free {
            continue;
        }
        interact(pi, pj, params, shepard_tick);
        if params.no_slip && pi.is_free != pj.is_free {
            if pi.is_free {
                fixed_pairs.push((ti, ui));
            } else {
                fixed_pairs.push((ui, ti));
            }
        }
    }
}
