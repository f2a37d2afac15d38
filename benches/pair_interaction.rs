//! Benchmarks for the pair-interaction hot path (§4.D) and the neighbor
//! sweep (§4.F) — the two inner loops the engine spends nearly all of its
//! wall time in.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sph_core::eos;
use sph_core::grid::Grid;
use sph_core::interaction::{interact, InteractionParams, Viscosity};
use sph_core::kernel;
use sph_core::particle::Particle;
use sph_core::vector::Vec3;

fn single_pair(c: &mut Criterion) {
    let mut pi = Particle::new(0, Vec3::new(0.0, 0.0, 0.0), Vec3::zero(), 1.0, 1000.0, 0.0011, true);
    let mut pj = Particle::new(1, Vec3::new(0.0008, 0.0, 0.0), Vec3::zero(), 1.0, 1000.0, 0.0011, true);
    for p in [&mut pi, &mut pj] {
        p.ref_density = 1000.0;
        p.cs = 10.0;
        p.pres_eq = eos::Kind::Tait;
        p.alpha = 1.0;
    }
    let params = InteractionParams {
        dim: kernel::Dimension::Two,
        kernel: kernel::Kind::CubicSpline,
        viscosity: Viscosity::Morris1997,
        no_slip: false,
        xsph: 0.5,
        periodic: [false, false, false],
        dom_size: Vec3::zero(),
        cell_factor: 2.0,
    };

    c.bench_function("interact_single_pair", |b| {
        b.iter(|| interact(black_box(&pi), black_box(&pj), black_box(&params), false));
    });
}

fn lattice_of(n_per_axis: usize, spacing: f64) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(n_per_axis * n_per_axis);
    let mut id = 0;
    for i in 0..n_per_axis {
        for j in 0..n_per_axis {
            let mut p = Particle::new(
                id,
                Vec3::new(i as f64 * spacing, j as f64 * spacing, 0.0),
                Vec3::zero(),
                1.0,
                1000.0,
                spacing * 1.1,
                true,
            );
            p.ref_density = 1000.0;
            p.cs = 10.0;
            particles.push(p);
            id += 1;
        }
    }
    particles
}

fn neighbor_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_sweep");
    for side in [8usize, 16, 24] {
        let spacing = 0.001;
        let h = spacing * 1.1;
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, &side| {
            b.iter(|| {
                let mut particles = lattice_of(side, spacing);
                let positions: Vec<Vec3> = particles.iter().map(|p| p.x).collect();
                let mut grid = Grid::new(
                    positions.into_iter(),
                    h,
                    2.0,
                    spacing,
                    kernel::Dimension::Two,
                    [false, false, false],
                );
                grid.rebuild(&mut particles);
                let params = InteractionParams {
                    dim: kernel::Dimension::Two,
                    kernel: kernel::Kind::CubicSpline,
                    viscosity: Viscosity::Morris1997,
                    no_slip: false,
                    xsph: 0.0,
                    periodic: [false, false, false],
                    dom_size: Vec3::zero(),
                    cell_factor: 2.0,
                };
                black_box(sph_core::sweep::run(&particles, &grid, &params, false));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, single_pair, neighbor_sweep);
criterion_main!(benches);
