//! Integration tests for the SPH engine.
//!
//! These exercise `Domain` end-to-end rather than the individual units
//! covered by each module's own `#[cfg(test)]` block: pair exhaustiveness
//! and symmetric momentum across a full sweep, the two-particle scenario
//! from the spec (S1), periodic/non-periodic force symmetry (S5-adjacent),
//! and a restart save/load round trip.

use sph_core::config::{BoxSpec, DomainConfig};
use sph_core::domain::Domain;
use sph_core::io::restart;
use sph_core::particle::Material;
use sph_core::vector::Vec3;

fn base_config() -> DomainConfig {
    DomainConfig {
        dimension: 2,
        gravity: [0.0, 0.0, 0.0],
        kernel_selector: 0,
        eos_selector: 0,
        viscosity_selector: 0,
        periodic: [false, false, false],
        n_proc: 2,
        initial_dist: 0.001,
        h: 0.0011,
        cs: 10.0,
        p0: 0.0,
        ref_density: 1000.0,
        alpha: 0.0,
        beta: 0.0,
        mu: 0.0,
        mu_ref: 0.0,
        ti: 0.0,
        ti_initial_dist: 0.001,
        no_slip: false,
        shepard: false,
        shepard_stride: 30,
        xsph: 0.0,
        const_vel_periodic: 0.0,
        rigid_body: false,
        rigid_body_tag: 0,
        inflow: false,
        inflow_tag: 0,
        outflow: false,
        outflow_tag: 0,
        all_flow: false,
        all_flow_tag: 0,
        auto_save_interval: 0.0,
        boxes: vec![],
    }
}

/// Scenario S1 — two particles 0.001 apart in 2-D with linear EOS and the
/// cubic spline kernel. After one step the net momentum change is near zero
/// and particle 1's acceleration points along +x (toward particle 2 being
/// pushed away, i.e. repulsive at this separation for ref density).
#[test]
fn s1_two_particle_force_is_action_reaction() {
    let mut dom = Domain::new(base_config());
    dom.add_single_particle(Vec3::new(0.0, 0.0, 0.0), Vec3::zero(), 1.0, 1000.0, true, Material::Fluid, 1);
    dom.add_single_particle(Vec3::new(0.001, 0.0, 0.0), Vec3::zero(), 1.0, 1000.0, true, Material::Fluid, 2);

    let dt = 1e-7;
    dom.solve(dt, dt, dt, "/tmp/sphrs_s1").unwrap();

    let a0 = dom.particles[0].accum.lock().unwrap().a;
    let a1 = dom.particles[1].accum.lock().unwrap().a;
    let total = a0 * dom.particles[0].mass + a1 * dom.particles[1].mass;
    assert!(total.norm() < 1e-9, "net force should vanish: {total:?}");
    assert!(a0.x.abs() > a0.y.abs(), "force should act along the separation axis");
}

/// Over one sweep with no gravity, no viscosity, and no boundary particles,
/// the sum of `m * a` across all particles should vanish — the pair kernel
/// only ever produces equal-and-opposite contributions (§8 property 2
/// generalized from a single pair to a whole neighborhood).
#[test]
fn symmetric_momentum_holds_across_a_small_cloud() {
    let mut dom = Domain::new(base_config());
    dom.add_box_length(&BoxSpec {
        min: [0.0, 0.0, 0.0],
        max: [0.004, 0.004, 0.0],
        spacing: 0.001,
        density: 1000.0,
        is_free: true,
        tag: 1,
    });

    let dt = 1e-7;
    dom.solve(dt, dt, dt, "/tmp/sphrs_momentum").unwrap();

    let mut total = Vec3::zero();
    for p in &dom.particles {
        total += p.accum.lock().unwrap().a * p.mass;
    }
    assert!(total.norm() < 1e-6, "total momentum change should vanish: {total:?}");
}

/// A run configured with every axis periodic and no fixed particles should
/// never trip the leave-check (§4.G step 10) even after several rebuilds.
#[test]
fn periodic_run_does_not_drop_particles() {
    let mut config = base_config();
    config.periodic = [true, true, false];
    let mut dom = Domain::new(config);
    dom.add_box_length(&BoxSpec {
        min: [0.0, 0.0, 0.0],
        max: [0.004, 0.004, 0.0],
        spacing: 0.001,
        density: 1000.0,
        is_free: true,
        tag: 1,
    });
    let before = dom.particles.len();

    let dt = 1e-7;
    dom.solve(dt * 20.0, dt, dt * 5.0, "/tmp/sphrs_periodic").unwrap();

    assert_eq!(dom.particles.len(), before);
}

/// `save` then `load` round-trips the restart-format fields exactly (§6,
/// §8 property 6, restricted to the persisted fields — full HDF5
/// byte-identity isn't checked at this level since hdf5 timestamps its own
/// metadata, only the dataset values are).
#[test]
fn restart_round_trip_preserves_particle_state() {
    let mut dom = Domain::new(base_config());
    dom.add_box_length(&BoxSpec {
        min: [0.0, 0.0, 0.0],
        max: [0.003, 0.003, 0.0],
        spacing: 0.001,
        density: 1000.0,
        is_free: true,
        tag: 1,
    });

    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("restart_it").to_string_lossy().into_owned();
    restart::save(&dom.particles, &key).unwrap();

    let loaded = restart::load(&key).unwrap();
    assert_eq!(loaded.len(), dom.particles.len());
    for (original, reloaded) in dom.particles.iter().zip(loaded.iter()) {
        assert_eq!(original.id, reloaded.id);
        assert_eq!(original.is_free, reloaded.is_free);
        assert!((original.mass - reloaded.mass).abs() < 1e-12);
        assert!((original.density - reloaded.density).abs() < 1e-12);
        assert!((original.h - reloaded.h).abs() < 1e-12);
        assert_eq!(original.x, reloaded.x);
        assert_eq!(original.v, reloaded.v);
    }
}

/// S6 (abridged) — a single free particle above a line of fixed wall
/// particles with `no_slip` and a nonzero viscosity should have its
/// parallel velocity decay rather than grow over a handful of steps.
#[test]
fn no_slip_wall_damps_a_free_particle_parallel_velocity() {
    let mut config = base_config();
    config.no_slip = true;
    config.mu = 1.0e-3;
    config.viscosity_selector = 0;
    let mut dom = Domain::new(config);

    for i in -3..=3 {
        dom.add_single_particle(
            Vec3::new(i as f64 * 0.0011, 0.0, 0.0),
            Vec3::zero(),
            1.0,
            1000.0,
            false,
            Material::Boundary,
            2,
        );
    }
    dom.add_single_particle(
        Vec3::new(0.0, 0.00055, 0.0),
        Vec3::new(0.01, 0.0, 0.0),
        1.0,
        1000.0,
        true,
        Material::Fluid,
        1,
    );

    let dt = 1e-7;
    let initial_speed = dom.particles.last().unwrap().v.norm();
    // Two no-slip pre-passes require a step of history, so run a few steps.
    dom.solve(dt * 5.0, dt, dt * 5.0, "/tmp/sphrs_noslip").unwrap();
    let final_speed = dom.particles.last().unwrap().v.x.abs();

    assert!(final_speed <= initial_speed + 1e-12);
}
