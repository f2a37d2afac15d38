//! Pair interaction (§4.D) — the numerical heart of the sweep. `interact`
//! is the symmetric contribution of one ordered pair to both particles'
//! accumulators, term-for-term against the source's `CalcForce`.

use log::warn;

use crate::boundary::{periodic_correct, virtual_velocity};
use crate::kernel;
use crate::particle::Particle;
use crate::vector::Vec3;

/// The four selectable real-viscosity formulas (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Viscosity {
    Morris1997,
    Shao2003,
    Laplacian,
    Takeda1994,
}

impl Viscosity {
    pub fn from_selector(selector: usize) -> Self {
        match selector {
            0 => Viscosity::Morris1997,
            1 => Viscosity::Shao2003,
            2 => Viscosity::Laplacian,
            3 => Viscosity::Takeda1994,
            other => {
                warn!("viscosity selector {other} is out of range, falling back to Morris 1997");
                Viscosity::Morris1997
            }
        }
    }
}

/// Parameters shared by every call to `interact` within one step — the
/// portion of `DomainConfig` the pair kernel actually reads.
pub struct InteractionParams {
    pub dim: kernel::Dimension,
    pub kernel: kernel::Kind,
    pub viscosity: Viscosity,
    pub no_slip: bool,
    pub xsph: f64,
    pub periodic: [bool; 3],
    pub dom_size: Vec3,
    pub cell_factor: f64,
}

/// Symmetrically accumulates the contribution of the ordered pair `(i, j)`
/// into both particles' accumulators (§4.D). Never reads or writes `x`, `v`,
/// or `mass` — only the `Mutex`-guarded accumulator fields.
pub fn interact(i: &Particle, j: &Particle, params: &InteractionParams, shepard_tick: bool) {
    let h = 0.5 * (i.h + j.h);
    let mut r_ij = i.x - j.x;
    periodic_correct(
        &mut r_ij,
        i.cell,
        j.cell,
        params.periodic,
        params.dom_size,
        2.0 * params.cell_factor * h,
    );
    let r = r_ij.norm();
    if r <= 0.0 {
        warn!("particles {} and {} coincide; pair skipped", i.id, j.id);
        return;
    }
    let r_hat = r_ij / r;

    let v_ij_raw = i.v - j.v;
    let v_ij = if params.no_slip && i.is_free != j.is_free {
        no_slip_velocity(i, j, params)
    } else {
        v_ij_raw
    };

    let (p_i, c_i) = i.pressure_and_sound_speed();
    let (p_j, c_j) = j.pressure_and_sound_speed();

    let w = params.kernel.w(r, h, params.dim);
    let grad_w = params.kernel.grad_w(r, h, params.dim);

    // Artificial viscosity (Monaghan). Computed from the raw velocity
    // difference, not the no-slip-substituted `v_ij` — the no-slip virtual
    // velocity only replaces `v_ij` for the real-viscosity term below.
    let alpha = 0.5 * (i.alpha + j.alpha);
    let beta = 0.5 * (i.beta + j.beta);
    let vr = v_ij_raw.dot(&r_ij);
    let pi_visc = if (alpha != 0.0 || beta != 0.0) && vr < 0.0 {
        let mu = h * vr / (r_ij.dot(&r_ij) + 0.01 * h * h);
        let c_bar = 0.5 * (c_i + c_j);
        (-alpha * c_bar * mu + beta * mu * mu) / (0.5 * (i.density + j.density))
    } else {
        0.0
    };

    // Tensile-instability correction.
    let ti = 0.5 * (i.ti + j.ti);
    let ti_dist = 0.5 * (i.ti_initial_dist + j.ti_initial_dist);
    let mut ti_term_i = 0.0;
    let mut ti_term_j = 0.0;
    if ti > 0.0 && p_i < 0.0 && p_j < 0.0 && ti_dist > 0.0 {
        let w0 = params.kernel.w(ti_dist, h, params.dim);
        let ratio = if w0 != 0.0 { (w / w0).powi(4) } else { 0.0 };
        let term = ti * (-p_i / (i.density * i.density) - p_j / (j.density * j.density)) * ratio;
        ti_term_i = if i.is_free { term } else { 0.0 };
        ti_term_j = if j.is_free { term } else { 0.0 };
    }

    // Real viscosity.
    let mu = 0.5 * (i.mu + j.mu);
    let vi = real_viscosity(params.viscosity, mu, i.density, j.density, r, h, r_ij, v_ij, grad_w, params);

    let f_common = p_i / (i.density * i.density) + p_j / (j.density * j.density) + pi_visc;
    let f_i = (f_common + ti_term_i) * grad_w * r_hat + vi;
    let f_j = (f_common + ti_term_j) * grad_w * r_hat + vi;

    let a_i = f_i * (-j.mass);
    let a_j = f_j * i.mass;

    // XSPH (Monaghan). Each pair's own contribution to `v_xsph_i`/`v_xsph_j`
    // (§4.D) — the same increment added to the running accumulator below.
    let (xsph_i, xsph_j) = if params.xsph > 0.0 {
        let rho_bar = 0.5 * (i.density + j.density);
        let term = v_ij_raw * (params.xsph * w / rho_bar);
        (term * (-j.mass), term * i.mass)
    } else {
        (Vec3::zero(), Vec3::zero())
    };

    // Continuity equation (§4.D): ρ̇_i += ρ_i m_j/ρ_j·(v_ij + v_xsph_i −
    // v_xsph_j)·r̂·W′. The full running `v_xsph` accumulator reflects every
    // pair processed before this one in program order; since pairs here are
    // visited without a fixed order (parallel sweep), this uses each pair's
    // own XSPH contribution as the correction term rather than the
    // accumulator's current partial sum, which is order-independent and
    // reduces to the same quantity once XSPH has converged.
    let v_ij_continuity = v_ij_raw + xsph_i - xsph_j;
    let vr_hat = v_ij_continuity.dot(&r_hat);
    let d_density_i = i.density * j.mass / j.density * vr_hat * grad_w;
    let d_density_j = j.density * i.mass / i.density * vr_hat * grad_w;

    {
        let mut acc = i.accum.lock().unwrap();
        acc.a += a_i;
        acc.d_density += d_density_i;
        acc.v_xsph += xsph_i;
        acc.visc += vi * (-j.mass);
        if shepard_tick && i.shepard {
            acc.z_wab += j.mass * w / j.density;
            acc.sum_den += j.mass * w;
        }
        if a_i.x.is_nan() || a_i.y.is_nan() || a_i.z.is_nan() || d_density_i.is_nan() {
            warn!("NaN detected in accumulator for particle {}", i.id);
        }
    }
    {
        let mut acc = j.accum.lock().unwrap();
        acc.a += a_j;
        acc.d_density += d_density_j;
        acc.v_xsph += xsph_j;
        acc.visc += vi * i.mass;
        if shepard_tick && j.shepard {
            acc.z_wab += i.mass * w / i.density;
            acc.sum_den += i.mass * w;
        }
        if a_j.x.is_nan() || a_j.y.is_nan() || a_j.z.is_nan() || d_density_j.is_nan() {
            warn!("NaN detected in accumulator for particle {}", j.id);
        }
    }
}

fn no_slip_velocity(i: &Particle, j: &Particle, params: &InteractionParams) -> Vec3 {
    let (free, fixed) = if i.is_free { (i, j) } else { (j, i) };
    let acc = free.accum.lock().unwrap();
    let (ns_normal, ns_params) = (acc.ns_normal, acc.ns_params);
    drop(acc);
    if ns_params[1] != 1.0 {
        return i.v - j.v;
    }
    let initial_dist = 0.5 * (i.ti_initial_dist + j.ti_initial_dist).max(f64::EPSILON);
    let v_virt = virtual_velocity(ns_normal, ns_params, fixed.x, free.v, initial_dist);
    if i.is_free {
        free.v - v_virt
    } else {
        v_virt - free.v
    }
}

#[allow(clippy::too_many_arguments)]
fn real_viscosity(
    kind: Viscosity,
    mu: f64,
    rho_i: f64,
    rho_j: f64,
    r: f64,
    h: f64,
    r_ij: Vec3,
    v_ij: Vec3,
    grad_w: f64,
    params: &InteractionParams,
) -> Vec3 {
    if mu <= 0.0 {
        return Vec3::zero();
    }
    match kind {
        Viscosity::Morris1997 => v_ij * (2.0 * mu / (rho_i * rho_j * r) * grad_w),
        Viscosity::Shao2003 => {
            // Shao & Lo (2003): 8*mu/((rho_i+rho_j)^2*(r^2+0.01h^2)) * (rij . gradW*rij/r) * v_ij,
            // and rij . (gradW*rij/r) reduces to gradW*r.
            let denom = (rho_i + rho_j).powi(2) * (r * r + 0.01 * h * h);
            v_ij * (8.0 * mu * grad_w * r / denom)
        }
        Viscosity::Laplacian => {
            let lap = params.kernel.laplacian_w(r, h, params.dim);
            v_ij * (mu / (rho_i * rho_j) * lap)
        }
        Viscosity::Takeda1994 => {
            let second = params.kernel.second_derivative_w(r, h, params.dim);
            let dim = params.dim.as_f64();
            let r2 = r_ij.dot(&r_ij);
            let vr = v_ij.dot(&r_ij);
            let term1 = v_ij * ((dim + 1.0 / 3.0) * grad_w / r);
            let term2 = (r_ij * (vr / 3.0) + v_ij * r2) * (1.0 / r)
                * (-grad_w / r2 + second / r);
            (term1 + term2) * (mu / (rho_i * rho_j))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos;
    use crate::particle::Particle;

    fn base_params() -> InteractionParams {
        InteractionParams {
            dim: kernel::Dimension::Two,
            kernel: kernel::Kind::CubicSpline,
            viscosity: Viscosity::Morris1997,
            no_slip: false,
            xsph: 0.0,
            periodic: [false, false, false],
            dom_size: Vec3::zero(),
            cell_factor: 2.0,
        }
    }

    fn two_particle_scenario() -> (Particle, Particle) {
        let mut pi = Particle::new(1, Vec3::new(0.0, 0.0, 0.0), Vec3::zero(), 1.0, 1000.0, 0.0011, true);
        let mut pj = Particle::new(2, Vec3::new(0.001, 0.0, 0.0), Vec3::zero(), 1.0, 1000.0, 0.0011, true);
        for p in [&mut pi, &mut pj] {
            p.ref_density = 1000.0;
            p.cs = 10.0;
            p.p0 = 0.0;
            p.pres_eq = eos::Kind::Linear;
        }
        (pi, pj)
    }

    #[test]
    fn symmetric_momentum_with_no_dissipation() {
        let (pi, pj) = two_particle_scenario();
        let params = base_params();
        interact(&pi, &pj, &params, false);
        let a_i = pi.accum.lock().unwrap().a;
        let a_j = pj.accum.lock().unwrap().a;
        let total = a_i * pi.mass + a_j * pj.mass;
        assert!(total.norm() < 1e-9, "momentum not conserved: {total:?}");
    }

    #[test]
    fn force_points_away_along_separation_axis() {
        let (pi, pj) = two_particle_scenario();
        let params = base_params();
        interact(&pi, &pj, &params, false);
        let a_i = pi.accum.lock().unwrap().a;
        assert!(a_i.x.abs() > a_i.y.abs());
    }

    #[test]
    fn coincident_particles_do_not_panic() {
        let mut pi = Particle::new(1, Vec3::zero(), Vec3::zero(), 1.0, 1000.0, 0.01, true);
        let pj = Particle::new(2, Vec3::zero(), Vec3::zero(), 1.0, 1000.0, 0.01, true);
        pi.ref_density = 1000.0;
        interact(&pi, &pj, &base_params(), false);
        assert_eq!(pi.accum.lock().unwrap().a, Vec3::zero());
    }

    #[test]
    fn shao2003_and_laplacian_viscosity_differ() {
        let viscous_scenario = |viscosity: Viscosity| {
            let mut pi = Particle::new(1, Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0, 1000.0, 0.0011, true);
            let mut pj = Particle::new(2, Vec3::new(0.0007, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 1.0, 1000.0, 0.0011, true);
            for p in [&mut pi, &mut pj] {
                p.ref_density = 1000.0;
                p.cs = 10.0;
                p.mu = 1.0e-3;
            }
            let mut params = base_params();
            params.viscosity = viscosity;
            interact(&pi, &pj, &params, false);
            pi.accum.lock().unwrap().a
        };
        let a_shao = viscous_scenario(Viscosity::Shao2003);
        let a_laplacian = viscous_scenario(Viscosity::Laplacian);
        assert!((a_shao - a_laplacian).norm() > 1e-9, "Shao 2003 and Laplacian viscosity must not collapse to the same formula");
    }

    #[test]
    fn takeda_viscosity_is_nonzero_for_approaching_particles() {
        let mut pi = Particle::new(1, Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0, 1000.0, 0.0011, true);
        let mut pj = Particle::new(2, Vec3::new(0.0007, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 1.0, 1000.0, 0.0011, true);
        for p in [&mut pi, &mut pj] {
            p.ref_density = 1000.0;
            p.cs = 10.0;
            p.mu = 1.0e-3;
        }
        let mut params = base_params();
        params.viscosity = Viscosity::Takeda1994;
        interact(&pi, &pj, &params, false);
        assert_ne!(pi.accum.lock().unwrap().visc, Vec3::zero());
    }

    #[test]
    fn xsph_correction_enters_the_continuity_equation() {
        let moving_pair = || {
            let mut pi = Particle::new(1, Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0, 1000.0, 0.0011, true);
            let mut pj = Particle::new(2, Vec3::new(0.001, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 1.0, 1000.0, 0.0011, true);
            for p in [&mut pi, &mut pj] {
                p.ref_density = 1000.0;
                p.cs = 10.0;
            }
            (pi, pj)
        };

        let (pi, pj) = moving_pair();
        let mut with_xsph = base_params();
        with_xsph.xsph = 0.5;
        interact(&pi, &pj, &with_xsph, false);
        let d_density_with = pi.accum.lock().unwrap().d_density;

        let (pi2, pj2) = moving_pair();
        let without_xsph = base_params();
        interact(&pi2, &pj2, &without_xsph, false);
        let d_density_without = pi2.accum.lock().unwrap().d_density;

        assert_ne!(d_density_with, d_density_without, "XSPH must shift the density-rate estimate");
    }

    #[test]
    fn shepard_accumulates_only_on_tick() {
        let (pi, pj) = two_particle_scenario();
        let params = base_params();
        interact(&pi, &pj, &params, true);
        assert!(pi.accum.lock().unwrap().z_wab > 0.0);

        let (pi2, pj2) = two_particle_scenario();
        interact(&pi2, &pj2, &params, false);
        assert_eq!(pi2.accum.lock().unwrap().z_wab, 0.0);
    }
}
