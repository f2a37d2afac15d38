//! Per-particle state (§3).
//!
//! A `Particle` carries everything the core reads or writes: kinematics,
//! thermodynamics, smoothing length, the numerical-policy knobs a scenario
//! driver may vary per material, and the scratch fields the pair interaction
//! (`interact`) and no-slip construction (§4.H) fill in each step.

use std::sync::Mutex;

use crate::eos;
use crate::vector::Vec3;

/// Coarse material tag. The core never runs a constitutive model itself
/// (elasto-plastic/soil internals are an external collaborator per §1); this
/// only distinguishes how a particle participates in the sweep and boundary
/// treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Material {
    Fluid,
    Boundary,
    Soil,
}

/// Sentinel distance used to seed `ns_params[2]` each step — "no wall found
/// yet" (§3 "No-slip scratch").
pub const NO_SLIP_UNRESOLVED_DISTANCE: f64 = 1.0e6;

/// The per-step accumulators (§3 "Auxiliary accumulators", "No-slip
/// scratch") plus the acceleration/density-rate accumulators, all guarded by
/// one lock. The source protects these with a per-particle OS lock; a single
/// `Mutex` here plays the same role since `interact` always writes all of
/// them together for a given side of a pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accumulators {
    pub a: Vec3,
    pub d_density: f64,
    pub v_xsph: Vec3,
    pub z_wab: f64,
    pub sum_den: f64,
    pub visc: Vec3,
    pub ns_normal: Vec3,
    /// `[plane_offset, resolved_flag, nearest_distance]`.
    pub ns_params: [f64; 3],
}

impl Accumulators {
    fn reset(&mut self, gravity: Vec3) {
        self.a = gravity;
        self.d_density = 0.0;
        self.v_xsph = Vec3::zero();
        self.z_wab = 0.0;
        self.sum_den = 0.0;
        self.visc = Vec3::zero();
        self.ns_normal = Vec3::zero();
        self.ns_params = [0.0, 0.0, NO_SLIP_UNRESOLVED_DISTANCE];
    }

    pub fn is_resolved(&self) -> bool {
        self.ns_params[1] == 1.0
    }
}

/// One Lagrangian point-mass particle (§3).
#[derive(Debug)]
pub struct Particle {
    // Identity & kinematics
    pub id: i32,
    pub is_free: bool,
    pub x: Vec3,
    pub v: Vec3,
    pub v_half: Vec3,

    // Mass/thermodynamics
    pub mass: f64,
    pub density: f64,
    pub density_half: f64,
    pub ref_density: f64,
    pub pressure: f64,

    // Smoothing
    pub h: f64,
    pub h_ref: f64,

    // Numerical policy
    pub cs: f64,
    pub p0: f64,
    pub pres_eq: eos::Kind,
    pub alpha: f64,
    pub beta: f64,
    pub ti: f64,
    pub ti_initial_dist: f64,
    pub mu: f64,
    pub mu_ref: f64,
    pub material: Material,
    pub shepard: bool,

    // Spatial index state
    pub cell: [usize; 3],
    pub link_next: Option<usize>,

    // First-step flag for the leap-frog integrator (no prior half-step to
    // advance from on a particle's very first `move_leapfrog` call).
    pub primed: bool,

    pub accum: Mutex<Accumulators>,
}

impl Particle {
    /// Constructs a new particle (§4.C), with every numerical-policy field
    /// defaulted — a scenario driver stamps those from `DomainConfig` after
    /// construction (see `Domain::add_*`).
    pub fn new(id: i32, x: Vec3, v: Vec3, mass: f64, density: f64, h: f64, is_free: bool) -> Self {
        assert!(mass > 0.0, "particle mass must be positive");
        assert!(density > 0.0, "particle density must be positive");
        assert!(h > 0.0, "particle smoothing length must be positive");
        Particle {
            id,
            is_free,
            x,
            v,
            v_half: v,
            mass,
            density,
            density_half: density,
            ref_density: density,
            pressure: 0.0,
            h,
            h_ref: h,
            cs: 0.0,
            p0: 0.0,
            pres_eq: eos::Kind::Linear,
            alpha: 0.0,
            beta: 0.0,
            ti: 0.0,
            ti_initial_dist: 0.0,
            mu: 0.0,
            mu_ref: 0.0,
            material: Material::Fluid,
            shepard: true,
            cell: [0, 0, 0],
            link_next: None,
            primed: false,
            accum: Mutex::new(Accumulators::default()),
        }
    }

    /// Resets this step's accumulators, seeding `a` with gravity (§4.G step 1).
    pub fn reset_accumulators(&self, gravity: Vec3) {
        self.accum.lock().unwrap().reset(gravity);
    }

    /// Leap-frog integration step (§4.G step 8, §3 "Lifecycle").
    ///
    /// Non-free particles are skipped entirely — their motion is externally
    /// prescribed. Position is wrapped on every periodic axis.
    pub fn move_leapfrog(&mut self, dt: f64, dom_size: Vec3, trpr: Vec3, blpf: Vec3) {
        if !self.is_free {
            return;
        }

        let (a, d_density) = {
            let acc = self.accum.lock().unwrap();
            (acc.a, acc.d_density)
        };

        if !self.primed {
            // First step: there is no prior half-step value to advance from,
            // so seed it with a half Euler step (standard SPH leap-frog start-up).
            self.v_half = self.v + a * (dt * 0.5);
            self.density_half = self.density + d_density * (dt * 0.5);
            self.primed = true;
        } else {
            self.v_half += a * dt;
            self.density_half += d_density * dt;
        }

        self.x += self.v_half * dt;
        self.v = self.v_half + a * (dt * 0.5);
        self.density = self.density_half + d_density * (dt * 0.5);

        for axis in 0..3 {
            if dom_size[axis] > 0.0 {
                if self.x[axis] < blpf[axis] {
                    self.x[axis] += dom_size[axis];
                } else if self.x[axis] >= trpr[axis] {
                    self.x[axis] -= dom_size[axis];
                }
            }
        }
    }

    /// Shepard density renormalization (§4.G step 8, §9 "Shepard cadence").
    /// Called by the driver on the configured cadence, not every step.
    pub fn renormalize_shepard_density(&mut self) {
        let (z_wab, sum_den) = {
            let acc = self.accum.lock().unwrap();
            (acc.z_wab, acc.sum_den)
        };
        if self.shepard && z_wab > 0.0 {
            self.density = sum_den / z_wab;
        }
    }

    pub fn pressure_and_sound_speed(&self) -> (f64, f64) {
        let p = self
            .pres_eq
            .pressure(self.density, self.ref_density, self.cs, self.p0);
        let c = self
            .pres_eq
            .sound_speed(self.density, self.ref_density, self.cs);
        (p, c)
    }
}
