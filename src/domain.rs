//! The `Domain` driver (§4.G, §6): owns the particle collection, the fixed
//! spatial grid, and `solve()`, the per-step orchestration loop.

use log::warn;
use rand::Rng;

use crate::boundary::{resolve_no_slip_normals, InflowOutflow};
use crate::config::{BoxSpec, DomainConfig};
use crate::eos;
use crate::grid::Grid;
use crate::interaction::{InteractionParams, Viscosity};
use crate::io::{output, restart};
use crate::kernel;
use crate::particle::{Material, Particle};
use crate::vector::Vec3;

/// Hook invoked before (`before`) and after (`after`) the neighbor sweep
/// each step (§6 `general_before`/`general_after`). Modeled as an interface
/// with optional methods rather than the source's function pointers (§9).
pub trait GeneralHook: Send {
    fn before(&mut self, _domain: &mut Domain) {}
    fn after(&mut self, _domain: &mut Domain) {}
}

pub struct Domain {
    pub particles: Vec<Particle>,
    grid: Option<Grid>,
    config: DomainConfig,
    dim: kernel::Dimension,
    kernel: kernel::Kind,
    default_eos: eos::Kind,
    viscosity: Viscosity,
    pub t: f64,
    pub step: u64,
    pairs_with_fixed: Vec<(usize, usize)>,
    pub rb_force: Vec3,
    pub rb_force_vis: Vec3,
    hook: Option<Box<dyn GeneralHook>>,
    inflow_outflow: Option<Box<dyn InflowOutflow + Send>>,
    pool: rayon::ThreadPool,
}

impl Domain {
    pub fn new(config: DomainConfig) -> Self {
        let dim = config.dimension();
        let kernel = config.kernel();
        let default_eos = config.eos();
        let viscosity = config.viscosity();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.n_proc.max(1))
            .build()
            .expect("failed to build the domain's worker thread pool");
        Domain {
            particles: Vec::new(),
            grid: None,
            config,
            dim,
            kernel,
            default_eos,
            viscosity,
            t: 0.0,
            step: 0,
            pairs_with_fixed: Vec::new(),
            rb_force: Vec3::zero(),
            rb_force_vis: Vec3::zero(),
            hook: None,
            inflow_outflow: None,
            pool,
        }
    }

    pub fn set_general_hook(&mut self, hook: Box<dyn GeneralHook>) {
        self.hook = Some(hook);
    }

    pub fn set_inflow_outflow(&mut self, io: Box<dyn InflowOutflow + Send>) {
        self.inflow_outflow = Some(io);
    }

    fn stamp_policy_defaults(&self, p: &mut Particle) {
        p.cs = self.config.cs;
        p.p0 = self.config.p0;
        p.pres_eq = self.default_eos;
        p.alpha = self.config.alpha;
        p.beta = self.config.beta;
        p.ti = self.config.ti;
        p.ti_initial_dist = self.config.ti_initial_dist;
        p.mu = self.config.mu;
        p.mu_ref = self.config.mu_ref;
        p.shepard = self.config.shepard;
    }

    /// Adds a single particle (§4.C), stamping the domain's numerical-policy
    /// defaults onto it. `tag` is the particle's group id (§3 "id" — all
    /// particles added as part of one logical group, e.g. one `add_box_*`
    /// call, share a tag so `del_particles`/rigid-body aggregation select
    /// the whole group).
    pub fn add_single_particle(
        &mut self,
        x: Vec3,
        v: Vec3,
        mass: f64,
        density: f64,
        is_free: bool,
        material: Material,
        tag: i32,
    ) -> i32 {
        let mut p = Particle::new(tag, x, v, mass, density, self.config.h, is_free);
        p.ref_density = self.config.ref_density;
        p.material = material;
        self.stamp_policy_defaults(&mut p);
        self.particles.push(p);
        tag
    }

    /// Fills `spec`'s box with a regular lattice of particles at `spacing`
    /// (§6 `add_box_length`).
    pub fn add_box_length(&mut self, spec: &BoxSpec) {
        let spacing = spec.spacing;
        assert!(spacing > 0.0, "box lattice spacing must be positive");
        let mass = spec.density * spacing.powi(self.dim.as_f64() as i32);

        let nx = (((spec.max[0] - spec.min[0]) / spacing).round() as usize).max(1);
        let ny = (((spec.max[1] - spec.min[1]) / spacing).round() as usize).max(1);
        let nz = if self.dim == kernel::Dimension::Three {
            (((spec.max[2] - spec.min[2]) / spacing).round() as usize).max(1)
        } else {
            1
        };

        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let x = Vec3::new(
                        spec.min[0] + i as f64 * spacing,
                        spec.min[1] + j as f64 * spacing,
                        if self.dim == kernel::Dimension::Three {
                            spec.min[2] + k as f64 * spacing
                        } else {
                            0.0
                        },
                    );
                    self.add_single_particle(
                        x,
                        Vec3::zero(),
                        mass,
                        spec.density,
                        spec.is_free,
                        Material::Fluid,
                        spec.tag,
                    );
                }
            }
        }
    }

    /// Scatters `count` particles uniformly at random within `spec`'s box
    /// (§6 `add_random_box`).
    pub fn add_random_box(&mut self, spec: &BoxSpec, count: usize) {
        let mut rng = rand::rng();
        let volume: f64 = (0..3)
            .take(self.dim.as_f64() as usize)
            .map(|k| spec.max[k] - spec.min[k])
            .product();
        let mass = spec.density * volume / count.max(1) as f64;
        for _ in 0..count {
            let x = Vec3::new(
                rng.random_range(spec.min[0]..spec.max[0]),
                rng.random_range(spec.min[1]..spec.max[1]),
                if self.dim == kernel::Dimension::Three {
                    rng.random_range(spec.min[2]..spec.max[2])
                } else {
                    0.0
                },
            );
            self.add_single_particle(
                x,
                Vec3::zero(),
                mass,
                spec.density,
                spec.is_free,
                Material::Fluid,
                spec.tag,
            );
        }
    }

    /// Removes every particle tagged `tag` (§6 `del_particles`). Fatal if
    /// none match (§7 "Input fatal").
    pub fn del_particles(&mut self, tag: i32) {
        let before = self.particles.len();
        self.particles.retain(|p| p.id != tag);
        let removed = before - self.particles.len();
        if removed == 0 {
            panic!("del_particles: no particle tagged {tag}");
        }
        self.grid = None;
    }

    fn interaction_params(&self, dom_size: Vec3) -> InteractionParams {
        InteractionParams {
            dim: self.dim,
            kernel: self.kernel,
            viscosity: self.viscosity,
            no_slip: self.config.no_slip,
            xsph: self.config.xsph,
            periodic: self.config.periodic,
            dom_size,
            cell_factor: self.kernel.cell_factor(),
        }
    }

    fn ensure_grid(&mut self) {
        if self.grid.is_some() {
            return;
        }
        let h_max = self
            .particles
            .iter()
            .map(|p| p.h)
            .fold(f64::MIN, f64::max);
        let positions: Vec<Vec3> = self.particles.iter().map(|p| p.x).collect();
        self.grid = Some(Grid::new(
            positions.into_iter(),
            h_max,
            self.kernel.cell_factor(),
            self.config.initial_dist,
            self.dim,
            self.config.periodic,
        ));
    }

    /// Checks the sound-speed and viscous CFL bounds once, before the step
    /// loop begins (§4.G step 11): τ_sound = 0.25·h/(c+u) and
    /// τ_viscous = 0.125·h²·ρ/μ, each taken as the minimum over particles.
    /// Unlike the per-step acceleration-based monitor, these never change
    /// once set, so checking them every step would be redundant.
    fn check_init_cfl_bounds(&self, dt: f64) {
        let mut tau_sound = f64::INFINITY;
        let mut tau_viscous = f64::INFINITY;
        for p in &self.particles {
            let (_, c) = p.pressure_and_sound_speed();
            let u = p.v.norm();
            if c + u > 1e-12 {
                tau_sound = tau_sound.min(0.25 * p.h / (c + u));
            }
            if p.mu > 0.0 {
                tau_viscous = tau_viscous.min(0.125 * p.h * p.h * p.density / p.mu);
            }
        }
        if tau_sound.is_finite() && dt > tau_sound {
            warn!("dt {dt} exceeds the sound-speed CFL bound {tau_sound} at init");
        }
        if tau_viscous.is_finite() && dt > tau_viscous {
            warn!("dt {dt} exceeds the viscous CFL bound {tau_viscous} at init");
        }
    }

    /// Runs the simulation from the current state to `t_final` (§4.G),
    /// writing XDMF+HDF5 snapshots every `dt_out` and restart snapshots
    /// every `auto_save_interval`.
    pub fn solve(
        &mut self,
        t_final: f64,
        dt: f64,
        dt_out: f64,
        file_key: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        assert!(!self.particles.is_empty(), "cannot solve with zero particles");
        assert!(dt > 0.0, "dt must be positive");
        self.ensure_grid();

        let gravity = Vec3::new(
            self.config.gravity[0],
            self.config.gravity[1],
            self.config.gravity[2],
        );

        self.grid.as_mut().unwrap().rebuild(&mut self.particles);

        self.check_init_cfl_bounds(dt);

        let mut next_out = self.t + dt_out;
        let mut next_save = self.t + self.config.auto_save_interval;

        while self.t < t_final {
            // 1. Accumulator reset.
            for p in self.particles.iter() {
                p.reset_accumulators(gravity);
            }

            // 2. Pre-hook.
            if let Some(mut hook) = self.hook.take() {
                hook.before(self);
                self.hook = Some(hook);
            }

            // 3. Optional constant-velocity zone.
            if self.config.periodic[0] && self.config.const_vel_periodic != 0.0 {
                if let Some(grid) = &self.grid {
                    let cv = self.config.const_vel_periodic;
                    let lo = grid.real_range(0).start;
                    for p in self.particles.iter_mut() {
                        if p.is_free && p.cell[0] <= lo + 1 {
                            p.v = Vec3::new(cv, p.v.y, p.v.z);
                        }
                    }
                }
            }

            // 4. No-slip pre-pass from the previous step's fixed pairs.
            if self.config.no_slip {
                resolve_no_slip_normals(&self.particles, &self.pairs_with_fixed);
            }

            // 5. Clear pairs_with_fixed.
            self.pairs_with_fixed.clear();

            // 6. Sweep.
            let grid = self.grid.as_ref().unwrap();
            let dom_size = Vec3::new(
                grid.trpr.x - grid.blpf.x,
                grid.trpr.y - grid.blpf.y,
                grid.trpr.z - grid.blpf.z,
            );
            let params = self.interaction_params(dom_size);
            let shepard_tick =
                self.config.shepard && self.config.shepard_stride > 0 && self.step % self.config.shepard_stride == 0;
            let particles_ref = &self.particles;
            let new_fixed_pairs = self
                .pool
                .install(|| crate::sweep::run(particles_ref, grid, &params, shepard_tick));
            self.pairs_with_fixed = new_fixed_pairs;

            // 7. Post-hook.
            if let Some(mut hook) = self.hook.take() {
                hook.after(self);
                self.hook = Some(hook);
            }

            // 8. Integrate.
            let trpr = self.grid.as_ref().unwrap().trpr;
            let blpf = self.grid.as_ref().unwrap().blpf;
            use rayon::prelude::*;
            self.particles.par_iter_mut().for_each(|p| {
                p.move_leapfrog(dt, dom_size, trpr, blpf);
            });
            if shepard_tick {
                for p in self.particles.iter_mut() {
                    p.renormalize_shepard_density();
                }
            }

            // 8b. Inflow/outflow boundary conditions (§4.H): particles
            // tagged as an entry, exit, or combined band get their velocity
            // and density re-prescribed by the scenario's callbacks.
            if let Some(io) = self.inflow_outflow.as_ref() {
                for p in self.particles.iter_mut() {
                    if self.config.inflow && p.id == self.config.inflow_tag {
                        let (v, density) = io.in_con(p.x, p.v, p.density);
                        p.v = v;
                        p.density = density;
                    } else if self.config.outflow && p.id == self.config.outflow_tag {
                        let (v, density) = io.out_con(p.x, p.v, p.density);
                        p.v = v;
                        p.density = density;
                    } else if self.config.all_flow && p.id == self.config.all_flow_tag {
                        let (v, density) = io.all_con(p.x, p.v, p.density);
                        p.v = v;
                        p.density = density;
                    }
                }
            }

            // 9. Rigid-body aggregate.
            if self.config.rigid_body {
                let mut force = Vec3::zero();
                let mut force_vis = Vec3::zero();
                for p in self.particles.iter() {
                    if p.id == self.config.rigid_body_tag {
                        let acc = p.accum.lock().unwrap();
                        force += acc.a * p.mass;
                        force_vis += acc.visc * p.mass;
                    }
                }
                self.rb_force = force;
                self.rb_force_vis = force_vis;
            }

            // Rebuild the cell index from the post-integration positions so
            // the next iteration's pre-pass/sweep see current chains.
            let leaving = self.grid.as_mut().unwrap().rebuild(&mut self.particles);

            // 10. Leave-check (only when no axis is periodic).
            if !self.config.periodic.iter().any(|&p| p) && !leaving.is_empty() {
                let mut indices = leaving.clone();
                indices.sort_unstable();
                indices.dedup();
                for &idx in indices.iter().rev() {
                    self.particles.remove(idx);
                }
                self.grid.as_mut().unwrap().rebuild(&mut self.particles);
            }

            // 11. CFL monitor.
            let mut tau = f64::INFINITY;
            for p in self.particles.iter() {
                let a_norm = p.accum.lock().unwrap().a.norm();
                if a_norm > 1e-12 {
                    tau = tau.min(0.25 * (p.h / a_norm).sqrt());
                }
            }
            if tau.is_finite() && dt > tau {
                warn!(
                    "step {}: dt {dt} exceeds CFL acceleration bound {tau}",
                    self.step
                );
            }

            // 12. Output.
            if self.t + dt >= next_out {
                output::write_snapshot(&self.particles, file_key, self.step, self.rb_force, self.rb_force_vis)?;
                next_out += dt_out;
            }
            if self.config.auto_save_interval > 0.0 && self.t + dt >= next_save {
                restart::save(&self.particles, file_key)?;
                next_save += self.config.auto_save_interval;
            }

            // 13. Advance time.
            self.t += dt;
            self.step += 1;
        }

        Ok(())
    }

    /// Loads particle state from a restart snapshot (§6 `load`), leaving
    /// the domain ready for `solve` to continue the run.
    pub fn load(config: DomainConfig, key: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut domain = Domain::new(config);
        domain.particles = restart::load(key)?;
        Ok(domain)
    }
}
