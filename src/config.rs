//! Run configuration (§10): a plain, `serde`-derived struct loadable from
//! TOML or JSON, mirroring `Domain`'s configuration fields (§6).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eos;
use crate::interaction::Viscosity;
use crate::kernel;

/// A box of particles on a regular lattice, the initial condition a `run`
/// invocation builds before calling `solve` (§12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxSpec {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub spacing: f64,
    pub density: f64,
    pub is_free: bool,
    pub tag: i32,
}

/// Mirrors the `Domain` configuration fields of §6, plus the initial
/// condition and output cadence a scenario driver needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub dimension: usize,
    pub gravity: [f64; 3],
    pub kernel_selector: usize,
    pub eos_selector: usize,
    pub viscosity_selector: usize,
    pub periodic: [bool; 3],
    pub n_proc: usize,
    pub initial_dist: f64,
    pub h: f64,
    pub cs: f64,
    pub p0: f64,
    pub ref_density: f64,
    pub alpha: f64,
    pub beta: f64,
    pub mu: f64,
    pub mu_ref: f64,
    pub ti: f64,
    pub ti_initial_dist: f64,
    pub no_slip: bool,
    pub shepard: bool,
    pub shepard_stride: u64,
    pub xsph: f64,
    pub const_vel_periodic: f64,
    pub rigid_body: bool,
    pub rigid_body_tag: i32,
    pub inflow: bool,
    pub inflow_tag: i32,
    pub outflow: bool,
    pub outflow_tag: i32,
    pub all_flow: bool,
    pub all_flow_tag: i32,
    pub auto_save_interval: f64,
    pub boxes: Vec<BoxSpec>,
}

impl DomainConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        let config: DomainConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        let config: DomainConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the fields that must be correct before construction can
    /// begin (§7 "Configuration fatal"). Out-of-range kernel/EOS/viscosity
    /// selectors are deliberately NOT rejected here — they are normalized
    /// with a one-time diagnostic at `Domain` construction (§7 "Silent
    /// fallback"), matching `kernel::Kind::from_selector` / `eos::Kind::
    /// from_selector` / `Viscosity::from_selector`.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.dimension != 2 && self.dimension != 3 {
            return Err(format!("dimension must be 2 or 3, got {}", self.dimension).into());
        }
        if self.h <= 0.0 {
            return Err("h must be positive".into());
        }
        if self.ref_density <= 0.0 {
            return Err("ref_density must be positive".into());
        }
        Ok(())
    }

    pub fn dimension(&self) -> kernel::Dimension {
        kernel::Dimension::try_from(self.dimension).expect("validated at load time")
    }

    pub fn kernel(&self) -> kernel::Kind {
        kernel::Kind::from_selector(self.kernel_selector)
    }

    pub fn eos(&self) -> eos::Kind {
        eos::Kind::from_selector(self.eos_selector)
    }

    pub fn viscosity(&self) -> Viscosity {
        Viscosity::from_selector(self.viscosity_selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DomainConfig {
        DomainConfig {
            dimension: 2,
            gravity: [0.0, -9.81, 0.0],
            kernel_selector: 0,
            eos_selector: 1,
            viscosity_selector: 0,
            periodic: [true, false, false],
            n_proc: 4,
            initial_dist: 0.001,
            h: 0.0011,
            cs: 10.0,
            p0: 0.0,
            ref_density: 1000.0,
            alpha: 1.0,
            beta: 0.0,
            mu: 0.0,
            mu_ref: 0.0,
            ti: 0.0,
            ti_initial_dist: 0.001,
            no_slip: false,
            shepard: true,
            shepard_stride: 30,
            xsph: 0.5,
            const_vel_periodic: 0.0,
            rigid_body: false,
            rigid_body_tag: 0,
            inflow: false,
            inflow_tag: 0,
            outflow: false,
            outflow_tag: 0,
            all_flow: false,
            all_flow_tag: 0,
            auto_save_interval: 1.0,
            boxes: vec![],
        }
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = sample();
        let text = toml::to_string(&cfg).unwrap();
        let back: DomainConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.dimension, cfg.dimension);
        assert_eq!(back.kernel_selector, cfg.kernel_selector);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = sample();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: DomainConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.shepard_stride, cfg.shepard_stride);
    }

    #[test]
    fn rejects_invalid_dimension() {
        let mut cfg = sample();
        cfg.dimension = 5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn accepts_out_of_range_selectors_for_later_fallback() {
        let mut cfg = sample();
        cfg.kernel_selector = 99;
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.kernel(), kernel::Kind::CubicSpline);
    }
}
