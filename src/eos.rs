//! Equation of state (§4.B): pressure and sound speed as a function of density.

use log::warn;

/// The three selectable equations of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Kind {
    /// P = P0 + c²(ρ − ρ0)
    Linear,
    /// Tait, γ = 7: P = P0 + (ρ0 c²/7)((ρ/ρ0)⁷ − 1)
    Tait,
    /// P = c² ρ
    Isothermal,
}

impl Kind {
    /// Resolves a raw integer selector, falling back to `Linear` with a
    /// one-time diagnostic when out of range (§4.B, §7 "Silent fallback").
    pub fn from_selector(selector: usize) -> Self {
        match selector {
            0 => Kind::Linear,
            1 => Kind::Tait,
            2 => Kind::Isothermal,
            other => {
                warn!("equation-of-state selector {other} is out of range, falling back to linear");
                Kind::Linear
            }
        }
    }

    /// Pressure for the given density, reference density, sound speed `cs`
    /// and background pressure `p0`.
    pub fn pressure(self, density: f64, ref_density: f64, cs: f64, p0: f64) -> f64 {
        match self {
            Kind::Linear => p0 + cs * cs * (density - ref_density),
            Kind::Tait => {
                p0 + (ref_density * cs * cs / 7.0) * ((density / ref_density).powi(7) - 1.0)
            }
            Kind::Isothermal => cs * cs * density,
        }
    }

    /// Local sound speed for the given density.
    pub fn sound_speed(self, density: f64, ref_density: f64, cs: f64) -> f64 {
        match self {
            Kind::Linear | Kind::Isothermal => cs,
            Kind::Tait => (cs * cs * (density / ref_density).powi(6)).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_matches_reference_density() {
        let p = Kind::Linear.pressure(1000.0, 1000.0, 10.0, 0.0);
        assert_eq!(p, 0.0);
        let p = Kind::Linear.pressure(1010.0, 1000.0, 10.0, 5.0);
        assert!((p - (5.0 + 100.0 * 10.0)).abs() < 1e-9);
    }

    #[test]
    fn tait_is_zero_at_reference_density() {
        let p = Kind::Tait.pressure(998.21, 998.21, 10.0, 0.0);
        assert!(p.abs() < 1e-9);
    }

    #[test]
    fn tait_sound_speed_scales_with_density_ratio() {
        let c0 = Kind::Tait.sound_speed(1000.0, 1000.0, 10.0);
        assert!((c0 - 10.0).abs() < 1e-9);
        let c1 = Kind::Tait.sound_speed(1010.0, 1000.0, 10.0);
        assert!(c1 > c0);
    }

    #[test]
    fn isothermal_pressure_is_proportional_to_density() {
        assert_eq!(Kind::Isothermal.pressure(2.0, 1.0, 3.0, 0.0), 18.0);
    }

    #[test]
    fn invalid_selector_falls_back_to_linear() {
        assert_eq!(Kind::from_selector(7), Kind::Linear);
    }
}
