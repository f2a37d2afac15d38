//! Smoothing kernel family (§4.A).
//!
//! Five compactly supported radial kernels, each normalized so that
//! `∫ W dV = 1` over its support, in both 2-D and 3-D. `Kind` is the tagged
//! variant the hot path dispatches on (no virtual calls) — see the spec's
//! §9 note on "polymorphic physics without virtual dispatch".

use std::f64::consts::PI;

use log::warn;

/// Spatial dimensionality a kernel is evaluated in. The engine only supports
/// 2-D and 3-D; anything else is a configuration-fatal error (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Dimension {
    Two = 2,
    Three = 3,
}

impl Dimension {
    pub fn as_f64(self) -> f64 {
        match self {
            Dimension::Two => 2.0,
            Dimension::Three => 3.0,
        }
    }
}

impl TryFrom<usize> for Dimension {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Dimension::Two),
            3 => Ok(Dimension::Three),
            other => Err(format!(
                "dimension must be 2 or 3 for kernel evaluation, got {other}"
            )),
        }
    }
}

/// The five selectable smoothing kernels (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Kind {
    /// Cubic spline, support q ∈ [0,2].
    CubicSpline,
    /// Quadratic, support [0,2].
    Quadratic,
    /// Quintic (Wendland-like), support [0,2].
    Quintic,
    /// Gaussian truncated at q=2.
    Gaussian,
    /// Quintic spline, support [0,3], piecewise.
    QuinticSpline,
}

impl Kind {
    /// Resolves a raw integer selector, falling back to `CubicSpline` with a
    /// one-time diagnostic when it's out of range (§4.A, §7 "Silent fallback").
    pub fn from_selector(selector: usize) -> Self {
        match selector {
            0 => Kind::CubicSpline,
            1 => Kind::Quadratic,
            2 => Kind::Quintic,
            3 => Kind::Gaussian,
            4 => Kind::QuinticSpline,
            other => {
                warn!("kernel selector {other} is out of range, falling back to cubic spline");
                Kind::CubicSpline
            }
        }
    }

    /// Support radius in units of `h` (the cutoff on `q = r/h`).
    pub fn support_radius(self) -> f64 {
        match self {
            Kind::QuinticSpline => 3.0,
            _ => 2.0,
        }
    }

    /// Cell factor used by the grid (§4.E): 3 for the quintic spline, 2 otherwise.
    pub fn cell_factor(self) -> f64 {
        match self {
            Kind::QuinticSpline => 3.0,
            _ => 2.0,
        }
    }

    /// `W(r, h)` — the kernel value, zero outside support.
    pub fn w(self, r: f64, h: f64, dim: Dimension) -> f64 {
        let q = r / h;
        let d2 = dim == Dimension::Two;
        match self {
            Kind::CubicSpline => {
                let c = if d2 { 10.0 / (7.0 * h * h * PI) } else { 1.0 / (h * h * h * PI) };
                if (0.0..1.0).contains(&q) {
                    c * (1.0 - 1.5 * q * q + 0.75 * q * q * q)
                } else if q <= 2.0 {
                    c * 0.25 * (2.0 - q).powi(3)
                } else {
                    0.0
                }
            }
            Kind::Quadratic => {
                let c = if d2 { 2.0 / (h * h * PI) } else { 5.0 / (4.0 * h * h * h * PI) };
                if q <= 2.0 {
                    c * (0.75 - 0.75 * q + (3.0 / 16.0) * q * q)
                } else {
                    0.0
                }
            }
            Kind::Quintic => {
                let c = if d2 { 7.0 / (4.0 * h * h * PI) } else { 7.0 / (8.0 * h * h * h * PI) };
                if q <= 2.0 {
                    c * (1.0 - q / 2.0).powi(4) * (2.0 * q + 1.0)
                } else {
                    0.0
                }
            }
            Kind::Gaussian => {
                let c = if d2 {
                    1.0 / (h * h * PI)
                } else {
                    1.0 / (h * h * h * PI.powf(1.5))
                };
                if q <= 2.0 { c * (-q * q).exp() } else { 0.0 }
            }
            Kind::QuinticSpline => {
                let c = if d2 {
                    7.0 / (478.0 * h * h * PI)
                } else {
                    1.0 / (120.0 * h * h * h * PI)
                };
                if (0.0..1.0).contains(&q) {
                    c * ((3.0 - q).powi(5) - 6.0 * (2.0 - q).powi(5) + 15.0 * (1.0 - q).powi(5))
                } else if q <= 2.0 {
                    c * ((3.0 - q).powi(5) - 6.0 * (2.0 - q).powi(5))
                } else if q <= 3.0 {
                    c * (3.0 - q).powi(5)
                } else {
                    0.0
                }
            }
        }
    }

    /// `dW/dr` — the radial derivative. The full gradient vector is this
    /// scalar times the unit separation vector (spec §4.D's `∇W`).
    pub fn grad_w(self, r: f64, h: f64, dim: Dimension) -> f64 {
        let q = r / h;
        let d2 = dim == Dimension::Two;
        match self {
            Kind::CubicSpline => {
                let c = if d2 {
                    10.0 / (7.0 * h * h * h * PI)
                } else {
                    1.0 / (h * h * h * h * PI)
                };
                if (0.0..1.0).contains(&q) {
                    c * (-3.0 * q + 2.25 * q * q)
                } else if q <= 2.0 {
                    c * (-0.75) * (2.0 - q) * (2.0 - q)
                } else {
                    0.0
                }
            }
            Kind::Quadratic => {
                let c = if d2 {
                    2.0 / (h * h * h * PI)
                } else {
                    5.0 / (4.0 * h * h * h * h * PI)
                };
                if q <= 2.0 {
                    c * (-0.75 + (3.0 / 8.0) * q)
                } else {
                    0.0
                }
            }
            Kind::Quintic => {
                let c = if d2 {
                    7.0 / (4.0 * h * h * h * PI)
                } else {
                    7.0 / (8.0 * h * h * h * h * PI)
                };
                if q <= 2.0 {
                    c * -5.0 * q * (1.0 - q / 2.0).powi(3)
                } else {
                    0.0
                }
            }
            Kind::Gaussian => {
                let c = if d2 {
                    1.0 / (h * h * h * PI)
                } else {
                    1.0 / (h * h * h * h * PI.powf(1.5))
                };
                if q <= 2.0 { -2.0 * q * c * (-q * q).exp() } else { 0.0 }
            }
            Kind::QuinticSpline => {
                let c = if d2 {
                    7.0 / (478.0 * h * h * h * PI)
                } else {
                    1.0 / (120.0 * h * h * h * h * PI)
                };
                if (0.0..1.0).contains(&q) {
                    c * (-5.0 * (3.0 - q).powi(4) + 30.0 * (2.0 - q).powi(4)
                        - 75.0 * (1.0 - q).powi(4))
                } else if q <= 2.0 {
                    c * (-5.0 * (3.0 - q).powi(4) + 30.0 * (2.0 - q).powi(4))
                } else if q <= 3.0 {
                    c * -5.0 * (3.0 - q).powi(4)
                } else {
                    0.0
                }
            }
        }
    }

    /// `W''(r)` — the second radial derivative (used by the Takeda viscosity
    /// formula), excluding the angular `(D-1)/q` term that `laplacian_w` adds.
    pub fn second_derivative_w(self, r: f64, h: f64, dim: Dimension) -> f64 {
        let q = r / h;
        let d2 = dim == Dimension::Two;
        match self {
            Kind::CubicSpline => {
                let c = if d2 {
                    10.0 / (7.0 * h * h * h * h * PI)
                } else {
                    1.0 / (h.powi(5) * PI)
                };
                if (0.0..1.0).contains(&q) {
                    c * (-3.0 + 4.5 * q)
                } else if q <= 2.0 {
                    c * 1.5 * (2.0 - q)
                } else {
                    0.0
                }
            }
            Kind::Quadratic => {
                let c = if d2 {
                    2.0 / (h * h * h * h * PI)
                } else {
                    5.0 / (4.0 * h.powi(5) * PI)
                };
                if q <= 2.0 { c * (-0.75) } else { 0.0 }
            }
            Kind::Quintic => {
                let c = if d2 {
                    7.0 / (4.0 * h * h * h * h * PI)
                } else {
                    7.0 / (8.0 * h.powi(5) * PI)
                };
                if q <= 2.0 {
                    -3.0 * c * (1.0 - q / 2.0).powi(2) * (1.0 + 3.0 * q - 3.0 * q * q)
                } else {
                    0.0
                }
            }
            Kind::Gaussian => {
                let c = if d2 {
                    1.0 / (h * h * h * h * PI)
                } else {
                    1.0 / (h.powi(5) * PI.powf(1.5))
                };
                if q <= 2.0 {
                    c * 2.0 * (2.0 * q * q - 1.0) * (-q * q).exp()
                } else {
                    0.0
                }
            }
            Kind::QuinticSpline => {
                let c = if d2 {
                    7.0 / (478.0 * h * h * h * h * PI)
                } else {
                    1.0 / (120.0 * h.powi(5) * PI)
                };
                if (0.0..1.0).contains(&q) {
                    c * (20.0 * (3.0 - q).powi(3) - 120.0 * (2.0 - q).powi(3)
                        + 300.0 * (1.0 - q).powi(3))
                } else if q <= 2.0 {
                    c * (20.0 * (3.0 - q).powi(3) - 120.0 * (2.0 - q).powi(3))
                } else if q <= 3.0 {
                    c * 20.0 * (3.0 - q).powi(3)
                } else {
                    0.0
                }
            }
        }
    }

    /// `∇²W(r)` — the isotropic Laplacian, `W''(r) + (D-1)/r · W'(r)`.
    pub fn laplacian_w(self, r: f64, h: f64, dim: Dimension) -> f64 {
        if r <= 0.0 {
            return 0.0;
        }
        let angular = (dim.as_f64() - 1.0) / r * self.grad_w(r, h, dim);
        self.second_derivative_w(r, h, dim) + angular
    }
}
