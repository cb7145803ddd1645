//! Reference ellipsoids and the conformal-latitude helpers shared by the
//! conic and azimuthal projections.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

/// Maximum iterations when recovering latitude from the isometric `t` value.
const MAX_ITERATIONS: usize = 15;
const CONVERGENCE: f64 = 1e-12;

/// A reference ellipsoid defined by semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257223563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6378137.0,
        f: 1.0 / 298.257222101,
    };

    /// Squared first eccentricity.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// First eccentricity.
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// `m = cos(phi) / sqrt(1 - e^2 sin^2(phi))`
    pub fn m(&self, phi: f64) -> f64 {
        let s = phi.sin();
        phi.cos() / (1.0 - self.e2() * s * s).sqrt()
    }

    /// Isometric `t = tan(pi/4 - phi/2) / ((1 - e sin phi) / (1 + e sin phi))^(e/2)`.
    pub fn t(&self, phi: f64) -> f64 {
        let e = self.e();
        let es = e * phi.sin();
        (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
    }

    /// Invert [`Ellipsoid::t`] by fixed-point iteration.
    pub fn phi_from_t(&self, t: f64) -> f64 {
        let e = self.e();
        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..MAX_ITERATIONS {
            let es = e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).atan();
            if (next - phi).abs() < CONVERGENCE {
                return next;
            }
            phi = next;
        }
        phi
    }
}
