//! Lambert Conformal Conic projection (two standard parallels, ellipsoidal).
//!
//! This projection backs the Canada Base Map TCRS (EPSG:3978, NAD83 /
//! Canada Atlas Lambert). It maps a cone secant to the Earth's surface
//! onto a flat plane.
//!
//! The projection parameters include:
//! - Latitude of false origin (lat0)
//! - Longitude of false origin (lon0): the central meridian
//! - Standard parallels: latin1 and latin2
//! - False easting and northing in meters

use std::f64::consts::PI;

use mapml_common::BoundingBox;

use crate::ellipsoid::Ellipsoid;
use crate::polar::normalize_longitude;
use crate::transform::Projection;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of false origin in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Southern limit of the valid area in degrees
    pub min_latitude: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the false origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a secant-cone projection.
    ///
    /// # Arguments
    /// * `ellipsoid` - Reference ellipsoid
    /// * `lat0_deg` - Latitude of false origin (degrees)
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `latin1_deg` - First standard parallel (degrees)
    /// * `latin2_deg` - Second standard parallel (degrees)
    /// * `false_easting`, `false_northing` - Offsets (meters)
    /// * `min_latitude` - Southern limit of the valid area (degrees)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        false_easting: f64,
        false_northing: f64,
        min_latitude: f64,
    ) -> Self {
        let lat0 = lat0_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        let m1 = ellipsoid.m(latin1);
        let t1 = ellipsoid.t(latin1);

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            let m2 = ellipsoid.m(latin2);
            let t2 = ellipsoid.t(latin2);
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };

        let f = m1 / (n * t1.powf(n));
        let rho0 = ellipsoid.a * f * ellipsoid.t(lat0).powf(n);

        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            lat0,
            latin1,
            latin2,
            false_easting,
            false_northing,
            min_latitude,
            n,
            f,
            rho0,
        }
    }

    /// EPSG:3978, NAD83 / Canada Atlas Lambert.
    pub fn canada_atlas() -> Self {
        Self::new(
            Ellipsoid::GRS80,
            49.0,  // lat0
            -95.0, // lon0
            49.0,  // latin1
            77.0,  // latin2
            0.0,
            0.0,
            19.0,
        )
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }
}

impl Projection for LambertConformal {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        // Normalize longitude difference to [-π, π]
        let mut dlon = lon.to_radians() - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.ellipsoid.a * self.f * self.ellipsoid.t(lat.to_radians()).powf(self.n);
        if !rho.is_finite() {
            return None;
        }

        // Compute theta (angle from central meridian)
        let theta = self.n * dlon;

        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);

        // Compute rho and theta from x, y
        let rho = (dx * dx + dy * dy).sqrt();
        let (rho, theta) = if self.n < 0.0 {
            (-rho, (-dx).atan2(-dy))
        } else {
            (rho, dx.atan2(dy))
        };

        let t = (rho / (self.ellipsoid.a * self.f)).powf(1.0 / self.n);
        let lat = self.ellipsoid.phi_from_t(t).to_degrees();
        let lon = normalize_longitude((theta / self.n + self.lon0).to_degrees());

        if lat.is_finite() && lon.is_finite() {
            Some((lon, lat))
        } else {
            None
        }
    }

    fn valid_area(&self) -> BoundingBox {
        BoundingBox::new(-180.0, self.min_latitude, 180.0, 90.0)
    }

    fn pole(&self) -> Option<(f64, f64)> {
        Some((self.false_easting, self.false_northing + self.rho0))
    }
}
