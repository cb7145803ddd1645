//! North polar stereographic projection (EPSG method 9810, variant A).
//!
//! Backs the Alaska Polar Stereographic TCRS (EPSG:5936): WGS84, scale
//! factor 0.994 at the pole, central meridian 150°W, false easting and
//! northing of 2,000,000 m.

use mapml_common::BoundingBox;

use crate::ellipsoid::Ellipsoid;
use crate::transform::Projection;

/// Polar stereographic projection centred on the north pole.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in radians
    pub lon0: f64,
    /// Scale factor at the pole
    pub k0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Southern limit of the valid area in degrees
    pub min_latitude: f64,
    /// `2 a k0 / sqrt((1+e)^(1+e) (1-e)^(1-e))`
    c: f64,
}

impl PolarStereographic {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
        min_latitude: f64,
    ) -> Self {
        let e = ellipsoid.e();
        let c = 2.0 * ellipsoid.a * k0 / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
        Self {
            ellipsoid,
            lon0: lon0_deg.to_radians(),
            k0,
            false_easting,
            false_northing,
            min_latitude,
            c,
        }
    }

    /// EPSG:5936, WGS 84 / EPSG Alaska Polar Stereographic.
    pub fn alaska() -> Self {
        Self::new(Ellipsoid::WGS84, -150.0, 0.994, 2_000_000.0, 2_000_000.0, 0.0)
    }
}

impl Projection for PolarStereographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let rho = self.c * self.ellipsoid.t(lat.to_radians());
        if !rho.is_finite() {
            return None;
        }
        let dlon = lon.to_radians() - self.lon0;
        let x = self.false_easting + rho * dlon.sin();
        let y = self.false_northing - rho * dlon.cos();
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;
        let rho = (dx * dx + dy * dy).sqrt();

        let phi = self.ellipsoid.phi_from_t(rho / self.c);
        let lon = if rho == 0.0 {
            self.lon0
        } else {
            self.lon0 + dx.atan2(-dy)
        };

        let lon = normalize_longitude(lon.to_degrees());
        Some((lon, phi.to_degrees()))
    }

    fn valid_area(&self) -> BoundingBox {
        BoundingBox::new(-180.0, self.min_latitude, 180.0, 90.0)
    }

    fn pole(&self) -> Option<(f64, f64)> {
        Some((self.false_easting, self.false_northing))
    }
}

/// Wrap a longitude into [-180, 180].
pub(crate) fn normalize_longitude(mut lon: f64) -> f64 {
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}
