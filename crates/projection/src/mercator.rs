//! Spherical Web Mercator (EPSG:3857).
//!
//! Uses the WGS84 semi-major axis as sphere radius, as every slippy-map
//! tile scheme does.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use mapml_common::BoundingBox;

use crate::transform::Projection;

/// Latitude at which the projected square world ends.
pub const MAX_LATITUDE: f64 = 85.0511287798066;

/// Web Mercator projection parameters.
#[derive(Debug, Clone, Copy)]
pub struct WebMercator {
    /// Sphere radius (meters)
    pub radius: f64,
}

impl WebMercator {
    pub fn new() -> Self {
        Self { radius: 6378137.0 }
    }

    /// Half the projected world width, `pi * R`.
    pub fn half_extent(&self) -> f64 {
        std::f64::consts::PI * self.radius
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection for WebMercator {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if lat.abs() >= 90.0 {
            return None;
        }
        let x = self.radius * lon.to_radians();
        let y = self.radius * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let lon = (x / self.radius).to_degrees();
        let lat = (2.0 * (y / self.radius).exp().atan() - FRAC_PI_2).to_degrees();
        Some((lon, lat))
    }

    fn valid_area(&self) -> BoundingBox {
        BoundingBox::new(-180.0, -MAX_LATITUDE, 180.0, MAX_LATITUDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ottawa_forward() {
        let proj = WebMercator::new();
        let (x, y) = proj.forward(-75.6972, 45.4215).unwrap();
        assert!((x - -8426573.758).abs() < 0.01, "x = {}", x);
        assert!((y - 5688123.920).abs() < 0.01, "y = {}", y);
    }

    #[test]
    fn test_max_latitude_is_square() {
        let proj = WebMercator::new();
        let (x, y) = proj.forward(180.0, MAX_LATITUDE).unwrap();
        assert!((x - proj.half_extent()).abs() < 1e-6);
        assert!((y - 20037508.342789244).abs() < 1e-3, "y = {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = WebMercator::new();
        let (x, y) = proj.forward(12.5, -33.25).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon - 12.5).abs() < 1e-9);
        assert!((lat - -33.25).abs() < 1e-9);
    }

    #[test]
    fn test_pole_is_undefined() {
        assert!(WebMercator::new().forward(0.0, 90.0).is_none());
    }
}
