//! Geographic longitude/latitude, the identity projection.

use mapml_common::BoundingBox;

use crate::transform::Projection;

/// Plate carrée identity: x is longitude, y is latitude, both in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl Projection for Geographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        Some((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some((x, y))
    }

    fn valid_area(&self) -> BoundingBox {
        BoundingBox::world_geographic()
    }
}
