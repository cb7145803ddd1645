//! Point and bounding-box transforms between the supported CRSs.
//!
//! Bounds are reprojected by sampling a regular grid over the source box,
//! inverse-projecting every sample to geographic coordinates, clipping to
//! the valid area of the target projection and forward-projecting points
//! along the edges of the clipped box. All bounds are in x/y
//! (easting/northing, lon/lat) order.

use mapml_common::{BoundingBox, CrsCode};
use thiserror::Error;

use crate::geographic::Geographic;
use crate::lambert::LambertConformal;
use crate::mercator::WebMercator;
use crate::polar::PolarStereographic;

/// Samples per axis used by [`SampledReprojector::default`].
pub const DEFAULT_SAMPLES: usize = 32;

/// Points per edge when forward-projecting the clipped geographic box.
pub const EDGE_SAMPLES: usize = 9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error(
        "Cannot transform bounds from {from} to {to}: no overlap with the target's valid area"
    )]
    UnsupportedTransform { from: CrsCode, to: CrsCode },

    #[error("Point ({x}, {y}) cannot be transformed from {from} to {to}")]
    PointOutOfDomain {
        x: f64,
        y: f64,
        from: CrsCode,
        to: CrsCode,
    },
}

/// A map projection between geographic degrees and projected units.
pub trait Projection: Send + Sync {
    /// Project a longitude/latitude pair. `None` when the point has no
    /// finite image.
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Unproject to longitude/latitude.
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// Geographic area in which the projection is usable.
    fn valid_area(&self) -> BoundingBox;

    /// Projected position of the north pole, when it is a finite point.
    fn pole(&self) -> Option<(f64, f64)> {
        None
    }
}

/// The projection implementing `crs`.
pub fn projection_for(crs: CrsCode) -> Box<dyn Projection> {
    match crs {
        CrsCode::Crs84 | CrsCode::Epsg4326 => Box::new(Geographic),
        CrsCode::Epsg3857 => Box::new(WebMercator::new()),
        CrsCode::Epsg5936 => Box::new(PolarStereographic::alaska()),
        CrsCode::Epsg3978 => Box::new(LambertConformal::canada_atlas()),
    }
}

/// Transform a single x/y point.
pub fn transform_point(
    x: f64,
    y: f64,
    from: CrsCode,
    to: CrsCode,
) -> Result<(f64, f64), ProjectionError> {
    if from.same_datum_space(&to) {
        return Ok((x, y));
    }
    projection_for(from)
        .inverse(x, y)
        .and_then(|(lon, lat)| projection_for(to).forward(lon, lat))
        .filter(|(px, py)| px.is_finite() && py.is_finite())
        .ok_or(ProjectionError::PointOutOfDomain { x, y, from, to })
}

/// Reprojects bounding boxes between CRSs.
pub trait BoundsProjector {
    fn project(
        &self,
        bounds: &BoundingBox,
        from: CrsCode,
        to: CrsCode,
    ) -> Result<BoundingBox, ProjectionError>;
}

/// Grid-sampling [`BoundsProjector`].
#[derive(Debug, Clone, Copy)]
pub struct SampledReprojector {
    /// Samples per axis of the source grid, at least 2
    pub samples: usize,
    /// Points per edge of the clipped geographic box, at least 2
    pub edge_samples: usize,
}

impl Default for SampledReprojector {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            edge_samples: EDGE_SAMPLES,
        }
    }
}

impl SampledReprojector {
    pub fn new(samples: usize) -> Self {
        Self {
            samples: samples.max(2),
            ..Self::default()
        }
    }

    pub fn with_edge_samples(mut self, edge_samples: usize) -> Self {
        self.edge_samples = edge_samples.max(2);
        self
    }

    /// Evenly spaced points along the four edges of `bounds`, corners
    /// included. A projection's extremes over a box lie on its boundary.
    fn perimeter(&self, bounds: &BoundingBox) -> impl Iterator<Item = (f64, f64)> {
        let n = self.edge_samples.max(2);
        let b = *bounds;
        (0..n).flat_map(move |i| {
            let f = i as f64 / (n - 1) as f64;
            let x = b.min_x + f * b.width();
            let y = b.min_y + f * b.height();
            [(x, b.min_y), (x, b.max_y), (b.min_x, y), (b.max_x, y)]
        })
    }

    /// Evenly spaced points over `bounds`, edges included.
    fn grid(&self, bounds: &BoundingBox) -> impl Iterator<Item = (f64, f64)> + '_ {
        let n = self.samples.max(2);
        let bounds = *bounds;
        (0..n).flat_map(move |i| {
            let fx = i as f64 / (n - 1) as f64;
            (0..n).map(move |j| {
                let fy = j as f64 / (n - 1) as f64;
                (
                    bounds.min_x + fx * bounds.width(),
                    bounds.min_y + fy * bounds.height(),
                )
            })
        })
    }

    /// Geographic envelope of projected `bounds`.
    fn to_geographic(
        &self,
        bounds: &BoundingBox,
        source: &dyn Projection,
    ) -> Option<BoundingBox> {
        let points = self
            .grid(bounds)
            .filter_map(|(x, y)| source.inverse(x, y))
            .filter(|(lon, lat)| lon.is_finite() && lat.is_finite());

        let mut geo = BoundingBox::from_points(points)?;

        // Bounds around a projected pole cover every meridian.
        if let Some((px, py)) = source.pole() {
            if bounds.contains_point(px, py) {
                geo = BoundingBox::new(-180.0, geo.min_y, 180.0, 90.0);
            }
        }

        geo.intersection(&BoundingBox::world_geographic())
    }
}

impl BoundsProjector for SampledReprojector {
    fn project(
        &self,
        bounds: &BoundingBox,
        from: CrsCode,
        to: CrsCode,
    ) -> Result<BoundingBox, ProjectionError> {
        if from.same_datum_space(&to) {
            return Ok(*bounds);
        }
        let unsupported = ProjectionError::UnsupportedTransform { from, to };

        let source = projection_for(from);
        let target = projection_for(to);

        let clipped = self
            .to_geographic(bounds, source.as_ref())
            .and_then(|geo| geo.intersection(&target.valid_area()))
            .filter(|geo| !geo.is_empty())
            .ok_or_else(|| unsupported.clone())?;

        let points = self
            .perimeter(&clipped)
            .filter_map(|(lon, lat)| target.forward(lon, lat))
            .filter(|(x, y)| x.is_finite() && y.is_finite());

        BoundingBox::from_points(points).ok_or(unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_same_space_is_identity() {
        let bbox = BoundingBox::new(-10.0, 20.0, 30.0, 40.0);
        let out = SampledReprojector::default()
            .project(&bbox, CrsCode::Crs84, CrsCode::Epsg4326)
            .unwrap();
        assert_eq!(out, bbox);
    }

    #[test]
    fn test_world_to_web_mercator() {
        let out = SampledReprojector::default()
            .project(&BoundingBox::world_geographic(), CrsCode::Crs84, CrsCode::Epsg3857)
            .unwrap();
        let half = 20037508.342789244;
        assert!(close(out.min_x, -half, 1e-3), "{:?}", out);
        assert!(close(out.max_x, half, 1e-3), "{:?}", out);
        assert!(close(out.min_y, -half, 1e-3), "{:?}", out);
        assert!(close(out.max_y, half, 1e-3), "{:?}", out);
    }

    #[test]
    fn test_world_to_alaska_polar() {
        let out = SampledReprojector::default()
            .project(&BoundingBox::world_geographic(), CrsCode::Crs84, CrsCode::Epsg5936)
            .unwrap();
        assert!(close(out.min_x, -1.0e7, 1.0e6), "{:?}", out);
        assert!(close(out.min_y, -1.0e7, 1.0e6), "{:?}", out);
        assert!(close(out.max_x, 1.4e7, 1.0e6), "{:?}", out);
        assert!(close(out.max_y, 1.4e7, 1.0e6), "{:?}", out);
    }

    #[test]
    fn test_southern_hemisphere_has_no_polar_alternate() {
        let bbox = BoundingBox::new(100.0, -50.0, 150.0, -10.0);
        let err = SampledReprojector::default()
            .project(&bbox, CrsCode::Crs84, CrsCode::Epsg5936)
            .unwrap_err();
        assert!(matches!(err, ProjectionError::UnsupportedTransform { .. }));
    }

    #[test]
    fn test_polar_bounds_around_pole_cover_all_meridians() {
        let bbox = BoundingBox::new(1_000_000.0, 1_000_000.0, 3_000_000.0, 3_000_000.0);
        let out = SampledReprojector::default()
            .project(&bbox, CrsCode::Epsg5936, CrsCode::Crs84)
            .unwrap();
        assert_eq!(out.min_x, -180.0);
        assert_eq!(out.max_x, 180.0);
        assert_eq!(out.max_y, 90.0);
        assert!(out.min_y > 70.0 && out.min_y < 80.0, "{:?}", out);
    }

    #[test]
    fn test_perimeter_covers_edges_only() {
        let projector = SampledReprojector::default().with_edge_samples(3);
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let points: Vec<_> = projector.perimeter(&bbox).collect();
        assert_eq!(points.len(), 12);
        assert!(points.contains(&(2.0, 2.0)));
        assert!(points.contains(&(1.0, 0.0)));
        assert!(!points.contains(&(1.0, 1.0)));
    }

    #[test]
    fn test_transform_point_ottawa() {
        let (x, y) =
            transform_point(-75.6972, 45.4215, CrsCode::Crs84, CrsCode::Epsg3978).unwrap();
        assert!(close(x, 1510614.978, 1.0));
        assert!(close(y, -169810.950, 1.0));

        let (lon, lat) = transform_point(x, y, CrsCode::Epsg3978, CrsCode::Epsg4326).unwrap();
        assert!(close(lon, -75.6972, 1e-8));
        assert!(close(lat, 45.4215, 1e-8));
    }

    #[test]
    fn test_transform_point_pole_to_mercator_fails() {
        let result = transform_point(0.0, 90.0, CrsCode::Crs84, CrsCode::Epsg3857);
        assert!(matches!(result, Err(ProjectionError::PointOutOfDomain { .. })));
    }
}
