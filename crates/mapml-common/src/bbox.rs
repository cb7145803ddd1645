//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::crs::AxisOrder;

/// An axis-aligned bounding box.
///
/// Coordinates are always stored easting/longitude first. Geographic boxes
/// are in degrees, projected boxes in the CRS units (meters for every TCRS).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The whole-world geographic box in lon/lat.
    pub fn world_geographic() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Parse a WMS BBOX parameter string: "a,b,c,d".
    ///
    /// With [`AxisOrder::LatLon`] the values are read as
    /// `miny,minx,maxy,maxx`, the WMS 1.3.0 convention for EPSG:4326.
    pub fn from_bbox_param(s: &str, order: AxisOrder) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
            if !value.is_finite() {
                return Err(BboxParseError::InvalidNumber(part.to_string()));
            }
        }

        let bbox = match order {
            AxisOrder::XY => Self::new(values[0], values[1], values[2], values[3]),
            AxisOrder::LatLon => Self::new(values[1], values[0], values[3], values[2]),
        };

        if bbox.min_x > bbox.max_x || bbox.min_y > bbox.max_y {
            return Err(BboxParseError::Inverted(s.to_string()));
        }

        Ok(bbox)
    }

    /// Format as a WMS BBOX parameter value in the given axis order.
    pub fn to_bbox_param(&self, order: AxisOrder) -> String {
        match order {
            AxisOrder::XY => format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y),
            AxisOrder::LatLon => {
                format!("{},{},{},{}", self.min_y, self.min_x, self.max_y, self.max_x)
            }
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Centre point (x, y).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True when the box has no area.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the box to include a point.
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Bounding box of a set of points, `None` when the iterator is empty.
    pub fn from_points<I>(points: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut bbox = BoundingBox::new(x, y, x, y);
        for (x, y) in iter {
            bbox.expand_to_include(x, y);
        }
        Some(bbox)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),

    #[error("BBOX minimum exceeds maximum: {0}")]
    Inverted(String),
}
