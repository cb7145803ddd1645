//! Coordinate Reference System codes understood by the MapML output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRS codes backing the registered tiled CRSs.
///
/// Anything else in a request is rejected as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// OGC CRS84: WGS84 geographic, longitude first
    Crs84,
    /// WGS84 geographic, latitude first under WMS 1.3.0
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// WGS84 / EPSG Alaska Polar Stereographic
    Epsg5936,
    /// NAD83 / Canada Atlas Lambert
    Epsg3978,
}

impl CrsCode {
    /// Parse a CRS string from a WMS request.
    ///
    /// Accepts formats like:
    /// - "EPSG:3857" / "epsg:3857"
    /// - "CRS:84", "OGC:CRS84"
    /// - "urn:ogc:def:crs:EPSG::3857", "urn:ogc:def:crs:OGC:1.3:CRS84"
    ///
    /// `MapML:` codes are resolved by the TCRS registry, not here.
    pub fn from_wms_string(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();
        let normalized = normalized
            .strip_prefix("URN:OGC:DEF:CRS:")
            .map(|rest| rest.replace("::", ":").replace(":1.3:", ":"))
            .unwrap_or(normalized);

        match normalized.as_str() {
            "CRS:84" | "OGC:CRS84" => Ok(CrsCode::Crs84),
            "EPSG:4326" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:5936" => Ok(CrsCode::Epsg5936),
            "EPSG:3978" => Ok(CrsCode::Epsg3978),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Axis order of BBOX values for this CRS in WMS 1.3.0.
    pub fn axis_order_wms_1_3(&self) -> AxisOrder {
        match self {
            CrsCode::Epsg4326 => AxisOrder::LatLon,
            _ => AxisOrder::XY,
        }
    }

    /// Axis order for WMS 1.1.1 (always x, y regardless of CRS).
    pub fn axis_order_wms_1_1(&self) -> AxisOrder {
        AxisOrder::XY
    }

    /// Axis order for a given WMS version string; anything but 1.3.x is x, y.
    pub fn axis_order_for_version(&self, version: &str) -> AxisOrder {
        if version.starts_with("1.3") {
            self.axis_order_wms_1_3()
        } else {
            self.axis_order_wms_1_1()
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Crs84 | CrsCode::Epsg4326)
    }

    /// True when two codes describe the same coordinate space
    /// (CRS84 and EPSG:4326 differ only in declared axis order).
    pub fn same_datum_space(&self, other: &CrsCode) -> bool {
        self == other || (self.is_geographic() && other.is_geographic())
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Crs84 => "CRS:84",
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg5936 => "EPSG:5936",
            CrsCode::Epsg3978 => "EPSG:3978",
        };
        write!(f, "{}", code)
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(
            CrsCode::from_wms_string("EPSG:4326").unwrap(),
            CrsCode::Epsg4326
        );
        assert_eq!(
            CrsCode::from_wms_string("epsg:3857").unwrap(),
            CrsCode::Epsg3857
        );
        assert_eq!(CrsCode::from_wms_string("CRS:84").unwrap(), CrsCode::Crs84);
        assert_eq!(
            CrsCode::from_wms_string("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(),
            CrsCode::Crs84
        );
        assert_eq!(
            CrsCode::from_wms_string("urn:ogc:def:crs:EPSG::3978").unwrap(),
            CrsCode::Epsg3978
        );
        assert!(CrsCode::from_wms_string("EPSG:32632").is_err());
    }

    #[test]
    fn test_axis_order() {
        assert_eq!(CrsCode::Epsg4326.axis_order_wms_1_3(), AxisOrder::LatLon);
        assert_eq!(CrsCode::Crs84.axis_order_wms_1_3(), AxisOrder::XY);
        assert_eq!(CrsCode::Epsg3857.axis_order_wms_1_3(), AxisOrder::XY);
        assert_eq!(
            CrsCode::Epsg4326.axis_order_for_version("1.1.1"),
            AxisOrder::XY
        );
    }

    #[test]
    fn test_same_datum_space() {
        assert!(CrsCode::Crs84.same_datum_space(&CrsCode::Epsg4326));
        assert!(!CrsCode::Epsg3857.same_datum_space(&CrsCode::Epsg5936));
    }
}
