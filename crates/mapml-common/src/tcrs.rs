//! Tiled coordinate reference systems (TCRS).
//!
//! A TCRS pairs a projected CRS with a fixed tile pyramid: a top-left
//! origin, a 256 px tile size and one resolution per zoom level. The four
//! TCRSs defined by MapML are registered once, process-wide, and never
//! mutated afterwards.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BoundingBox, CrsCode};

/// Lowest zoom level of every TCRS.
pub const NATIVE_ZOOM_MIN: u32 = 0;

/// Highest zoom level of every TCRS.
pub const NATIVE_ZOOM_MAX: u32 = 21;

/// Standardized rendering pixel size in meters (OGC SLD/WMTS).
pub const STANDARD_PIXEL_SIZE: f64 = 0.00028;

/// Tile edge in pixels.
pub const TILE_SIZE: u32 = 256;

/// Prefix of TCRS codes advertised in capabilities and accepted in requests.
pub const MAPML_CRS_PREFIX: &str = "MapML:";

const EARTH_RADIUS: f64 = 6378137.0;
const WEB_MERCATOR_EXTENT: f64 = 20037508.342789244;
const APSTILE_MIN: f64 = -28567784.109255;
const APSTILE_MAX: f64 = 32567784.109255;

const CBMTILE_RESOLUTIONS: [f64; 22] = [
    38364.660062653464,
    22489.62831258996,
    13229.193125052918,
    7937.5158750317505,
    4630.2175937685215,
    2645.8386250105837,
    1587.5031750063501,
    926.0435187537042,
    529.1677250021168,
    317.50063500127004,
    185.20870375074085,
    111.12522225044451,
    66.1459656252646,
    38.36466006265346,
    22.48962831258996,
    13.229193125052918,
    7.9375158750317505,
    4.6302175937685215,
    2.6458386250105836,
    1.5875031750063502,
    0.92604351875370428,
    0.52916772500211673,
];

/// Identifier of a registered TCRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TcrsId {
    #[serde(rename = "WGS84")]
    Wgs84,
    #[serde(rename = "OSMTILE")]
    OsmTile,
    #[serde(rename = "CBMTILE")]
    CbmTile,
    #[serde(rename = "APSTILE")]
    ApsTile,
}

impl TcrsId {
    /// All identifiers in registry order.
    pub const ALL: [TcrsId; 4] = [
        TcrsId::Wgs84,
        TcrsId::OsmTile,
        TcrsId::CbmTile,
        TcrsId::ApsTile,
    ];

    /// Position in [`TcrsId::ALL`] and in the registry.
    fn index(&self) -> usize {
        match self {
            TcrsId::Wgs84 => 0,
            TcrsId::OsmTile => 1,
            TcrsId::CbmTile => 2,
            TcrsId::ApsTile => 3,
        }
    }

    /// The MapML name, e.g. "OSMTILE".
    pub fn name(&self) -> &'static str {
        match self {
            TcrsId::Wgs84 => "WGS84",
            TcrsId::OsmTile => "OSMTILE",
            TcrsId::CbmTile => "CBMTILE",
            TcrsId::ApsTile => "APSTILE",
        }
    }

    /// Case-insensitive lookup by MapML name, with or without the `MapML:` prefix.
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        let bare = match s.get(..MAPML_CRS_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(MAPML_CRS_PREFIX) => {
                &s[MAPML_CRS_PREFIX.len()..]
            }
            _ => s,
        };
        TcrsId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(bare))
    }

    /// The request code, e.g. "MapML:OSMTILE".
    pub fn mapml_code(&self) -> String {
        format!("{}{}", MAPML_CRS_PREFIX, self.name())
    }
}

impl fmt::Display for TcrsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One zoom level of a TCRS tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileMatrix {
    pub zoom: u32,
    /// Units per pixel
    pub resolution: f64,
    pub matrix_width: u64,
    pub matrix_height: u64,
}

/// A tiled coordinate reference system.
#[derive(Debug, Clone, Serialize)]
pub struct TiledCrs {
    pub id: TcrsId,
    pub crs: CrsCode,
    /// Projected bounds of the pyramid
    pub bounds: BoundingBox,
    /// Top-left corner of tile (0, 0)
    pub origin: (f64, f64),
    pub tile_size: u32,
    /// Units per pixel, indexed by zoom level
    pub resolutions: Vec<f64>,
    /// Meters per CRS unit, used to turn resolutions into scale denominators
    pub meters_per_unit: f64,
}

impl TiledCrs {
    /// Native zoom range, inclusive.
    pub fn native_zoom_range(&self) -> (u32, u32) {
        (NATIVE_ZOOM_MIN, NATIVE_ZOOM_MAX)
    }

    /// Resolution at a zoom level, clamped into the native range.
    pub fn resolution(&self, zoom: u32) -> f64 {
        let z = zoom.min(NATIVE_ZOOM_MAX) as usize;
        self.resolutions[z.min(self.resolutions.len() - 1)]
    }

    /// Scale denominator at a zoom level.
    pub fn scale_denominator(&self, zoom: u32) -> f64 {
        self.resolution(zoom) * self.meters_per_unit / STANDARD_PIXEL_SIZE
    }

    /// Nearest zoom level for a scale denominator.
    ///
    /// Denominators coarser than zoom 0 give 0, finer than the last level give
    /// the native max. Non-positive or NaN input gives the native max,
    /// infinity gives zoom 0.
    pub fn zoom_for_scale_denominator(&self, denominator: f64) -> u32 {
        if !(denominator > 0.0) {
            return NATIVE_ZOOM_MAX;
        }
        if denominator.is_infinite() {
            return NATIVE_ZOOM_MIN;
        }

        let target = denominator.ln();
        (NATIVE_ZOOM_MIN..=NATIVE_ZOOM_MAX)
            .min_by(|a, b| {
                let da = (self.scale_denominator(*a).ln() - target).abs();
                let db = (self.scale_denominator(*b).ln() - target).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(NATIVE_ZOOM_MIN)
    }

    /// The tile matrix at a zoom level.
    pub fn tile_matrix(&self, zoom: u32) -> TileMatrix {
        let zoom = zoom.min(NATIVE_ZOOM_MAX);
        let resolution = self.resolution(zoom);
        let span = resolution * self.tile_size as f64;
        TileMatrix {
            zoom,
            resolution,
            matrix_width: (self.bounds.width() / span).ceil().max(1.0) as u64,
            matrix_height: (self.bounds.height() / span).ceil().max(1.0) as u64,
        }
    }

    /// Coordinate-system label used by MapML: "gcrs" or "pcrs".
    pub fn coordinate_system(&self) -> &'static str {
        if self.crs.is_geographic() {
            "gcrs"
        } else {
            "pcrs"
        }
    }

    /// Largest zoom at which `bbox` fits a viewport of `width` x `height` pixels.
    pub fn fitting_zoom(&self, bbox: &BoundingBox, width: u32, height: u32) -> u32 {
        (NATIVE_ZOOM_MIN..=NATIVE_ZOOM_MAX)
            .rev()
            .find(|z| {
                let res = self.resolution(*z);
                bbox.width() / res <= width as f64 && bbox.height() / res <= height as f64
            })
            .unwrap_or(NATIVE_ZOOM_MIN)
    }
}

fn halving(base: f64) -> Vec<f64> {
    (NATIVE_ZOOM_MIN..=NATIVE_ZOOM_MAX)
        .map(|z| base / 2f64.powi(z as i32))
        .collect()
}

/// Read-only registry of the MapML tiled CRSs.
#[derive(Debug)]
pub struct TcrsRegistry {
    entries: Vec<TiledCrs>,
}

static STANDARD: Lazy<TcrsRegistry> = Lazy::new(TcrsRegistry::standard);

impl TcrsRegistry {
    /// Build the four MapML TCRSs.
    pub fn standard() -> Self {
        let degrees_to_meters = 2.0 * std::f64::consts::PI * EARTH_RADIUS / 360.0;

        // Order must follow TcrsId::ALL.
        let entries = vec![
            TiledCrs {
                id: TcrsId::Wgs84,
                crs: CrsCode::Crs84,
                bounds: BoundingBox::world_geographic(),
                origin: (-180.0, 90.0),
                tile_size: TILE_SIZE,
                resolutions: halving(0.703125),
                meters_per_unit: degrees_to_meters,
            },
            TiledCrs {
                id: TcrsId::OsmTile,
                crs: CrsCode::Epsg3857,
                bounds: BoundingBox::new(
                    -WEB_MERCATOR_EXTENT,
                    -WEB_MERCATOR_EXTENT,
                    WEB_MERCATOR_EXTENT,
                    WEB_MERCATOR_EXTENT,
                ),
                origin: (-WEB_MERCATOR_EXTENT, WEB_MERCATOR_EXTENT),
                tile_size: TILE_SIZE,
                resolutions: halving(156543.03392804097),
                meters_per_unit: 1.0,
            },
            TiledCrs {
                id: TcrsId::CbmTile,
                crs: CrsCode::Epsg3978,
                bounds: BoundingBox::new(-34655800.0, -39310000.0, 10000000.0, 35765600.0),
                origin: (-34655800.0, 39310000.0),
                tile_size: TILE_SIZE,
                resolutions: CBMTILE_RESOLUTIONS.to_vec(),
                meters_per_unit: 1.0,
            },
            TiledCrs {
                id: TcrsId::ApsTile,
                crs: CrsCode::Epsg5936,
                bounds: BoundingBox::new(APSTILE_MIN, APSTILE_MIN, APSTILE_MAX, APSTILE_MAX),
                origin: (APSTILE_MIN, APSTILE_MAX),
                tile_size: TILE_SIZE,
                resolutions: halving(238810.813354),
                meters_per_unit: 1.0,
            },
        ];

        Self { entries }
    }

    /// The shared process-wide registry.
    pub fn global() -> &'static TcrsRegistry {
        &STANDARD
    }

    pub fn get(&self, id: TcrsId) -> &TiledCrs {
        &self.entries[id.index()]
    }

    /// Look up by MapML name (`OSMTILE`, `MapML:OSMTILE`).
    pub fn lookup(&self, name: &str) -> Option<&TiledCrs> {
        TcrsId::from_name(name).map(|id| self.get(id))
    }

    /// The TCRS whose underlying CRS is `crs`.
    pub fn for_crs(&self, crs: CrsCode) -> Option<&TiledCrs> {
        self.entries.iter().find(|t| t.crs.same_datum_space(&crs))
    }

    /// All TCRSs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &TiledCrs> {
        self.entries.iter()
    }

    /// CRS codes to advertise in WMS capabilities.
    pub fn capabilities_crs_codes(&self) -> Vec<String> {
        self.entries.iter().map(|t| t.id.mapml_code()).collect()
    }
}
