//! WMS GetMap request parsing for MapML output.
//!
//! Parameter names are case-insensitive. The CRS may be a standard code
//! (`EPSG:3857`, `CRS:84`) or a tiled CRS code (`MapML:OSMTILE`); either
//! way it must resolve to one of the registered TCRSs.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use mapml_common::{
    AxisOrder, BoundingBox, CrsCode, MapmlError, MapmlResult, TcrsId, TcrsRegistry,
};

/// MIME type of MapML documents.
pub const MAPML_MIME_TYPE: &str = "text/mapml";

/// MIME type of the HTML preview page.
pub const MAPML_HTML_MIME_TYPE: &str = "text/html; subtype=mapml";

/// `format_options` key overriding the image format of templates.
pub const MAPML_WMS_MIME_TYPE_OPTION: &str = "mapmlwmsmimetype";

/// Requested response encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    MapMl,
    Html,
}

impl OutputFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let base = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match base.as_str() {
            "text/mapml" => Some(OutputFormat::MapMl),
            "text/html" => Some(OutputFormat::Html),
            _ => None,
        }
    }

    pub fn to_mime(&self) -> &'static str {
        match self {
            OutputFormat::MapMl => MAPML_MIME_TYPE,
            OutputFormat::Html => MAPML_HTML_MIME_TYPE,
        }
    }
}

/// Raw GetMap KVP parameters, keyed by upper-cased parameter name.
#[derive(Debug, Default, Deserialize)]
pub struct GetMapParams {
    #[serde(rename = "SERVICE")]
    pub service: Option<String>,
    #[serde(rename = "REQUEST")]
    pub request: Option<String>,
    #[serde(rename = "VERSION")]
    pub version: Option<String>,
    #[serde(rename = "LAYERS")]
    pub layers: Option<String>,
    #[serde(rename = "STYLES")]
    pub styles: Option<String>,
    /// WMS 1.3.0 CRS parameter
    #[serde(rename = "CRS")]
    pub crs: Option<String>,
    /// WMS 1.1.1 SRS parameter
    #[serde(rename = "SRS")]
    pub srs: Option<String>,
    #[serde(rename = "BBOX")]
    pub bbox: Option<String>,
    #[serde(rename = "WIDTH")]
    pub width: Option<String>,
    #[serde(rename = "HEIGHT")]
    pub height: Option<String>,
    #[serde(rename = "FORMAT")]
    pub format: Option<String>,
    #[serde(rename = "FORMAT_OPTIONS")]
    pub format_options: Option<String>,
    #[serde(rename = "LANGUAGE")]
    pub language: Option<String>,
    #[serde(rename = "TRANSPARENT")]
    pub transparent: Option<String>,
}

impl GetMapParams {
    /// Parse a URL query string such as `LAYERS=a,b&CRS=EPSG:3857&...`.
    ///
    /// Keys are upper-cased before matching; unknown keys are ignored and a
    /// repeated key keeps its last value.
    pub fn from_query(query: &str) -> MapmlResult<Self> {
        let mut normalized: Vec<(String, String)> = Vec::new();
        for (key, value) in parse_query_string(query)? {
            let key = key.to_uppercase();
            normalized.retain(|(k, _)| *k != key);
            normalized.push((key, value));
        }

        let encoded = serde_urlencoded::to_string(&normalized).map_err(|e| {
            MapmlError::InvalidParameter {
                param: "request".to_string(),
                message: e.to_string(),
            }
        })?;
        serde_urlencoded::from_str(&encoded).map_err(|e| MapmlError::InvalidParameter {
            param: "request".to_string(),
            message: e.to_string(),
        })
    }

    /// The CRS parameter for `version`: `CRS` for 1.3.0, `SRS` for 1.1.x,
    /// falling back to whichever one is present.
    pub fn crs_param(&self, version: &str) -> Option<&str> {
        let (preferred, other) = if version.starts_with("1.1") {
            (&self.srs, &self.crs)
        } else {
            (&self.crs, &self.srs)
        };
        if let (Some(p), Some(o)) = (preferred, other) {
            if p != o {
                debug!(used = %p, ignored = %o, version = version, "Both CRS and SRS given");
            }
        }
        preferred.as_deref().or(other.as_deref())
    }

    /// Validate and resolve into a typed request.
    pub fn into_request(self, registry: &TcrsRegistry) -> MapmlResult<MapMlRequest> {
        if let Some(service) = self.service.as_deref() {
            if !service.eq_ignore_ascii_case("WMS") {
                return Err(MapmlError::InvalidParameter {
                    param: "SERVICE".to_string(),
                    message: "SERVICE must be WMS".to_string(),
                });
            }
        }
        if let Some(request) = self.request.as_deref() {
            if !request.eq_ignore_ascii_case("GetMap") {
                return Err(MapmlError::InvalidParameter {
                    param: "REQUEST".to_string(),
                    message: format!("Unsupported request for MapML output: {}", request),
                });
            }
        }

        let version = self.version.clone().unwrap_or_else(|| "1.3.0".to_string());

        let layers = split_layers(
            self.layers
                .as_deref()
                .ok_or_else(|| MapmlError::MissingParameter("LAYERS".to_string()))?,
        );
        if layers.is_empty() {
            return Err(MapmlError::MissingParameter("LAYERS".to_string()));
        }
        let styles = distribute_styles(self.styles.as_deref(), layers.len());

        let crs_param = self
            .crs_param(&version)
            .ok_or_else(|| MapmlError::MissingParameter("CRS".to_string()))?;
        let (tcrs, axis_order) = resolve_crs(crs_param, &version, registry)?;

        let bbox = self
            .bbox
            .as_deref()
            .map(|b| BoundingBox::from_bbox_param(b, axis_order))
            .transpose()?;

        let width = parse_dimension("WIDTH", self.width.as_deref())?;
        let height = parse_dimension("HEIGHT", self.height.as_deref())?;

        let output = match self.format.as_deref() {
            None => OutputFormat::MapMl,
            Some(f) => OutputFormat::from_mime(f).ok_or_else(|| MapmlError::InvalidParameter {
                param: "FORMAT".to_string(),
                message: format!("Unsupported format for MapML output: {}", f),
            })?,
        };

        let format_options = self
            .format_options
            .as_deref()
            .map(parse_format_options)
            .unwrap_or_default();
        let image_format = format_options.get(MAPML_WMS_MIME_TYPE_OPTION).cloned();

        let language = self.language.filter(|l| !l.trim().is_empty());

        debug!(
            layers = ?layers,
            tcrs = %tcrs,
            width = width,
            height = height,
            "Parsed MapML GetMap request"
        );

        Ok(MapMlRequest {
            version,
            layers,
            styles,
            tcrs,
            bbox,
            width,
            height,
            output,
            image_format,
            language,
            workspace: None,
        })
    }
}

/// A validated GetMap request targeting a TCRS.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMlRequest {
    pub version: String,
    /// Layer and group names in request order
    pub layers: Vec<String>,
    /// One style token per layer; empty selects the default style
    pub styles: Vec<String>,
    pub tcrs: TcrsId,
    /// Requested bounds in TCRS units, x/y order
    pub bbox: Option<BoundingBox>,
    pub width: u32,
    pub height: u32,
    pub output: OutputFormat,
    /// Image format override from `format_options`
    pub image_format: Option<String>,
    pub language: Option<String>,
    /// Virtual-service workspace the request was addressed to
    pub workspace: Option<String>,
}

impl MapMlRequest {
    /// A MapML request for the given layers with empty styles and no bbox.
    pub fn new(layers: &[&str], tcrs: TcrsId, width: u32, height: u32) -> Self {
        Self {
            version: "1.3.0".to_string(),
            layers: layers.iter().map(|l| l.to_string()).collect(),
            styles: vec![String::new(); layers.len()],
            tcrs,
            bbox: None,
            width,
            height,
            output: OutputFormat::MapMl,
            image_format: None,
            language: None,
            workspace: None,
        }
    }

    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_styles(mut self, styles: &str) -> Self {
        self.styles = distribute_styles(Some(styles), self.layers.len());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Resolve a CRS parameter to a TCRS and the axis order of its BBOX values.
pub fn resolve_crs(
    crs: &str,
    version: &str,
    registry: &TcrsRegistry,
) -> MapmlResult<(TcrsId, AxisOrder)> {
    if let Some(tcrs) = registry.lookup(crs) {
        return Ok((tcrs.id, AxisOrder::XY));
    }

    let code = CrsCode::from_wms_string(crs)?;
    let tcrs = registry
        .for_crs(code)
        .ok_or_else(|| MapmlError::UnsupportedCrs(crs.to_string()))?;
    Ok((tcrs.id, code.axis_order_for_version(version)))
}

/// Split a LAYERS value, dropping empty tokens.
pub fn split_layers(layers: &str) -> Vec<String> {
    layers
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Match comma-separated style tokens to `count` layers by position.
///
/// Missing tokens become empty styles; surplus tokens are dropped.
pub fn distribute_styles(styles: Option<&str>, count: usize) -> Vec<String> {
    let tokens: Vec<String> = styles
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').map(|t| t.trim().to_string()).collect())
        .unwrap_or_default();

    if tokens.len() > count {
        debug!(styles = tokens.len(), layers = count, "Ignoring surplus style tokens");
    }

    (0..count)
        .map(|i| tokens.get(i).cloned().unwrap_or_default())
        .collect()
}

/// Parse `key:value;key:value` format options; keys are lower-cased.
pub fn parse_format_options(options: &str) -> HashMap<String, String> {
    options
        .split(';')
        .filter_map(|pair| {
            let (key, value) = pair.split_once(':')?;
            let key = key.trim().to_lowercase();
            (!key.is_empty()).then(|| (key, value.trim().to_string()))
        })
        .collect()
}

/// Decode a URL query string, or a full URL, into ordered key/value pairs.
pub fn parse_query_string(query: &str) -> MapmlResult<Vec<(String, String)>> {
    let query = query.trim_start_matches('?');
    let query = query.split_once('?').map(|(_, q)| q).unwrap_or(query);

    serde_urlencoded::from_str(query).map_err(|e| MapmlError::InvalidParameter {
        param: "request".to_string(),
        message: format!("Malformed query string: {}", e),
    })
}

fn parse_dimension(param: &str, value: Option<&str>) -> MapmlResult<u32> {
    let value = value.ok_or_else(|| MapmlError::MissingParameter(param.to_string()))?;
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| MapmlError::InvalidParameter {
            param: param.to_string(),
            message: format!("{} must be a positive integer, got '{}'", param, value),
        })
}
