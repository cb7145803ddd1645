//! Link templates and the inputs they reference.
//!
//! Every extent carries a zoom input, an image or tile link with its
//! location inputs, and a query link when something in it is queryable.
//! Placeholders follow the MapML client conventions: `{xmin}`..`{ymax}` and
//! `{w}`,`{h}` for image requests, `{txmin}`..`{tymax}` or `{x}`,`{y}` for
//! tiles, `{i}`,`{j}` for query pixels and `{s}` for the shard server.

use tracing::debug;

use mapml_common::tcrs::TILE_SIZE;
use mapml_common::{ShardConfig, TiledCrs, ZoomRange};

use crate::document::{Axis, Datalist, ExtentNode, Input, InputType, Link, LinkRel, Position, Units};

/// Features returned per GetFeatureInfo request.
pub const FEATURE_COUNT: u32 = 50;

/// Info format requested by query templates.
pub const QUERY_INFO_FORMAT: &str = "text/mapml";

/// Id of the shard server datalist.
pub const SHARD_DATALIST_ID: &str = "servers";

/// Name of the shard server input.
pub const SHARD_INPUT_NAME: &str = "s";

/// How an extent fetches imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// One WMS GetMap per viewport
    Image,
    /// WMS GetMap per 256 px tile
    WmsTiles,
    /// WMTS GetTile against a cached gridset
    Wmts,
}

/// Everything needed to template one extent.
#[derive(Debug, Clone)]
pub struct TemplateParams<'a> {
    /// Service base URL with trailing slash
    pub base: String,
    pub tcrs: &'a TiledCrs,
    /// Comma-joined WMS layer names
    pub layers: String,
    /// Comma-joined queryable layer names; no query link when `None`
    pub query_layers: Option<String>,
    /// Comma-joined style tokens
    pub styles: String,
    /// Workspace-qualified layer name used by WMTS templates
    pub wmts_layer: String,
    pub mode: TileMode,
    pub zoom: ZoomRange,
    pub image_format: &'a str,
    pub language: Option<&'a str>,
    pub sharding: Option<&'a ShardConfig>,
}

impl TemplateParams<'_> {
    fn base(&self) -> String {
        match self.sharding {
            Some(shards) => shard_base_url(&self.base, &shards.server_pattern),
            None => self.base.clone(),
        }
    }

    fn language_suffix(&self) -> String {
        self.language
            .map(|l| format!("&language={}", l))
            .unwrap_or_default()
    }

    fn crs_param(&self) -> String {
        self.tcrs.id.mapml_code()
    }
}

/// Replace the host (and port) of `base` with a shard pattern such as
/// `{s}.example.com`, keeping scheme and path.
pub fn shard_base_url(base: &str, pattern: &str) -> String {
    let (scheme, rest) = base.split_once("://").unwrap_or(("http", base));
    let path = rest.find('/').map(|idx| &rest[idx..]).unwrap_or("/");
    format!("{}://{}{}", scheme, pattern, path)
}

/// Build the inputs, datalists and links of one extent.
pub fn build_extent_nodes(params: &TemplateParams<'_>) -> Vec<ExtentNode> {
    let mut nodes = Vec::new();

    if let Some(shards) = params.sharding {
        nodes.extend(shard_nodes(shards));
    }

    nodes.push(ExtentNode::Input(Input::zoom(params.zoom.min, params.zoom.max)));

    match params.mode {
        TileMode::Image => {
            nodes.extend(location_inputs(params.tcrs, "", image_units(params.tcrs)));
            nodes.push(ExtentNode::Input(Input::new("w", InputType::Width)));
            nodes.push(ExtentNode::Input(Input::new("h", InputType::Height)));
            nodes.push(ExtentNode::Link(Link::template(
                LinkRel::Image,
                image_template(params),
            )));
        }
        TileMode::WmsTiles => {
            nodes.extend(location_inputs(params.tcrs, "t", Units::Tilematrix));
            nodes.push(ExtentNode::Link(Link::template(
                LinkRel::Tile,
                wms_tile_template(params),
            )));
        }
        TileMode::Wmts => {
            nodes.extend(tile_matrix_inputs(params.tcrs, params.zoom));
            nodes.push(ExtentNode::Link(Link::template(
                LinkRel::Tile,
                wmts_tile_template(params),
            )));
        }
    }

    if let Some(query) = query_template(params) {
        let units = match params.mode {
            TileMode::Image => Units::Map,
            TileMode::WmsTiles | TileMode::Wmts => Units::Tile,
        };
        nodes.push(ExtentNode::Input(Input::location("i", units, Axis::I)));
        nodes.push(ExtentNode::Input(Input::location("j", units, Axis::J)));
        nodes.push(ExtentNode::Link(Link::template(LinkRel::Query, query)));
    }

    debug!(
        tcrs = %params.tcrs.id,
        layers = %params.layers,
        mode = ?params.mode,
        sharded = params.sharding.is_some(),
        "Built extent templates"
    );

    nodes
}

fn shard_nodes(shards: &ShardConfig) -> [ExtentNode; 2] {
    let datalist = Datalist {
        id: SHARD_DATALIST_ID.to_string(),
        options: shards
            .shards
            .iter()
            .map(|s| (s.clone(), s.clone()))
            .collect(),
    };
    let input = Input {
        list: Some(SHARD_DATALIST_ID.to_string()),
        shard: true,
        ..Input::new(SHARD_INPUT_NAME, InputType::Hidden)
    };
    [ExtentNode::Datalist(datalist), ExtentNode::Input(input)]
}

fn image_units(tcrs: &TiledCrs) -> Units {
    if tcrs.crs.is_geographic() {
        Units::Gcrs
    } else {
        Units::Pcrs
    }
}

/// Corner inputs `{prefix}xmin`..`{prefix}ymax` bounded by the TCRS bounds.
fn location_inputs(tcrs: &TiledCrs, prefix: &str, units: Units) -> Vec<ExtentNode> {
    let (x_axis, y_axis) = if tcrs.crs.is_geographic() {
        (Axis::Longitude, Axis::Latitude)
    } else {
        (Axis::Easting, Axis::Northing)
    };
    let b = tcrs.bounds;

    [
        ("xmin", x_axis, Position::TopLeft),
        ("ymin", y_axis, Position::BottomLeft),
        ("xmax", x_axis, Position::TopRight),
        ("ymax", y_axis, Position::TopRight),
    ]
    .into_iter()
    .map(|(name, axis, position)| {
        let (min, max) = if axis == x_axis {
            (b.min_x, b.max_x)
        } else {
            (b.min_y, b.max_y)
        };
        ExtentNode::Input(
            Input::location(&format!("{}{}", prefix, name), units, axis)
                .with_position(position)
                .with_range(min, max),
        )
    })
    .collect()
}

/// Column and row inputs spanning the tile matrix at the lowest zoom.
fn tile_matrix_inputs(tcrs: &TiledCrs, zoom: ZoomRange) -> Vec<ExtentNode> {
    let matrix = tcrs.tile_matrix(zoom.min);
    vec![
        ExtentNode::Input(
            Input::location("x", Units::Tilematrix, Axis::Column)
                .with_range(0.0, matrix.matrix_width.saturating_sub(1) as f64),
        ),
        ExtentNode::Input(
            Input::location("y", Units::Tilematrix, Axis::Row)
                .with_range(0.0, matrix.matrix_height.saturating_sub(1) as f64),
        ),
    ]
}

fn image_template(p: &TemplateParams<'_>) -> String {
    format!(
        "{}wms?version=1.3.0&service=WMS&request=GetMap&crs={}&layers={}&styles={}\
         &bbox={{xmin}},{{ymin}},{{xmax}},{{ymax}}&format={}&transparent=true\
         &width={{w}}&height={{h}}{}",
        p.base(),
        p.crs_param(),
        p.layers,
        p.styles,
        p.image_format,
        p.language_suffix()
    )
}

fn wms_tile_template(p: &TemplateParams<'_>) -> String {
    format!(
        "{}wms?version=1.3.0&service=WMS&request=GetMap&crs={}&layers={}&styles={}\
         &bbox={{txmin}},{{tymin}},{{txmax}},{{tymax}}&format={}&transparent=true\
         &width={}&height={}{}",
        p.base(),
        p.crs_param(),
        p.layers,
        p.styles,
        p.image_format,
        TILE_SIZE,
        TILE_SIZE,
        p.language_suffix()
    )
}

fn wmts_tile_template(p: &TemplateParams<'_>) -> String {
    format!(
        "{}gwc/service/wmts?layer={}&style={}&tilematrixset={}&service=WMTS\
         &request=GetTile&version=1.0.0&tilematrix={{z}}&TileCol={{x}}&TileRow={{y}}\
         &format={}",
        p.base(),
        p.wmts_layer,
        p.styles,
        p.tcrs.id.name(),
        p.image_format
    )
}

fn query_template(p: &TemplateParams<'_>) -> Option<String> {
    let query_layers = p.query_layers.as_deref()?;

    let template = match p.mode {
        TileMode::Image => format!(
            "{}wms?version=1.3.0&service=WMS&request=GetFeatureInfo&crs={}&layers={}\
             &query_layers={}&styles={}&bbox={{xmin}},{{ymin}},{{xmax}},{{ymax}}\
             &transparent=true&width={{w}}&height={{h}}&x={{i}}&y={{j}}\
             &info_format={}&feature_count={}{}",
            p.base(),
            p.crs_param(),
            p.layers,
            query_layers,
            p.styles,
            QUERY_INFO_FORMAT,
            FEATURE_COUNT,
            p.language_suffix()
        ),
        TileMode::WmsTiles => format!(
            "{}wms?version=1.3.0&service=WMS&request=GetFeatureInfo&crs={}&layers={}\
             &query_layers={}&styles={}&bbox={{txmin}},{{tymin}},{{txmax}},{{tymax}}\
             &transparent=true&width={}&height={}&x={{i}}&y={{j}}\
             &info_format={}&feature_count={}{}",
            p.base(),
            p.crs_param(),
            p.layers,
            query_layers,
            p.styles,
            TILE_SIZE,
            TILE_SIZE,
            QUERY_INFO_FORMAT,
            FEATURE_COUNT,
            p.language_suffix()
        ),
        TileMode::Wmts => format!(
            "{}gwc/service/wmts?layer={}&style={}&tilematrixset={}&service=WMTS\
             &request=GetFeatureInfo&version=1.0.0&tilematrix={{z}}&TileCol={{x}}\
             &TileRow={{y}}&i={{i}}&j={{j}}&infoformat={}&feature_count={}",
            p.base(),
            p.wmts_layer,
            p.styles,
            p.tcrs.id.name(),
            QUERY_INFO_FORMAT,
            FEATURE_COUNT
        ),
    };
    Some(template)
}
