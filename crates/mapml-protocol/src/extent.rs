//! Extent composition.
//!
//! A request renders as one hidden extent covering every requested layer,
//! or, in multi-extent mode with several layers, one labelled extent per
//! layer or layer group. Combined extents always use single-image requests:
//! tiles and WMTS address exactly one layer.

use tracing::debug;

use mapml_common::{
    resolve_zoom, MapmlError, MapmlResult, PublishedLayer, ShardConfig, TiledCrs, ZoomRange,
};

use crate::document::Extent;
use crate::templates::{build_extent_nodes, TemplateParams, TileMode};

/// A resolved request layer with its positional style token.
#[derive(Debug, Clone)]
pub struct RequestedLayer<'a> {
    /// Name as written in the request, used in WMS templates
    pub token: String,
    pub layer: &'a PublishedLayer,
    /// Style token; empty selects the default style
    pub style: String,
}

/// Inputs of [`compose_extents`].
#[derive(Debug, Clone)]
pub struct ExtentContext<'a> {
    pub layers: Vec<RequestedLayer<'a>>,
    pub tcrs: &'a TiledCrs,
    /// Effective multi-extent flag, see [`effective_multi_extent`]
    pub multi_extent: bool,
    /// Service base URL with trailing slash
    pub base: String,
    pub image_format: &'a str,
    pub language: Option<&'a str>,
}

/// The multi-extent flag in effect for a request.
///
/// The first requested layer group declaring an override decides; without
/// one the service setting applies.
pub fn effective_multi_extent(layers: &[RequestedLayer<'_>], service_flag: bool) -> bool {
    layers
        .iter()
        .filter(|l| l.layer.is_group())
        .find_map(|l| l.layer.multi_extent)
        .unwrap_or(service_flag)
}

/// Compose the body extents of a MapML document.
pub fn compose_extents(ctx: &ExtentContext<'_>) -> MapmlResult<Vec<Extent>> {
    let zooms = ctx
        .layers
        .iter()
        .map(|l| layer_zoom(ctx.tcrs, l))
        .collect::<MapmlResult<Vec<_>>>()?;

    match ctx.layers.as_slice() {
        [] => Err(MapmlError::MissingParameter("LAYERS".to_string())),
        [single] => Ok(vec![single_layer_extent(ctx, single, zooms[0], true)]),
        layers if ctx.multi_extent => {
            debug!(extents = layers.len(), tcrs = %ctx.tcrs.id, "Composing multi-extent document");
            Ok(layers
                .iter()
                .zip(zooms)
                .map(|(layer, zoom)| single_layer_extent(ctx, layer, zoom, false))
                .collect())
        }
        layers => Ok(vec![combined_extent(ctx, layers)]),
    }
}

/// Zoom range of a layer under its effective style.
fn layer_zoom(tcrs: &TiledCrs, requested: &RequestedLayer<'_>) -> MapmlResult<ZoomRange> {
    let style = requested
        .layer
        .effective_style(&requested.style)
        .map_err(|style| MapmlError::StyleNotDefined {
            layer: requested.layer.name.clone(),
            style: style.to_string(),
        })?;
    Ok(resolve_zoom(tcrs, style.and_then(|s| s.scale_range.as_ref())))
}

fn tile_mode(layer: &PublishedLayer, tcrs: &TiledCrs) -> TileMode {
    if !layer.use_tiles {
        TileMode::Image
    } else if layer.has_cached_gridset(tcrs.id) {
        TileMode::Wmts
    } else {
        TileMode::WmsTiles
    }
}

fn single_layer_extent(
    ctx: &ExtentContext<'_>,
    requested: &RequestedLayer<'_>,
    zoom: ZoomRange,
    alone: bool,
) -> Extent {
    let layer = requested.layer;
    let params = TemplateParams {
        base: ctx.base.clone(),
        tcrs: ctx.tcrs,
        layers: requested.token.clone(),
        query_layers: layer.queryable.then(|| requested.token.clone()),
        styles: requested.style.clone(),
        wmts_layer: layer.qualified_name(),
        mode: tile_mode(layer, ctx.tcrs),
        zoom,
        image_format: ctx.image_format,
        language: ctx.language,
        sharding: layer.active_sharding(),
    };

    Extent {
        units: ctx.tcrs.id,
        label: (!alone).then(|| layer.name.clone()),
        checked: true,
        hidden: alone,
        nodes: build_extent_nodes(&params),
    }
}

fn combined_extent(ctx: &ExtentContext<'_>, layers: &[RequestedLayer<'_>]) -> Extent {
    let names: Vec<&str> = layers.iter().map(|l| l.token.as_str()).collect();
    let queryable: Vec<&str> = layers
        .iter()
        .filter(|l| l.layer.queryable)
        .map(|l| l.token.as_str())
        .collect();

    let styles = if layers.iter().all(|l| l.style.is_empty()) {
        String::new()
    } else {
        layers
            .iter()
            .map(|l| l.style.as_str())
            .collect::<Vec<_>>()
            .join(",")
    };

    let tiled: Vec<&str> = layers
        .iter()
        .filter(|l| l.layer.use_tiles)
        .map(|l| l.token.as_str())
        .collect();
    if !tiled.is_empty() {
        debug!(layers = ?tiled, "Tiles disabled for combined extent");
    }

    let params = TemplateParams {
        base: ctx.base.clone(),
        tcrs: ctx.tcrs,
        layers: names.join(","),
        query_layers: (!queryable.is_empty()).then(|| queryable.join(",")),
        styles,
        wmts_layer: names.join(","),
        mode: TileMode::Image,
        zoom: ZoomRange::native(ctx.tcrs),
        image_format: ctx.image_format,
        language: ctx.language,
        sharding: common_sharding(layers),
    };

    Extent {
        units: ctx.tcrs.id,
        label: None,
        checked: true,
        hidden: true,
        nodes: build_extent_nodes(&params),
    }
}

/// Sharding shared by every layer, or `None` when any layer differs.
fn common_sharding<'a>(layers: &[RequestedLayer<'a>]) -> Option<&'a ShardConfig> {
    let (first, rest) = layers.split_first()?;
    let shards = first.layer.active_sharding()?;
    rest.iter()
        .all(|l| l.layer.active_sharding() == Some(shards))
        .then_some(shards)
}
