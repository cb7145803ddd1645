//! HTML preview page embedding a `mapml-viewer` element.

use quick_xml::escape::escape;
use tracing::warn;

use mapml_common::{BoundingBox, CrsCode, TiledCrs};
use projection::transform_point;

/// Path of the viewer script below the service base.
pub const VIEWER_SCRIPT_PATH: &str = "mapml/viewer/widget/mapml-viewer.js";

/// Inputs of [`render_html_preview`].
#[derive(Debug, Clone)]
pub struct HtmlPreview<'a> {
    pub title: &'a str,
    pub tcrs: &'a TiledCrs,
    /// Map bounds in TCRS units
    pub bounds: BoundingBox,
    pub width: u32,
    pub height: u32,
    /// URL of the MapML document the `layer-` element loads
    pub layer_src: String,
    pub viewer_script: String,
}

/// Geographic centre of `bounds`, falling back to 0,0 when it cannot be
/// transformed.
pub fn geographic_center(tcrs: &TiledCrs, bounds: &BoundingBox) -> (f64, f64) {
    let (x, y) = bounds.center();
    transform_point(x, y, tcrs.crs, CrsCode::Crs84).unwrap_or_else(|e| {
        warn!(tcrs = %tcrs.id, error = %e, "Map centre not transformable");
        (0.0, 0.0)
    })
}

pub fn render_html_preview(preview: &HtmlPreview<'_>) -> String {
    let zoom = preview
        .tcrs
        .fitting_zoom(&preview.bounds, preview.width, preview.height);
    let (lon, lat) = geographic_center(preview.tcrs, &preview.bounds);
    let title = escape(preview.title);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>{title}</title>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<script type="module" src="{script}"></script>
<style>
html, body {{ height: 100%; margin: 0; }}
mapml-viewer {{ width: 100%; height: 100%; }}
</style>
<noscript>
<style>
mapml-viewer:not(:defined) > :not(layer-) {{ display: initial; }}
</style>
</noscript>
</head>
<body>
<mapml-viewer projection="{projection}" zoom="{zoom}" lat="{lat}" lon="{lon}" controls controlslist="geolocation">
<layer- label="{title}" src="{src}" checked></layer->
</mapml-viewer>
</body>
</html>
"#,
        title = title,
        script = escape(&preview.viewer_script),
        projection = preview.tcrs.id.name(),
        zoom = zoom,
        lat = lat,
        lon = lon,
        src = escape(&preview.layer_src),
    )
}
