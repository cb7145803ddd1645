//! MapML document assembly.
//!
//! Resolves request layers through the catalog, derives the document
//! bounds, builds the head (title, base, metas, self and alternate links)
//! and composes the body extents.

use tracing::{debug, warn};

use mapml_common::{
    AxisOrder, BoundingBox, CrsCode, MapmlError, MapmlResult, PublishedLayer, TcrsId,
    TcrsRegistry, TiledCrs,
};
use projection::{BoundsProjector, SampledReprojector};

use crate::catalog::LayerCatalog;
use crate::config::MapMlServiceConfig;
use crate::document::{Body, Head, Link, LinkRel, MapMlDocument, Meta};
use crate::extent::{compose_extents, effective_multi_extent, ExtentContext, RequestedLayer};
use crate::html::{render_html_preview, HtmlPreview, VIEWER_SCRIPT_PATH};
use crate::request::{MapMlRequest, MAPML_MIME_TYPE};

/// Builds MapML documents against a layer catalog.
pub struct MapMlDocumentBuilder<
    'a,
    C: LayerCatalog + ?Sized,
    P: BoundsProjector = SampledReprojector,
> {
    catalog: &'a C,
    config: &'a MapMlServiceConfig,
    registry: &'a TcrsRegistry,
    projector: P,
}

impl<'a, C: LayerCatalog + ?Sized> MapMlDocumentBuilder<'a, C, SampledReprojector> {
    pub fn new(catalog: &'a C, config: &'a MapMlServiceConfig) -> Self {
        Self {
            catalog,
            config,
            registry: TcrsRegistry::global(),
            projector: SampledReprojector::default(),
        }
    }
}

impl<'a, C: LayerCatalog + ?Sized, P: BoundsProjector> MapMlDocumentBuilder<'a, C, P> {
    /// Swap the bounds projector.
    pub fn with_projector<Q: BoundsProjector>(
        self,
        projector: Q,
    ) -> MapMlDocumentBuilder<'a, C, Q> {
        MapMlDocumentBuilder {
            catalog: self.catalog,
            config: self.config,
            registry: self.registry,
            projector,
        }
    }

    pub fn build(&self, request: &MapMlRequest) -> MapmlResult<MapMlDocument> {
        self.assemble(request).map(|assembled| assembled.doc)
    }

    /// Render the HTML preview page for `request`.
    ///
    /// The page loads the MapML document through a `layer-` element whose
    /// source is scoped to the workspace of the request, or of its only
    /// layer.
    pub fn build_html(&self, request: &MapMlRequest) -> MapmlResult<String> {
        let Assembled {
            doc,
            bounds,
            preview_workspace,
        } = self.assemble(request)?;
        let tcrs = self.registry.get(request.tcrs);
        let base = self
            .config
            .service_base(request.workspace.as_deref().or(preview_workspace));

        Ok(render_html_preview(&HtmlPreview {
            title: doc.title(),
            tcrs,
            bounds,
            width: request.width,
            height: request.height,
            layer_src: html_layer_url(&base, request, tcrs.id, &bounds),
            viewer_script: format!("{}{}", self.config.service_base(None), VIEWER_SCRIPT_PATH),
        }))
    }

    fn assemble(&self, request: &MapMlRequest) -> MapmlResult<Assembled<'a>> {
        let layers = self.resolve_layers(request)?;
        let preview_workspace = match layers.as_slice() {
            [only] => {
                let layer: &'a PublishedLayer = only.layer;
                layer.workspace.as_deref()
            }
            _ => None,
        };
        let tcrs = self.registry.get(request.tcrs);
        let bounds = self.request_bounds(request, &layers, tcrs);
        let workspace = request.workspace.as_deref();
        let base = self.config.service_base(workspace);
        let image_format = request
            .image_format
            .as_deref()
            .unwrap_or(&self.config.image_format);

        let title = layers
            .iter()
            .map(|l| l.layer.display_title())
            .collect::<Vec<_>>()
            .join(",");

        let multi_extent = effective_multi_extent(&layers, self.config.multi_layer_as_multi_extent);
        debug!(
            layers = ?request.layers,
            tcrs = %tcrs.id,
            multi_extent = multi_extent,
            "Building MapML document"
        );

        let mut links = vec![Link::reference(
            LinkRel::SelfStyle,
            mapml_url(&base, request, tcrs.id, &bounds),
            MAPML_MIME_TYPE,
        )];
        links.extend(self.alternate_links(&base, request, tcrs, &bounds));

        let head = Head {
            title,
            base: format!("{}wms", base),
            metas: head_metas(tcrs, &bounds),
            links,
        };

        let extents = compose_extents(&ExtentContext {
            layers,
            tcrs,
            multi_extent,
            base,
            image_format,
            language: request.language.as_deref(),
        })?;

        Ok(Assembled {
            doc: MapMlDocument {
                head,
                body: Body { extents },
            },
            bounds,
            preview_workspace,
        })
    }

    /// Resolve request tokens to catalog entries, pairing them with styles.
    pub fn resolve_layers(
        &self,
        request: &MapMlRequest,
    ) -> MapmlResult<Vec<RequestedLayer<'a>>> {
        request
            .layers
            .iter()
            .enumerate()
            .map(|(idx, token)| {
                let layer = self
                    .catalog
                    .get_layer(token, request.workspace.as_deref())
                    .ok_or_else(|| MapmlError::LayerNotDefined(token.clone()))?;
                Ok(RequestedLayer {
                    token: token.clone(),
                    layer,
                    style: request.styles.get(idx).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Bounds of the document in TCRS units.
    ///
    /// The request bbox when present, else the union of the layer bounds
    /// projected into the TCRS, else the TCRS bounds.
    fn request_bounds(
        &self,
        request: &MapMlRequest,
        layers: &[RequestedLayer<'_>],
        tcrs: &TiledCrs,
    ) -> BoundingBox {
        if let Some(bbox) = request.bbox {
            return bbox;
        }

        let union = layers
            .iter()
            .map(|l| l.layer.bounds)
            .reduce(|a, b| a.union(&b));

        union
            .and_then(|geo| match self.projector.project(&geo, CrsCode::Crs84, tcrs.crs) {
                Ok(projected) => projected.intersection(&tcrs.bounds),
                Err(e) => {
                    warn!(
                        tcrs = %tcrs.id,
                        error = %e,
                        "Layer bounds not projectable, using TCRS bounds"
                    );
                    None
                }
            })
            .unwrap_or(tcrs.bounds)
    }

    /// One alternate link per other registered TCRS whose bounds can be computed.
    fn alternate_links(
        &self,
        base: &str,
        request: &MapMlRequest,
        tcrs: &TiledCrs,
        bounds: &BoundingBox,
    ) -> Vec<Link> {
        alternate_bounds(&self.projector, bounds, tcrs, self.registry)
            .into_iter()
            .map(|(id, alt_bounds)| Link {
                projection: Some(id),
                ..Link::reference(
                    LinkRel::Alternate,
                    mapml_url(base, request, id, &alt_bounds),
                    MAPML_MIME_TYPE,
                )
            })
            .collect()
    }
}

/// Document plus what the HTML preview needs from the same catalog lookups.
struct Assembled<'a> {
    doc: MapMlDocument,
    bounds: BoundingBox,
    /// Workspace of the only requested layer
    preview_workspace: Option<&'a str>,
}

/// Reproject `bounds` from `source` into every other registered TCRS.
///
/// TCRSs the bounds cannot be transformed into are left out.
pub fn alternate_bounds<P: BoundsProjector + ?Sized>(
    projector: &P,
    bounds: &BoundingBox,
    source: &TiledCrs,
    registry: &TcrsRegistry,
) -> Vec<(TcrsId, BoundingBox)> {
    registry
        .iter()
        .filter(|target| target.id != source.id)
        .filter_map(|target| match projector.project(bounds, source.crs, target.crs) {
            Ok(projected) => Some((target.id, projected)),
            Err(e) => {
                warn!(
                    from = %source.id,
                    to = %target.id,
                    error = %e,
                    "Omitting alternate projection"
                );
                None
            }
        })
        .collect()
}

/// GetMap URL of the MapML rendering of `request` in `tcrs`.
pub fn mapml_url(base: &str, request: &MapMlRequest, tcrs: TcrsId, bbox: &BoundingBox) -> String {
    let mut params = vec![
        ("service", "WMS".to_string()),
        ("version", "1.3.0".to_string()),
        ("request", "GetMap".to_string()),
        ("layers", request.layers.join(",")),
        ("styles", styles_param(&request.styles)),
        ("crs", tcrs.mapml_code()),
        ("bbox", bbox.to_bbox_param(AxisOrder::XY)),
        ("format", MAPML_MIME_TYPE.to_string()),
        ("width", request.width.to_string()),
        ("height", request.height.to_string()),
    ];
    if let Some(language) = &request.language {
        params.push(("language", language.clone()));
    }
    kvp_url(&format!("{}wms", base), &params)
}

/// Upper-case KVP GetMap URL loaded by the HTML preview.
fn html_layer_url(base: &str, request: &MapMlRequest, tcrs: TcrsId, bbox: &BoundingBox) -> String {
    let mut params = vec![
        ("LAYERS", request.layers.join(",")),
        ("STYLES", styles_param(&request.styles)),
        ("CRS", tcrs.mapml_code()),
        ("BBOX", bbox.to_bbox_param(AxisOrder::XY)),
        ("WIDTH", request.width.to_string()),
        ("HEIGHT", request.height.to_string()),
        ("FORMAT", MAPML_MIME_TYPE.to_string()),
        ("SERVICE", "WMS".to_string()),
        ("VERSION", "1.3.0".to_string()),
        ("REQUEST", "GetMap".to_string()),
    ];
    if let Some(language) = &request.language {
        params.push(("LANGUAGE", language.clone()));
    }
    kvp_url(&format!("{}wms", base), &params)
}

/// Join style tokens, collapsing an all-default list to an empty value.
pub(crate) fn styles_param(styles: &[String]) -> String {
    if styles.iter().all(String::is_empty) {
        String::new()
    } else {
        styles.join(",")
    }
}

/// `{endpoint}?k=v&...` with form-encoded values.
pub(crate) fn kvp_url(endpoint: &str, params: &[(&str, String)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", endpoint, query)
}

fn head_metas(tcrs: &TiledCrs, bounds: &BoundingBox) -> Vec<Meta> {
    let (x, y) = if tcrs.crs.is_geographic() {
        ("longitude", "latitude")
    } else {
        ("easting", "northing")
    };
    let extent = format!(
        "top-left-{x}={},top-left-{y}={},bottom-right-{x}={},bottom-right-{y}={}",
        bounds.min_x,
        bounds.max_y,
        bounds.max_x,
        bounds.min_y,
        x = x,
        y = y
    );

    vec![
        Meta::Charset {
            charset: "utf-8".to_string(),
        },
        Meta::HttpEquiv {
            http_equiv: "Content-Type".to_string(),
            content: format!("{};projection={}", MAPML_MIME_TYPE, tcrs.id),
        },
        Meta::named("projection", tcrs.id.name()),
        Meta::named("cs", tcrs.coordinate_system()),
        Meta::named("extent", extent),
    ]
}
