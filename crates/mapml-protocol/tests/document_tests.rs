//! End-to-end document builds against the demo catalog.

use std::sync::atomic::{AtomicUsize, Ordering};

use mapml_common::{AxisOrder, BoundingBox, MapmlResult, PublishedLayer, TcrsId};
use mapml_protocol::{
    parse_query_string, Extent, InMemoryCatalog, InputType, LayerCatalog, LinkRel, MapMlDocument,
    MapMlDocumentBuilder, MapMlRequest, MapMlServiceConfig, Meta,
};
use test_utils::fixtures::{self, layers, styles};
use test_utils::{assert_approx_eq, assert_bbox_approx_eq};

fn build_with(config: &MapMlServiceConfig, request: &MapMlRequest) -> MapmlResult<MapMlDocument> {
    let catalog = InMemoryCatalog::from_layers(fixtures::demo_layers());
    MapMlDocumentBuilder::new(&catalog, config).build(request)
}

fn build(request: &MapMlRequest) -> MapMlDocument {
    build_with(&MapMlServiceConfig::default(), request).unwrap()
}

fn conus() -> BoundingBox {
    let (a, b, c, d) = fixtures::bbox::CONUS_MERCATOR;
    BoundingBox::new(a, b, c, d)
}

fn query_value(href: &str, key: &str) -> Option<String> {
    parse_query_string(href)
        .unwrap()
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

fn alternate_bbox(doc: &MapMlDocument, id: TcrsId) -> Option<BoundingBox> {
    doc.head_links(LinkRel::Alternate)
        .find(|l| l.projection == Some(id))
        .and_then(|l| l.href.as_deref())
        .and_then(|href| query_value(href, "bbox"))
        .map(|bbox| BoundingBox::from_bbox_param(&bbox, AxisOrder::XY).unwrap())
}

// ============================================================================
// Head
// ============================================================================

#[test]
fn test_single_layer_head() {
    let doc = build(&MapMlRequest::new(&[layers::LAKES], TcrsId::OsmTile, 150, 150));

    assert_eq!(doc.title(), "Lakes");
    assert_eq!(doc.head.base, "http://localhost:8080/geoserver/wms");
    assert!(doc.head.metas.contains(&Meta::named("projection", "OSMTILE")));
    assert!(doc.head.metas.contains(&Meta::named("cs", "pcrs")));
    assert!(doc.head.metas.contains(&Meta::HttpEquiv {
        http_equiv: "Content-Type".to_string(),
        content: "text/mapml;projection=OSMTILE".to_string(),
    }));
    assert_eq!(doc.head_links(LinkRel::SelfStyle).count(), 1);
}

#[test]
fn test_workspace_scopes_base_url() {
    let doc = build(
        &MapMlRequest::new(&[layers::LAKES], TcrsId::OsmTile, 150, 150).with_workspace("cite"),
    );
    assert_eq!(doc.head.base, "http://localhost:8080/geoserver/cite/wms");
}

#[test]
fn test_geographic_extent_meta() {
    let request = MapMlRequest::new(&[layers::BASIC_POLYGONS], TcrsId::Wgs84, 150, 150)
        .with_bbox(BoundingBox::new(-10.0, -5.0, 10.0, 5.0));
    let doc = build(&request);

    assert!(doc.head.metas.contains(&Meta::named("cs", "gcrs")));
    assert!(doc.head.metas.contains(&Meta::named(
        "extent",
        "top-left-longitude=-10,top-left-latitude=5,bottom-right-longitude=10,bottom-right-latitude=-5"
    )));
}

#[test]
fn test_unknown_layer_is_layer_not_defined() {
    let err = build_with(
        &MapMlServiceConfig::default(),
        &MapMlRequest::new(&["Rivers"], TcrsId::OsmTile, 150, 150),
    )
    .unwrap_err();
    assert_eq!(err.exception_code(), "LayerNotDefined");
    assert_eq!(err.to_string(), "Could not find layer Rivers");
}

// ============================================================================
// Self and alternate links
// ============================================================================

#[test]
fn test_self_link_reflects_request() {
    let request = MapMlRequest::new(
        &[layers::LAYER_GROUP, layers::POLYGONS],
        TcrsId::OsmTile,
        150,
        150,
    )
    .with_bbox(conus());
    let doc = build(&request);

    let href = doc
        .head_links(LinkRel::SelfStyle)
        .next()
        .and_then(|l| l.href.clone())
        .unwrap();
    assert!(href.contains("layers=layerGroup%2CPolygons&"));
    assert_eq!(query_value(&href, "layers").as_deref(), Some("layerGroup,Polygons"));
    assert_eq!(query_value(&href, "crs").as_deref(), Some("MapML:OSMTILE"));
    assert_eq!(query_value(&href, "width").as_deref(), Some("150"));
    assert_eq!(query_value(&href, "height").as_deref(), Some("150"));

    let bbox = query_value(&href, "bbox").unwrap();
    assert_eq!(
        BoundingBox::from_bbox_param(&bbox, AxisOrder::XY).unwrap(),
        conus()
    );
}

#[test]
fn test_world_alternates_from_wgs84() {
    let request = MapMlRequest::new(&[layers::BASIC_POLYGONS], TcrsId::Wgs84, 150, 150)
        .with_bbox(BoundingBox::world_geographic());
    let doc = build(&request);

    assert_eq!(doc.head_links(LinkRel::Alternate).count(), 3);

    let osm = alternate_bbox(&doc, TcrsId::OsmTile).unwrap();
    assert_bbox_approx_eq!(
        osm,
        (-2.0e7, -2.0e7, 2.0e7, 2.0e7),
        1.0e6
    );

    let aps = alternate_bbox(&doc, TcrsId::ApsTile).unwrap();
    assert_approx_eq!(aps.min_x, -1.0e7, 1.0e6);
    assert_approx_eq!(aps.max_x, 1.4e7, 1.0e6);

    let cbm = alternate_bbox(&doc, TcrsId::CbmTile).unwrap();
    assert_bbox_approx_eq!(cbm, (-8.1e6, -3.6e6, 8.3e6, 1.23e7), 1.0e5);
}

#[test]
fn test_southern_bounds_have_no_polar_alternates() {
    let request = MapMlRequest::new(&[layers::BASIC_POLYGONS], TcrsId::OsmTile, 150, 150)
        .with_bbox(BoundingBox::new(-1.0e6, -8.0e6, 1.0e6, -6.0e6));
    let doc = build(&request);

    let projections: Vec<TcrsId> = doc
        .head_links(LinkRel::Alternate)
        .filter_map(|l| l.projection)
        .collect();
    assert_eq!(projections, vec![TcrsId::Wgs84]);
}

// ============================================================================
// Extents
// ============================================================================

#[test]
fn test_single_layer_extent_is_hidden() {
    let doc = build(&MapMlRequest::new(&[layers::LAKES], TcrsId::OsmTile, 150, 150));

    assert_eq!(doc.extents().len(), 1);
    let extent = &doc.extents()[0];
    assert!(extent.hidden);
    assert!(extent.checked);
    assert!(extent.label.is_none());
    assert_eq!(extent.units, TcrsId::OsmTile);
}

#[test]
fn test_multi_layer_combined_extent() {
    let request = MapMlRequest::new(
        &[layers::LAYER_GROUP, layers::POLYGONS],
        TcrsId::OsmTile,
        150,
        150,
    );
    let doc = build(&request);

    assert_eq!(doc.extents().len(), 1);
    let extent = &doc.extents()[0];
    assert!(extent.hidden);

    let image = extent.links_by_rel(LinkRel::Image).next().unwrap();
    assert!(image.tref.as_deref().unwrap().contains("layers=layerGroup,Polygons&"));

    let query = extent.links_by_rel(LinkRel::Query).next().unwrap();
    assert!(query.tref.as_deref().unwrap().contains("query_layers=layerGroup,Polygons&"));
}

#[test]
fn test_combined_extent_suppresses_tiles() {
    let request = MapMlRequest::new(&[layers::TILED, layers::LAKES], TcrsId::OsmTile, 150, 150);
    let doc = build(&request);

    let extent = &doc.extents()[0];
    assert_eq!(extent.links_by_rel(LinkRel::Tile).count(), 0);
    let image = extent.links_by_rel(LinkRel::Image).next().unwrap();
    assert!(image.tref.as_deref().unwrap().contains("layers=Bridges,Lakes&"));

    let z = extent.input("z").unwrap();
    assert_eq!((z.min, z.max), (Some(0.0), Some(21.0)));
}

#[test]
fn test_multi_extent_service_setting() {
    let config = MapMlServiceConfig::default().with_multi_extent(true);
    let request = MapMlRequest::new(
        &[layers::LAYER_GROUP, layers::POLYGONS],
        TcrsId::OsmTile,
        150,
        150,
    );
    let doc = build_with(&config, &request).unwrap();

    assert_eq!(doc.extents().len(), 2);
    assert!(doc.extents().iter().all(|e| !e.hidden));
    let labels: Vec<&str> = doc
        .extents()
        .iter()
        .filter_map(|e| e.label.as_deref())
        .collect();
    assert_eq!(labels, vec!["layerGroup", "Polygons"]);
}

#[test]
fn test_group_override_enables_multi_extent() {
    let request = MapMlRequest::new(
        &[layers::MULTI_EXTENT_GROUP, layers::LAKES],
        TcrsId::OsmTile,
        150,
        150,
    );
    let doc = build(&request);
    assert_eq!(doc.extents().len(), 2);
}

fn assert_shard_nodes(extent: &Extent) {
    let lists: Vec<_> = extent.datalists().collect();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].id, "servers");
    let values: Vec<&str> = lists[0].options.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["server1", "server2", "server3"]);

    let shard_inputs: Vec<_> = extent
        .inputs()
        .filter(|i| i.shard && i.input_type == InputType::Hidden)
        .collect();
    assert_eq!(shard_inputs.len(), 1);
    assert_eq!(shard_inputs[0].name, "s");
    assert_eq!(shard_inputs[0].list.as_deref(), Some("servers"));
}

#[test]
fn test_sharded_layer_templates() {
    let doc = build(&MapMlRequest::new(&[layers::SHARDED], TcrsId::OsmTile, 150, 150));
    let extent = &doc.extents()[0];

    let trefs: Vec<&str> = extent.links().filter_map(|l| l.tref.as_deref()).collect();
    assert_eq!(trefs.len(), 2);
    for tref in &trefs {
        assert!(tref.starts_with("http://{s}.example.com/geoserver/"), "{}", tref);
    }
    assert_eq!(extent.links_by_rel(LinkRel::Image).count(), 1);
    let query = extent.links_by_rel(LinkRel::Query).next().unwrap();
    assert!(query.tref.as_deref().unwrap().contains("request=GetFeatureInfo"));

    assert_shard_nodes(extent);
}

#[test]
fn test_sharded_tiled_layer_templates() {
    let forests = PublishedLayer {
        use_tiles: true,
        ..fixtures::sharded()
    };
    let catalog = InMemoryCatalog::from_layers(vec![forests]);
    let config = MapMlServiceConfig::default();
    let request = MapMlRequest::new(&[layers::SHARDED], TcrsId::CbmTile, 150, 150);
    let doc = MapMlDocumentBuilder::new(&catalog, &config).build(&request).unwrap();
    let extent = &doc.extents()[0];

    assert_eq!(extent.links_by_rel(LinkRel::Image).count(), 0);
    let tile = extent.links_by_rel(LinkRel::Tile).next().unwrap();
    let tref = tile.tref.as_deref().unwrap();
    assert!(tref.starts_with("http://{s}.example.com/geoserver/wms?"), "{}", tref);
    assert!(tref.contains("bbox={txmin},{tymin},{txmax},{tymax}"));

    let query = extent.links_by_rel(LinkRel::Query).next().unwrap();
    assert!(query.tref.as_deref().unwrap().starts_with("http://{s}.example.com/"));

    assert_shard_nodes(extent);
}

#[test]
fn test_cached_layer_uses_wmts() {
    let doc = build(&MapMlRequest::new(&[layers::TILED], TcrsId::OsmTile, 150, 150));
    let tile = doc.extents()[0].links_by_rel(LinkRel::Tile).next().unwrap();
    let tref = tile.tref.as_deref().unwrap();
    assert!(tref.contains("gwc/service/wmts?layer=cite:Bridges&"));
    assert!(tref.contains("tilematrixset=OSMTILE&"));

    let doc = build(&MapMlRequest::new(&[layers::TILED], TcrsId::Wgs84, 150, 150));
    let tile = doc.extents()[0].links_by_rel(LinkRel::Tile).next().unwrap();
    assert!(tile.tref.as_deref().unwrap().contains("tilematrixset=WGS84&"));
}

#[test]
fn test_uncached_tiled_layer_uses_wms_tiles() {
    let doc = build(&MapMlRequest::new(&[layers::TILED], TcrsId::CbmTile, 150, 150));
    let extent = &doc.extents()[0];
    let tile = extent.links_by_rel(LinkRel::Tile).next().unwrap();
    assert!(tile.tref.as_deref().unwrap().contains("bbox={txmin},{tymin},{txmax},{tymax}"));
    assert!(extent.input("txmin").is_some());
    assert_eq!(extent.links_by_rel(LinkRel::Image).count(), 0);
}

#[test]
fn test_non_queryable_layer_has_no_query_link() {
    let doc = build(&MapMlRequest::new(&[layers::ROAD_SEGMENTS], TcrsId::OsmTile, 150, 150));
    let extent = &doc.extents()[0];
    assert_eq!(extent.links_by_rel(LinkRel::Query).count(), 0);
    assert!(extent.input("i").is_none());
}

#[test]
fn test_style_scale_range_limits_zoom() {
    let request = MapMlRequest::new(&[layers::POLYGONS], TcrsId::OsmTile, 150, 150)
        .with_styles(styles::SCALE_RANGE);
    let doc = build(&request);

    let z = doc.extents()[0].input("z").unwrap();
    assert_eq!((z.min, z.max), (Some(5.0), Some(15.0)));
    assert_eq!(z.value.as_deref(), Some("15"));
}

#[test]
fn test_unknown_style_is_style_not_defined() {
    let request = MapMlRequest::new(&[layers::POLYGONS], TcrsId::OsmTile, 150, 150)
        .with_styles("nonexistent");
    let err = build_with(&MapMlServiceConfig::default(), &request).unwrap_err();
    assert_eq!(err.exception_code(), "StyleNotDefined");
    assert_eq!(err.locator().as_deref(), Some("styles"));
}

#[test]
fn test_language_and_image_format_flow_into_templates() {
    let mut request = MapMlRequest::new(&[layers::LAKES], TcrsId::OsmTile, 150, 150)
        .with_language("fr");
    request.image_format = Some("image/jpeg".to_string());
    let doc = build(&request);

    let tref = doc.extents()[0]
        .links_by_rel(LinkRel::Image)
        .next()
        .and_then(|l| l.tref.clone())
        .unwrap();
    assert!(tref.contains("format=image/jpeg&"));
    assert!(tref.ends_with("&language=fr"));

    let href = doc
        .head_links(LinkRel::SelfStyle)
        .next()
        .and_then(|l| l.href.clone())
        .unwrap();
    assert_eq!(query_value(&href, "language").as_deref(), Some("fr"));
}

// ============================================================================
// HTML preview
// ============================================================================

/// Catalog wrapper counting layer lookups.
struct CountingCatalog {
    inner: InMemoryCatalog,
    lookups: AtomicUsize,
}

impl LayerCatalog for CountingCatalog {
    fn get_layer(&self, name: &str, workspace: Option<&str>) -> Option<&PublishedLayer> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_layer(name, workspace)
    }
}

#[test]
fn test_html_preview_resolves_each_layer_once() {
    let catalog = CountingCatalog {
        inner: InMemoryCatalog::from_layers(fixtures::demo_layers()),
        lookups: AtomicUsize::new(0),
    };
    let config = MapMlServiceConfig::default();
    let request = MapMlRequest::new(&[layers::LAKES], TcrsId::OsmTile, 150, 150);

    let html = MapMlDocumentBuilder::new(&catalog, &config)
        .build_html(&request)
        .unwrap();
    assert!(html.contains("cite/wms?LAYERS=Lakes"));
    assert_eq!(catalog.lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn test_html_preview_loads_workspace_document() {
    let catalog = InMemoryCatalog::from_layers(fixtures::demo_layers());
    let config = MapMlServiceConfig::default();
    let request = MapMlRequest::new(&[layers::LAKES], TcrsId::OsmTile, 150, 150).with_bbox(conus());

    let html = MapMlDocumentBuilder::new(&catalog, &config)
        .build_html(&request)
        .unwrap();

    assert!(html.contains("mapml-viewer.js"));
    assert!(html.contains("<title>Lakes</title>"));
    assert!(html.contains(r#"label="Lakes""#));
    assert!(html.contains(r#"src="http://localhost:8080/geoserver/cite/wms?LAYERS=Lakes&amp;"#));
    assert!(html.contains(r#"zoom="1""#));
}
