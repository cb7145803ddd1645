//! The shipped demo catalog loads and renders.

use std::path::PathBuf;

use mapml_render::{render_query, CatalogConfig, OutputKind};

fn demo_catalog() -> CatalogConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/catalog.yaml");
    CatalogConfig::load_from_file(path).unwrap()
}

// ============================================================================
// Demo catalog
// ============================================================================

#[test]
fn test_demo_catalog_loads() {
    let config = demo_catalog();
    assert_eq!(config.catalog.len(), 8);
    assert!(!config.service.multi_layer_as_multi_extent);
}

#[test]
fn test_group_override_in_demo_catalog() {
    let out = render_query(
        &demo_catalog(),
        "SERVICE=WMS&REQUEST=GetMap&LAYERS=waterGroup,Polygons&CRS=EPSG:3857&WIDTH=256&HEIGHT=256",
        None,
        Some(OutputKind::Mapml),
    )
    .unwrap();
    assert_eq!(out.body.matches("<map-extent ").count(), 2);
    assert!(!out.body.contains(r#"hidden="hidden""#));
}

#[test]
fn test_every_tcrs_renders() {
    let config = demo_catalog();
    for crs in ["MapML:WGS84", "MapML:OSMTILE", "MapML:CBMTILE", "MapML:APSTILE"] {
        let query = format!(
            "SERVICE=WMS&REQUEST=GetMap&LAYERS=layerGroup&CRS={}&WIDTH=256&HEIGHT=256",
            crs
        );
        let out = render_query(&config, &query, None, None);
        assert!(out.is_ok(), "{} failed: {:?}", crs, out);
    }
}

#[test]
fn test_full_url_is_accepted() {
    let out = render_query(
        &demo_catalog(),
        "http://localhost:8080/geoserver/wms?service=wms&request=GetMap&layers=Lakes\
         &crs=MapML%3AOSMTILE&width=256&height=256&format=text%2Fhtml",
        None,
        None,
    )
    .unwrap();
    assert_eq!(out.content_type, "text/html; subtype=mapml");
    assert!(out.body.contains("cite/wms?LAYERS=Lakes"));
}
