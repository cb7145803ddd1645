//! Bounds reprojection against every registered TCRS.

use mapml_common::{BoundingBox, CrsCode, TcrsId, TcrsRegistry};
use projection::{projection_for, BoundsProjector, ProjectionError, SampledReprojector};

fn assert_near(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{}: expected {} ± {}, got {}",
        what,
        expected,
        tol,
        actual
    );
}

// ============================================================================
// World extent into each TCRS
// ============================================================================

#[test]
fn test_world_into_every_tcrs_succeeds() {
    let projector = SampledReprojector::default();
    let world = BoundingBox::world_geographic();

    for tcrs in TcrsRegistry::global().iter() {
        let out = projector.project(&world, CrsCode::Crs84, tcrs.crs);
        assert!(out.is_ok(), "{} failed: {:?}", tcrs.id, out);
        assert!(!out.unwrap().is_empty(), "{} empty", tcrs.id);
    }
}

#[test]
fn test_world_into_cbmtile_is_clipped_to_northern_area() {
    let out = SampledReprojector::default()
        .project(&BoundingBox::world_geographic(), CrsCode::Crs84, CrsCode::Epsg3978)
        .unwrap();

    assert_near(out.min_x, -8.1e6, 1.0e5, "min_x");
    assert_near(out.min_y, -3.6e6, 1.0e5, "min_y");
    assert_near(out.max_x, 8.3e6, 1.0e5, "max_x");
    assert_near(out.max_y, 1.23e7, 1.0e5, "max_y");
}

#[test]
fn test_world_alternates_fit_inside_tcrs_bounds() {
    let projector = SampledReprojector::default();
    let world = BoundingBox::world_geographic();

    for id in [TcrsId::OsmTile, TcrsId::CbmTile, TcrsId::ApsTile] {
        let tcrs = TcrsRegistry::global().get(id);
        let out = projector.project(&world, CrsCode::Crs84, tcrs.crs).unwrap();
        let tol = 1.0;
        assert!(out.min_x >= tcrs.bounds.min_x - tol, "{} {:?}", id, out);
        assert!(out.max_x <= tcrs.bounds.max_x + tol, "{} {:?}", id, out);
        assert!(out.min_y >= tcrs.bounds.min_y - tol, "{} {:?}", id, out);
        assert!(out.max_y <= tcrs.bounds.max_y + tol, "{} {:?}", id, out);
    }
}

// ============================================================================
// Projected sources
// ============================================================================

#[test]
fn test_mercator_city_bbox_to_lambert_and_back() {
    let projector = SampledReprojector::default();
    let ottawa = BoundingBox::new(-8_460_000.0, 5_650_000.0, -8_390_000.0, 5_720_000.0);

    let lcc = projector.project(&ottawa, CrsCode::Epsg3857, CrsCode::Epsg3978).unwrap();
    let (cx, cy) = lcc.center();
    assert_near(cx, 1_510_000.0, 50_000.0, "center x");
    assert_near(cy, -170_000.0, 50_000.0, "center y");

    let geo = projector.project(&lcc, CrsCode::Epsg3978, CrsCode::Epsg4326).unwrap();
    assert!(geo.contains_point(-75.6972, 45.4215), "{:?}", geo);
}

#[test]
fn test_tcrs_bounds_to_geographic() {
    let osm = TcrsRegistry::global().get(TcrsId::OsmTile);
    let geo = SampledReprojector::default()
        .project(&osm.bounds, CrsCode::Epsg3857, CrsCode::Crs84)
        .unwrap();
    assert_near(geo.min_x, -180.0, 1e-9, "min_x");
    assert_near(geo.max_x, 180.0, 1e-9, "max_x");
    assert_near(geo.max_y, 85.0511287798066, 1e-9, "max_y");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_antarctic_bbox_has_no_lambert_alternate() {
    let antarctica = BoundingBox::new(-180.0, -90.0, 180.0, -60.0);
    let err = SampledReprojector::default()
        .project(&antarctica, CrsCode::Crs84, CrsCode::Epsg3978)
        .unwrap_err();
    assert_eq!(
        err,
        ProjectionError::UnsupportedTransform {
            from: CrsCode::Crs84,
            to: CrsCode::Epsg3978,
        }
    );
}

#[test]
fn test_valid_areas() {
    assert_eq!(projection_for(CrsCode::Epsg5936).valid_area().min_y, 0.0);
    assert_eq!(projection_for(CrsCode::Epsg3978).valid_area().min_y, 19.0);
    assert_eq!(
        projection_for(CrsCode::Epsg4326).valid_area(),
        BoundingBox::world_geographic()
    );
}
