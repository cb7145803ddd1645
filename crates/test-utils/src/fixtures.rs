//! Common test fixtures for MapML tests.
//!
//! The layer set mirrors a small demo catalog: plain vector layers, a
//! layer with scale-dependent styles, a tiled layer with a tile cache, a
//! sharded layer and a layer group.

use mapml_common::{
    BoundingBox, LayerStyle, PublishedLayer, ScaleRange, ShardConfig, TcrsId,
};

/// Common bounding box definitions for testing.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Full OSMTILE extent in EPSG:3857 metres
    pub const OSMTILE_WORLD: (f64, f64, f64, f64) = (
        -20037508.342789244,
        -20037508.342789244,
        20037508.342789244,
        20037508.342789244,
    );

    /// Contiguous United States in EPSG:3857 metres
    pub const CONUS_MERCATOR: (f64, f64, f64, f64) =
        (-13885038.0, 2870337.0, -7455049.0, 6338174.0);

    /// Around Ottawa in EPSG:3857 metres
    pub const OTTAWA_MERCATOR: (f64, f64, f64, f64) =
        (-8460000.0, 5680000.0, -8390000.0, 5710000.0);

    /// Southern ocean, outside the polar and Lambert domains
    pub const ANTARCTIC: (f64, f64, f64, f64) = (-60.0, -80.0, 60.0, -60.0);
}

/// Common layer identifiers for testing.
pub mod layers {
    pub const POLYGONS: &str = "Polygons";
    pub const BASIC_POLYGONS: &str = "BasicPolygons";
    pub const LAKES: &str = "Lakes";
    pub const ROAD_SEGMENTS: &str = "RoadSegments";
    pub const TILED: &str = "Bridges";
    pub const SHARDED: &str = "Forests";
    pub const LAYER_GROUP: &str = "layerGroup";
    pub const MULTI_EXTENT_GROUP: &str = "waterGroup";
}

/// Common style names for testing.
pub mod styles {
    pub const POLYGON: &str = "polygon";
    /// Visible between 1:17,000 and 1:17,500,000
    pub const SCALE_RANGE: &str = "scaleRange";
}

/// Common CRS parameter values.
pub mod crs {
    pub const EPSG_4326: &str = "EPSG:4326";
    pub const EPSG_3857: &str = "EPSG:3857";
    pub const CRS_84: &str = "CRS:84";
    pub const MAPML_OSMTILE: &str = "MapML:OSMTILE";
    pub const MAPML_CBMTILE: &str = "MapML:CBMTILE";
    pub const MAPML_APSTILE: &str = "MapML:APSTILE";
    pub const MAPML_WGS84: &str = "MapML:WGS84";
    /// A projected CRS with no registered TCRS
    pub const UTM_32N: &str = "EPSG:32632";
}

/// Shard servers used by the sharded fixture layer.
pub const SHARD_LIST: &str = "server1,server2,server3";

/// Server pattern used by the sharded fixture layer.
pub const SHARD_SERVER_PATTERN: &str = "{s}.example.com";

fn bbox_of(b: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(b.0, b.1, b.2, b.3)
}

fn in_workspace(layer: PublishedLayer, workspace: &str) -> PublishedLayer {
    PublishedLayer {
        workspace: Some(workspace.to_string()),
        ..layer
    }
}

/// Polygons with a default style and a scale-limited style.
pub fn polygons() -> PublishedLayer {
    PublishedLayer {
        styles: vec![
            LayerStyle::new(styles::POLYGON),
            LayerStyle::new(styles::SCALE_RANGE)
                .with_scale_range(ScaleRange::new(Some(17_000.0), Some(17_500_000.0))),
        ],
        default_style: Some(styles::POLYGON.to_string()),
        ..in_workspace(
            PublishedLayer::layer(layers::POLYGONS, BoundingBox::new(-1.0, 0.0, 1.0, 1.0)),
            "cgf",
        )
    }
}

pub fn basic_polygons() -> PublishedLayer {
    in_workspace(
        PublishedLayer::layer(layers::BASIC_POLYGONS, BoundingBox::new(-2.0, -1.0, 2.0, 6.0)),
        "cite",
    )
}

pub fn lakes() -> PublishedLayer {
    PublishedLayer {
        title: Some("Lakes".to_string()),
        ..in_workspace(
            PublishedLayer::layer(
                layers::LAKES,
                BoundingBox::new(0.0006, -0.0018, 0.0031, -0.0001),
            ),
            "cite",
        )
    }
}

/// A non-queryable layer.
pub fn road_segments() -> PublishedLayer {
    PublishedLayer {
        queryable: false,
        ..in_workspace(
            PublishedLayer::layer(
                layers::ROAD_SEGMENTS,
                BoundingBox::new(-0.0042, -0.0024, 0.0, 0.0),
            ),
            "cite",
        )
    }
}

/// Tiled layer with a tile cache in OSMTILE and WGS84.
pub fn tiled() -> PublishedLayer {
    PublishedLayer {
        use_tiles: true,
        cached_gridsets: vec![TcrsId::OsmTile, TcrsId::Wgs84],
        ..in_workspace(
            PublishedLayer::layer(layers::TILED, BoundingBox::new(0.0, 0.0, 0.001, 0.001)),
            "cite",
        )
    }
}

pub fn sharded() -> PublishedLayer {
    PublishedLayer {
        sharding: Some(ShardConfig::from_list(true, SHARD_LIST, SHARD_SERVER_PATTERN)),
        ..in_workspace(
            PublishedLayer::layer(layers::SHARDED, BoundingBox::new(-0.003, -0.0015, 0.0, 0.0)),
            "cite",
        )
    }
}

/// Queryable layer group over BasicPolygons and Lakes with world bounds.
pub fn layer_group() -> PublishedLayer {
    PublishedLayer::group(
        layers::LAYER_GROUP,
        vec![layers::BASIC_POLYGONS.to_string(), layers::LAKES.to_string()],
        bbox_of(bbox::GLOBAL),
    )
}

/// Layer group forcing multi-extent output.
pub fn multi_extent_group() -> PublishedLayer {
    PublishedLayer {
        multi_extent: Some(true),
        ..PublishedLayer::group(
            layers::MULTI_EXTENT_GROUP,
            vec![layers::LAKES.to_string(), layers::ROAD_SEGMENTS.to_string()],
            BoundingBox::new(-0.0042, -0.0024, 0.0031, 0.0),
        )
    }
}

/// Every fixture layer, in catalog order.
pub fn demo_layers() -> Vec<PublishedLayer> {
    vec![
        polygons(),
        basic_polygons(),
        lakes(),
        road_segments(),
        tiled(),
        sharded(),
        layer_group(),
        multi_extent_group(),
    ]
}
