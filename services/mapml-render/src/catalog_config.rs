//! Catalog configuration loader.
//!
//! Loads the service settings, published layers and layer groups from a
//! single YAML file. Group bounds default to the union of their members.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use mapml_common::{
    BoundingBox, LayerStyle, PublishedLayer, ScaleRange, ShardConfig, TcrsId,
};
use mapml_protocol::{InMemoryCatalog, LayerCatalog, MapMlServiceConfig};

/// Service settings and catalog loaded from YAML.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub service: MapMlServiceConfig,
    pub catalog: InMemoryCatalog,
}

impl CatalogConfig {
    /// Load and validate a catalog file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid catalog file {}", path.display()))?;

        info!(
            path = %path.display(),
            entries = config.catalog.len(),
            multi_extent = config.service.multi_layer_as_multi_extent,
            "Catalog loaded"
        );
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let yaml: YamlCatalogFile = serde_yaml::from_str(contents)?;

        let mut catalog = InMemoryCatalog::new();
        for layer in yaml.layers {
            catalog.add(layer.into_published());
        }

        for group in yaml.groups {
            let bounds = match group.bbox {
                Some(b) => b.into_bbox(),
                None => member_union(&catalog, &group)?,
            };
            let mut entry = PublishedLayer::group(group.name, group.layers, bounds);
            entry.workspace = group.workspace;
            entry.title = group.title;
            entry.queryable = group.queryable;
            entry.multi_extent = group.multi_extent;
            catalog.add(entry);
        }

        catalog.validate()?;

        Ok(Self {
            service: yaml.service.unwrap_or_default(),
            catalog,
        })
    }
}

fn member_union(catalog: &InMemoryCatalog, group: &YamlGroup) -> Result<BoundingBox> {
    group
        .layers
        .iter()
        .map(|member| {
            catalog
                .get_layer(member, group.workspace.as_deref())
                .map(|l| l.bounds)
                .ok_or_else(|| {
                    anyhow!(
                        "Layer group '{}' references unknown layer '{}'",
                        group.name,
                        member
                    )
                })
        })
        .reduce(|a, b| Ok(a?.union(&b?)))
        .unwrap_or_else(|| Err(anyhow!("Layer group '{}' has no layers", group.name)))
}

// ============================================================================
// YAML Parsing Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct YamlCatalogFile {
    #[serde(default)]
    service: Option<MapMlServiceConfig>,
    #[serde(default)]
    layers: Vec<YamlLayer>,
    #[serde(default)]
    groups: Vec<YamlGroup>,
}

#[derive(Debug, Deserialize)]
struct YamlBoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl YamlBoundingBox {
    fn into_bbox(self) -> BoundingBox {
        BoundingBox::new(self.west, self.south, self.east, self.north)
    }
}

#[derive(Debug, Deserialize)]
struct YamlLayer {
    name: String,
    #[serde(default)]
    workspace: Option<String>,
    #[serde(default)]
    title: Option<String>,
    bbox: YamlBoundingBox,
    #[serde(default = "default_true")]
    queryable: bool,
    #[serde(default)]
    styles: Vec<YamlStyle>,
    #[serde(default)]
    default_style: Option<String>,
    #[serde(default)]
    use_tiles: bool,
    #[serde(default)]
    cached_gridsets: Vec<String>,
    #[serde(default)]
    sharding: Option<YamlSharding>,
    #[serde(default)]
    feature_caption: Option<String>,
}

impl YamlLayer {
    fn into_published(self) -> PublishedLayer {
        let cached_gridsets = self
            .cached_gridsets
            .iter()
            .filter_map(|name| {
                let id = TcrsId::from_name(name);
                if id.is_none() {
                    warn!(layer = %self.name, gridset = %name, "Ignoring unknown cached gridset");
                }
                id
            })
            .collect();

        PublishedLayer {
            workspace: self.workspace,
            title: self.title,
            queryable: self.queryable,
            styles: self.styles.into_iter().map(YamlStyle::into_style).collect(),
            default_style: self.default_style,
            use_tiles: self.use_tiles,
            cached_gridsets,
            sharding: self
                .sharding
                .map(|s| ShardConfig::from_list(s.enabled, &s.shards, &s.server_pattern)),
            feature_caption: self.feature_caption,
            ..PublishedLayer::layer(self.name, self.bbox.into_bbox())
        }
    }
}

#[derive(Debug, Deserialize)]
struct YamlStyle {
    name: String,
    /// Smallest scale denominator at which the style draws
    #[serde(default)]
    min_scale: Option<f64>,
    /// Largest scale denominator at which the style draws
    #[serde(default)]
    max_scale: Option<f64>,
}

impl YamlStyle {
    fn into_style(self) -> LayerStyle {
        let style = LayerStyle::new(self.name);
        let range = ScaleRange::new(self.min_scale, self.max_scale);
        if range.is_unbounded() {
            style
        } else {
            style.with_scale_range(range)
        }
    }
}

#[derive(Debug, Deserialize)]
struct YamlSharding {
    #[serde(default = "default_true")]
    enabled: bool,
    /// Comma-separated shard server names
    shards: String,
    server_pattern: String,
}

#[derive(Debug, Deserialize)]
struct YamlGroup {
    name: String,
    #[serde(default)]
    workspace: Option<String>,
    #[serde(default)]
    title: Option<String>,
    layers: Vec<String>,
    #[serde(default)]
    bbox: Option<YamlBoundingBox>,
    #[serde(default = "default_true")]
    queryable: bool,
    #[serde(default)]
    multi_extent: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = r#"
service:
  base_url: http://maps.example.org/geoserver
  multi_layer_as_multi_extent: false
layers:
  - name: Lakes
    workspace: cite
    title: Lakes
    bbox: { west: 0.0006, south: -0.0018, east: 0.0031, north: -0.0001 }
  - name: Polygons
    workspace: cgf
    bbox: { west: -1.0, south: 0.0, east: 1.0, north: 1.0 }
    default_style: polygon
    styles:
      - name: polygon
      - name: scaleRange
        min_scale: 17000
        max_scale: 17500000
    use_tiles: true
    cached_gridsets: [OSMTILE, MapML:WGS84, BOGUS]
    sharding:
      shards: "a,b"
      server_pattern: "{s}.example.com"
groups:
  - name: water
    layers: [Lakes, Polygons]
    multi_extent: true
"#;

    #[test]
    fn test_parse_catalog() {
        let config = CatalogConfig::from_yaml(CATALOG).unwrap();
        assert_eq!(config.service.base_url, "http://maps.example.org/geoserver");
        assert_eq!(config.service.image_format, "image/png");
        assert_eq!(config.catalog.len(), 3);

        let polygons = config.catalog.get_layer("cgf:Polygons", None).unwrap();
        assert_eq!(polygons.cached_gridsets, vec![TcrsId::OsmTile, TcrsId::Wgs84]);
        assert_eq!(
            polygons.get_style("scaleRange").unwrap().scale_range,
            Some(ScaleRange::new(Some(17000.0), Some(17_500_000.0)))
        );
        assert!(polygons.get_style("polygon").unwrap().scale_range.is_none());
        assert!(polygons.active_sharding().is_some());
    }

    #[test]
    fn test_group_bounds_default_to_member_union() {
        let config = CatalogConfig::from_yaml(CATALOG).unwrap();
        let water = config.catalog.get_layer("water", None).unwrap();
        assert!(water.is_group());
        assert_eq!(water.multi_extent, Some(true));
        assert_eq!(water.bounds, BoundingBox::new(-1.0, -0.0018, 1.0, 1.0));
    }

    #[test]
    fn test_unknown_group_member_is_rejected() {
        let yaml = r#"
groups:
  - name: broken
    layers: [Missing]
"#;
        let err = CatalogConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let config = CatalogConfig::load_from_file(file.path()).unwrap();
        assert!(config.catalog.get_layer("Lakes", Some("cite")).is_some());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = CatalogConfig::load_from_file("/nonexistent/catalog.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.yaml"));
    }
}
