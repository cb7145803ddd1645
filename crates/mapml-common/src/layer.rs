//! Published layer and layer-group metadata consumed by the MapML builder.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, TcrsId};

/// Scale denominators between which a style draws.
///
/// Follows SLD semantics: the style is drawn while
/// `min_denominator <= scale < max_denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaleRange {
    #[serde(default)]
    pub min_denominator: Option<f64>,
    #[serde(default)]
    pub max_denominator: Option<f64>,
}

impl ScaleRange {
    pub fn new(min_denominator: Option<f64>, max_denominator: Option<f64>) -> Self {
        Self {
            min_denominator,
            max_denominator,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min_denominator.is_none() && self.max_denominator.is_none()
    }
}

/// A named style available on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub name: String,
    #[serde(default)]
    pub scale_range: Option<ScaleRange>,
}

impl LayerStyle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale_range: None,
        }
    }

    pub fn with_scale_range(mut self, range: ScaleRange) -> Self {
        self.scale_range = Some(range);
        self
    }
}

/// Distribution of templated requests over several host names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShardConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Values substituted for the `{s}` token, e.g. `["server1", "server2"]`
    #[serde(default)]
    pub shards: Vec<String>,
    /// Host pattern replacing the service host, e.g. `{s}.example.com`
    #[serde(default)]
    pub server_pattern: String,
}

impl ShardConfig {
    /// Parse the comma-separated shard list form used in layer metadata.
    pub fn from_list(enabled: bool, shard_list: &str, server_pattern: &str) -> Self {
        Self {
            enabled,
            shards: shard_list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            server_pattern: server_pattern.trim().to_string(),
        }
    }

    /// Sharding only applies when enabled with at least one shard and a pattern.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.shards.is_empty() && !self.server_pattern.is_empty()
    }
}

/// Whether a published entry is a single layer or a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    Layer,
    Group { members: Vec<String> },
}

/// A layer or layer group as published by the hosting server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedLayer {
    pub name: String,

    /// Owning workspace, used for qualified names ("cite:Lakes")
    #[serde(default)]
    pub workspace: Option<String>,

    /// Human-readable title; the name is used when absent
    #[serde(default)]
    pub title: Option<String>,

    pub kind: LayerKind,

    /// Bounds in lon/lat degrees
    pub bounds: BoundingBox,

    #[serde(default)]
    pub queryable: bool,

    #[serde(default)]
    pub styles: Vec<LayerStyle>,

    /// Style used when the request leaves the style token empty
    #[serde(default)]
    pub default_style: Option<String>,

    /// Emit tile links instead of a single image link
    #[serde(default)]
    pub use_tiles: bool,

    /// TCRSs for which a tile cache exists; enables WMTS tile templates
    #[serde(default)]
    pub cached_gridsets: Vec<TcrsId>,

    #[serde(default)]
    pub sharding: Option<ShardConfig>,

    /// Group-level override of the service multi-extent setting
    #[serde(default)]
    pub multi_extent: Option<bool>,

    /// Feature caption template, passed through to feature info responses
    #[serde(default)]
    pub feature_caption: Option<String>,
}

impl PublishedLayer {
    /// A queryable, untiled layer with no styles.
    pub fn layer(name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            name: name.into(),
            workspace: None,
            title: None,
            kind: LayerKind::Layer,
            bounds,
            queryable: true,
            styles: Vec::new(),
            default_style: None,
            use_tiles: false,
            cached_gridsets: Vec::new(),
            sharding: None,
            multi_extent: None,
            feature_caption: None,
        }
    }

    /// A layer group over the named members.
    pub fn group(name: impl Into<String>, members: Vec<String>, bounds: BoundingBox) -> Self {
        Self {
            kind: LayerKind::Group { members },
            ..Self::layer(name, bounds)
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { .. })
    }

    /// "workspace:name" when a workspace is set.
    pub fn qualified_name(&self) -> String {
        match &self.workspace {
            Some(ws) => format!("{}:{}", ws, self.name),
            None => self.name.clone(),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Find a style by name.
    pub fn get_style(&self, name: &str) -> Option<&LayerStyle> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// The style in effect for a request style token.
    ///
    /// An empty token selects the default style (or nothing when none is
    /// declared). `Err` carries a token naming a style the layer lacks.
    pub fn effective_style<'a>(
        &'a self,
        token: &'a str,
    ) -> Result<Option<&'a LayerStyle>, &'a str> {
        if token.is_empty() {
            return Ok(self
                .default_style
                .as_deref()
                .and_then(|name| self.get_style(name)));
        }
        self.get_style(token).map(Some).ok_or(token)
    }

    /// Active sharding configuration, if any.
    pub fn active_sharding(&self) -> Option<&ShardConfig> {
        self.sharding.as_ref().filter(|s| s.is_active())
    }

    pub fn has_cached_gridset(&self, tcrs: TcrsId) -> bool {
        self.cached_gridsets.contains(&tcrs)
    }
}
