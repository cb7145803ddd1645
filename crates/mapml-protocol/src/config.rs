//! Request-scoped MapML service settings.

use serde::{Deserialize, Serialize};

/// Default image format of image and tile templates.
pub const DEFAULT_IMAGE_FORMAT: &str = "image/png";

/// Service-level MapML settings, resolved once and passed by reference into
/// every document build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMlServiceConfig {
    /// Public base URL of the map server, e.g. `http://localhost:8080/geoserver/`
    pub base_url: String,

    /// Render a multi-layer request as one extent per layer
    #[serde(default)]
    pub multi_layer_as_multi_extent: bool,

    /// Image format used in image and tile templates
    #[serde(default = "default_image_format")]
    pub image_format: String,
}

fn default_image_format() -> String {
    DEFAULT_IMAGE_FORMAT.to_string()
}

impl Default for MapMlServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/geoserver/".to_string(),
            multi_layer_as_multi_extent: false,
            image_format: default_image_format(),
        }
    }
}

impl MapMlServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_multi_extent(mut self, enabled: bool) -> Self {
        self.multi_layer_as_multi_extent = enabled;
        self
    }

    /// Base URL with a trailing slash, scoped to a workspace when given.
    pub fn service_base(&self, workspace: Option<&str>) -> String {
        let mut base = self.base_url.trim_end_matches('/').to_string();
        base.push('/');
        if let Some(ws) = workspace.filter(|ws| !ws.is_empty()) {
            base.push_str(ws);
            base.push('/');
        }
        base
    }
}
