//! Read-only access to published layers and layer groups.

use mapml_common::{LayerKind, MapmlError, MapmlResult, PublishedLayer};

/// Source of layer metadata for document builds.
pub trait LayerCatalog: Send + Sync {
    /// Resolve a request layer token.
    ///
    /// `ws:name` matches a layer in that workspace. A bare name prefers a
    /// layer in `workspace` and otherwise takes the first layer so named.
    fn get_layer(&self, name: &str, workspace: Option<&str>) -> Option<&PublishedLayer>;
}

/// Catalog held in memory, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: Vec<PublishedLayer>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(entries: Vec<PublishedLayer>) -> Self {
        Self { entries }
    }

    pub fn add(&mut self, layer: PublishedLayer) {
        self.entries.push(layer);
    }

    pub fn with_layer(mut self, layer: PublishedLayer) -> Self {
        self.add(layer);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every group member names a published layer.
    pub fn validate(&self) -> MapmlResult<()> {
        for entry in &self.entries {
            if let LayerKind::Group { members } = &entry.kind {
                for member in members {
                    if self.get_layer(member, entry.workspace.as_deref()).is_none() {
                        return Err(MapmlError::InvalidConfig(format!(
                            "Layer group '{}' references unknown layer '{}'",
                            entry.name, member
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl LayerCatalog for InMemoryCatalog {
    fn get_layer(&self, name: &str, workspace: Option<&str>) -> Option<&PublishedLayer> {
        if let Some((ws, local)) = name.split_once(':') {
            return self
                .entries
                .iter()
                .find(|l| l.name == local && l.workspace.as_deref() == Some(ws));
        }

        let mut candidates = self.entries.iter().filter(|l| l.name == name);
        match workspace {
            Some(ws) => self
                .entries
                .iter()
                .find(|l| l.name == name && l.workspace.as_deref() == Some(ws))
                .or_else(|| candidates.next()),
            None => candidates.next(),
        }
    }
}
