//! # Plugin Catalog
//!
//! Read-only source of plugin metadata. The engine never mutates the catalog;
//! it only looks up [`PluginDescriptor`] entries to resolve dependencies and
//! detect conflicts. Implementations are injected into the engine, so tests
//! and embedders can supply isolated catalog instances.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata describing a single plugin, as declared in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Unique identifier for the plugin
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Plugin version string (opaque to this engine; no range solving)
    pub version: String,

    /// Identifiers of plugins this plugin requires. Declaration order is
    /// irrelevant; duplicates are tolerated.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Identifiers of plugins this plugin declares itself incompatible with
    #[serde(default)]
    pub conflicts: Vec<String>,

    /// Capability names this plugin provides
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl PluginDescriptor {
    /// Create a new descriptor with no dependencies, conflicts, or capabilities
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// Add a dependency on another plugin
    pub fn with_dependency(mut self, id: &str) -> Self {
        self.dependencies.push(id.to_string());
        self
    }

    /// Declare a conflict with another plugin
    pub fn with_conflict(mut self, id: &str) -> Self {
        self.conflicts.push(id.to_string());
        self
    }

    /// Declare a provided capability
    pub fn with_capability(mut self, name: &str) -> Self {
        self.capabilities.push(name.to_string());
        self
    }
}

/// Read-only lookup interface the engine consumes.
///
/// The catalog requires no locking from the engine's perspective; lookups
/// return owned descriptors.
pub trait PluginCatalog: Send + Sync {
    /// Get the descriptor for a plugin id, if the catalog knows it
    fn descriptor(&self, id: &str) -> Option<PluginDescriptor>;

    /// Check whether a plugin id exists in the catalog
    fn contains(&self, id: &str) -> bool {
        self.descriptor(id).is_some()
    }

    /// Resolve a plugin id to its display name, falling back to the id for
    /// unknown entries
    fn display_name(&self, id: &str) -> String {
        self.descriptor(id)
            .map(|d| d.name)
            .unwrap_or_else(|| id.to_string())
    }
}

/// HashMap-backed catalog implementation.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    plugins: HashMap<String, PluginDescriptor>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Insert a descriptor, replacing any previous entry with the same id
    pub fn insert(&mut self, descriptor: PluginDescriptor) {
        self.plugins.insert(descriptor.id.clone(), descriptor);
    }

    /// Number of plugins known to the catalog
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Iterate over all descriptors in the catalog
    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.values()
    }
}

impl FromIterator<PluginDescriptor> for MemoryCatalog {
    fn from_iter<I: IntoIterator<Item = PluginDescriptor>>(iter: I) -> Self {
        let mut catalog = MemoryCatalog::new();
        for descriptor in iter {
            catalog.insert(descriptor);
        }
        catalog
    }
}

impl PluginCatalog for MemoryCatalog {
    fn descriptor(&self, id: &str) -> Option<PluginDescriptor> {
        self.plugins.get(id).cloned()
    }

    fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
