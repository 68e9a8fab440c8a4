//! # Installation State Store
//!
//! Owns, per target, the set of installed plugin identifiers and the
//! per-(target, plugin) configuration. The dependency resolver and conflict
//! checker only read snapshots of this state; mutation happens exclusively
//! through the orchestrator (successful install commit, uninstall) and the
//! configuration update surface.
//!
//! Invariant: a [`PluginConfig`] exists for a (target, plugin) pair if and
//! only if the plugin id is a member of that target's installed set. Both
//! sides of that invariant are mutated under a single write lock, so readers
//! never observe a half-applied transition.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-(target, plugin) configuration, created with defaults exactly once at
/// successful installation completion and deleted on uninstall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Whether the plugin is enabled on its target
    pub enabled: bool,

    /// Whether the plugin should be updated automatically
    pub auto_update: bool,

    /// Opaque plugin settings
    pub settings: HashMap<String, Value>,

    /// When this configuration was last modified
    pub last_configured: SystemTime,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_update: false,
            settings: HashMap::new(),
            last_configured: SystemTime::now(),
        }
    }
}

/// Serializable snapshot of the store, used by embedders (e.g. the CLI) to
/// carry state across process invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// target -> installed plugin ids
    pub installed: HashMap<String, HashSet<String>>,
    /// target -> plugin id -> configuration
    pub configs: HashMap<String, HashMap<String, PluginConfig>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// target -> installed plugin ids
    installed: HashMap<String, HashSet<String>>,
    /// target -> plugin id -> configuration
    configs: HashMap<String, HashMap<String, PluginConfig>>,
}

/// Thread-safe installation state store.
///
/// All methods take `&self`; interior mutability is a [`RwLock`] held only
/// for short, non-blocking critical sections (no await points), which gives
/// per-target linearizable mutations.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: RwLock<StoreInner>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                installed: snapshot.installed,
                configs: snapshot.configs,
            }),
        }
    }

    /// Take a serializable snapshot of the current state
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        StateSnapshot {
            installed: inner.installed.clone(),
            configs: inner.configs.clone(),
        }
    }

    /// Check whether a plugin is installed on a target
    pub fn is_installed(&self, target: &str, plugin: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .installed
            .get(target)
            .is_some_and(|set| set.contains(plugin))
    }

    /// Snapshot of the installed set for a target
    pub fn installed(&self, target: &str) -> HashSet<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.installed.get(target).cloned().unwrap_or_default()
    }

    /// Installed plugin ids with their configurations for a target
    pub fn installed_with_configs(&self, target: &str) -> Vec<(String, PluginConfig)> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<(String, PluginConfig)> = inner
            .configs
            .get(target)
            .map(|configs| {
                configs
                    .iter()
                    .map(|(id, config)| (id.clone(), config.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Get the configuration for a (target, plugin) pair, if installed
    pub fn config(&self, target: &str, plugin: &str) -> Option<PluginConfig> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .configs
            .get(target)
            .and_then(|configs| configs.get(plugin))
            .cloned()
    }

    /// Apply a mutation to an existing configuration, bumping its
    /// `last_configured` timestamp. Returns false if the pair is not
    /// installed.
    pub fn update_config<F>(&self, target: &str, plugin: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut PluginConfig),
    {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let Some(config) = inner
            .configs
            .get_mut(target)
            .and_then(|configs| configs.get_mut(plugin))
        else {
            return false;
        };
        mutate(config);
        config.last_configured = SystemTime::now();
        true
    }

    /// Atomically mark a plugin installed on a target, creating its default
    /// configuration if one does not already exist. Called only by the
    /// orchestrator on the terminal `Completed` transition.
    pub(crate) fn commit_install(&self, target: &str, plugin: &str) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner
            .installed
            .entry(target.to_string())
            .or_default()
            .insert(plugin.to_string());
        inner
            .configs
            .entry(target.to_string())
            .or_default()
            .entry(plugin.to_string())
            .or_default();
    }

    /// Atomically remove a plugin and its configuration from a target.
    /// Returns false if the plugin was not installed; state is unchanged in
    /// that case.
    pub(crate) fn remove(&self, target: &str, plugin: &str) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let removed = inner
            .installed
            .get_mut(target)
            .is_some_and(|set| set.remove(plugin));
        if removed {
            if let Some(configs) = inner.configs.get_mut(target) {
                configs.remove(plugin);
            }
        }
        removed
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
