//! # Conflict Checker
//!
//! Detects incompatibilities between a candidate plugin and a target's
//! currently installed set. Two directions are checked and reported
//! separately, since they have different causes: the candidate declaring a
//! conflict with an installed plugin (direct), and an installed plugin
//! declaring a conflict with the candidate (reverse). Declarations may be
//! one-directional, but the check is always bidirectional in effect.
//!
//! Like the resolver, this is a read-only consultant over the catalog and an
//! installed-set snapshot.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::catalog::{PluginCatalog, PluginDescriptor};

/// Which side declared the incompatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictDirection {
    /// The candidate's conflict set names an installed plugin
    Direct,
    /// An installed plugin's conflict set names the candidate
    Reverse,
}

impl fmt::Display for ConflictDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictDirection::Direct => write!(f, "direct"),
            ConflictDirection::Reverse => write!(f, "reverse"),
        }
    }
}

/// A single detected incompatibility with an installed plugin
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    /// Identifier of the conflicting installed plugin
    pub plugin_id: String,
    /// Display name of the conflicting plugin, resolved via the catalog
    pub plugin_name: String,
    /// Which side declared the conflict
    pub direction: ConflictDirection,
    /// Human-readable reason
    pub reason: String,
}

/// Check a candidate against a target's installed set.
///
/// An empty result means no conflicts. Both directions are reported, one
/// [`ConflictReport`] per conflicting installed plugin per direction.
pub fn check(
    catalog: &dyn PluginCatalog,
    installed: &HashSet<String>,
    candidate: &PluginDescriptor,
) -> Vec<ConflictReport> {
    let mut reports = Vec::new();

    // Direct: candidate declares a conflict with something installed
    for declared in &candidate.conflicts {
        if installed.contains(declared) {
            let name = catalog.display_name(declared);
            reports.push(ConflictReport {
                plugin_id: declared.clone(),
                plugin_name: name.clone(),
                direction: ConflictDirection::Direct,
                reason: format!(
                    "'{}' declares a conflict with installed plugin '{}'",
                    candidate.name, name
                ),
            });
        }
    }

    // Reverse: an installed plugin declares a conflict with the candidate
    for installed_id in installed {
        let Some(descriptor) = catalog.descriptor(installed_id) else {
            continue;
        };
        if descriptor.conflicts.iter().any(|c| c == &candidate.id) {
            reports.push(ConflictReport {
                plugin_id: installed_id.clone(),
                plugin_name: descriptor.name.clone(),
                direction: ConflictDirection::Reverse,
                reason: format!(
                    "installed plugin '{}' declares a conflict with '{}'",
                    descriptor.name, candidate.name
                ),
            });
        }
    }

    reports
}

// Test module declaration
#[cfg(test)]
mod tests;
