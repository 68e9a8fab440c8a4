//! # Dependency Resolver
//!
//! Computes, for a candidate plugin and a target's installed set, the ordered
//! sequence of plugins that must be installed: a depth-first traversal of
//! declared dependencies yielding a topological order restricted to
//! not-yet-installed plugins, with the candidate itself last.
//!
//! Cycles are reported, not silently broken: the error carries the offending
//! chain from the root candidate down to the repeated identifier. Declared
//! dependencies without a catalog entry fail with the declaring plugin named.
//! The resolver is a read-only consultant; it never mutates any store.

use std::collections::HashSet;

use thiserror::Error;

use crate::catalog::PluginCatalog;

/// Error that can occur when resolving dependencies
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Dependency cycle reachable from the candidate; the chain runs from
    /// the root candidate to the repeated identifier inclusive
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    /// A declared dependency has no catalog entry
    #[error("Plugin '{declared_by}' depends on '{missing}', which is not in the catalog")]
    MissingDependency {
        declared_by: String,
        missing: String,
    },

    /// The candidate plugin itself has no catalog entry
    #[error("Plugin not found in catalog: {0}")]
    UnknownPlugin(String),
}

/// Compute the install order for `candidate` on a target whose installed set
/// is `installed`.
///
/// The returned sequence lists dependencies before the plugins that require
/// them, contains each identifier at most once, excludes already-installed
/// plugins, and ends with the candidate. A candidate with no missing
/// dependencies resolves to the single-element sequence `[candidate]`.
pub fn resolve(
    catalog: &dyn PluginCatalog,
    installed: &HashSet<String>,
    candidate: &str,
) -> Result<Vec<String>, ResolveError> {
    if !catalog.contains(candidate) {
        return Err(ResolveError::UnknownPlugin(candidate.to_string()));
    }

    let mut order = Vec::new();
    let mut resolved: HashSet<String> = HashSet::new();
    // The visiting path doubles as the reported chain on a cycle.
    let mut visiting: Vec<String> = Vec::new();
    visit(catalog, installed, candidate, &mut visiting, &mut resolved, &mut order)?;
    Ok(order)
}

fn visit(
    catalog: &dyn PluginCatalog,
    installed: &HashSet<String>,
    id: &str,
    visiting: &mut Vec<String>,
    resolved: &mut HashSet<String>,
    order: &mut Vec<String>,
) -> Result<(), ResolveError> {
    if visiting.iter().any(|v| v == id) {
        let mut chain = visiting.clone();
        chain.push(id.to_string());
        return Err(ResolveError::CircularDependency(chain));
    }
    // Recursion depth is bounded by the visiting path: a repeat is caught
    // above before the path can exceed the catalog size.
    visiting.push(id.to_string());

    let descriptor = match catalog.descriptor(id) {
        Some(d) => d,
        None => {
            // The root is checked by the caller, so a miss here always has a
            // declaring parent on the path.
            let declared_by = visiting
                .get(visiting.len().saturating_sub(2))
                .cloned()
                .unwrap_or_else(|| id.to_string());
            return Err(ResolveError::MissingDependency {
                declared_by,
                missing: id.to_string(),
            });
        }
    };

    for dep in &descriptor.dependencies {
        if installed.contains(dep) || resolved.contains(dep) {
            continue;
        }
        visit(catalog, installed, dep, visiting, resolved, order)?;
    }

    visiting.pop();
    resolved.insert(id.to_string());
    order.push(id.to_string());
    Ok(())
}
