#![cfg(test)]

use std::collections::HashSet;

use crate::catalog::{MemoryCatalog, PluginDescriptor};
use crate::conflict::{ConflictDirection, check};

fn installed(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_no_conflicts() {
    let catalog: MemoryCatalog = [
        PluginDescriptor::new("x", "Plugin X", "1.0.0"),
        PluginDescriptor::new("y", "Plugin Y", "1.0.0"),
    ]
    .into_iter()
    .collect();

    let candidate = catalog.iter().find(|d| d.id == "y").cloned().unwrap();
    assert!(check(&catalog, &installed(&["x"]), &candidate).is_empty());
}

#[test]
fn test_direct_conflict() {
    // Candidate y declares a conflict with installed x; x declares nothing
    let catalog: MemoryCatalog = [
        PluginDescriptor::new("x", "Plugin X", "1.0.0"),
        PluginDescriptor::new("y", "Plugin Y", "1.0.0").with_conflict("x"),
    ]
    .into_iter()
    .collect();

    let candidate = PluginDescriptor::new("y", "Plugin Y", "1.0.0").with_conflict("x");
    let reports = check(&catalog, &installed(&["x"]), &candidate);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].plugin_id, "x");
    assert_eq!(reports[0].plugin_name, "Plugin X");
    assert_eq!(reports[0].direction, ConflictDirection::Direct);
    assert!(reports[0].reason.contains("Plugin Y"));
}

#[test]
fn test_reverse_conflict() {
    // Installed x declares a conflict with candidate y; y declares nothing
    let catalog: MemoryCatalog = [
        PluginDescriptor::new("x", "Plugin X", "1.0.0").with_conflict("y"),
        PluginDescriptor::new("y", "Plugin Y", "1.0.0"),
    ]
    .into_iter()
    .collect();

    let candidate = PluginDescriptor::new("y", "Plugin Y", "1.0.0");
    let reports = check(&catalog, &installed(&["x"]), &candidate);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].plugin_id, "x");
    assert_eq!(reports[0].direction, ConflictDirection::Reverse);
    assert!(reports[0].reason.contains("Plugin X"));
}

#[test]
fn test_symmetric_declarations_report_both_directions() {
    let catalog: MemoryCatalog = [
        PluginDescriptor::new("x", "Plugin X", "1.0.0").with_conflict("y"),
        PluginDescriptor::new("y", "Plugin Y", "1.0.0").with_conflict("x"),
    ]
    .into_iter()
    .collect();

    let candidate = PluginDescriptor::new("y", "Plugin Y", "1.0.0").with_conflict("x");
    let reports = check(&catalog, &installed(&["x"]), &candidate);

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().any(|r| r.direction == ConflictDirection::Direct));
    assert!(reports.iter().any(|r| r.direction == ConflictDirection::Reverse));
}

#[test]
fn test_declared_conflict_with_uninstalled_plugin_is_ignored() {
    let catalog: MemoryCatalog = [
        PluginDescriptor::new("x", "Plugin X", "1.0.0"),
        PluginDescriptor::new("y", "Plugin Y", "1.0.0").with_conflict("z"),
        PluginDescriptor::new("z", "Plugin Z", "1.0.0"),
    ]
    .into_iter()
    .collect();

    let candidate = PluginDescriptor::new("y", "Plugin Y", "1.0.0").with_conflict("z");
    assert!(check(&catalog, &installed(&["x"]), &candidate).is_empty());
}

#[test]
fn test_direct_conflict_name_falls_back_to_id() {
    // Installed plugin absent from the catalog still gets reported by id
    let catalog: MemoryCatalog = [PluginDescriptor::new("y", "Plugin Y", "1.0.0")]
        .into_iter()
        .collect();

    let candidate = PluginDescriptor::new("y", "Plugin Y", "1.0.0").with_conflict("legacy");
    let reports = check(&catalog, &installed(&["legacy"]), &candidate);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].plugin_name, "legacy");
}
