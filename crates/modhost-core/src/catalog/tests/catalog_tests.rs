#![cfg(test)]

use crate::catalog::{MemoryCatalog, PluginCatalog, PluginDescriptor};

#[test]
fn test_descriptor_builder() {
    let descriptor = PluginDescriptor::new("worldedit", "WorldEdit", "7.2.0")
        .with_dependency("worldguard")
        .with_conflict("fast-async-worldedit")
        .with_capability("region-editing");

    assert_eq!(descriptor.id, "worldedit");
    assert_eq!(descriptor.name, "WorldEdit");
    assert_eq!(descriptor.dependencies, vec!["worldguard"]);
    assert_eq!(descriptor.conflicts, vec!["fast-async-worldedit"]);
    assert_eq!(descriptor.capabilities, vec!["region-editing"]);
}

#[test]
fn test_memory_catalog_lookup() {
    let catalog: MemoryCatalog = [
        PluginDescriptor::new("a", "Plugin A", "1.0.0"),
        PluginDescriptor::new("b", "Plugin B", "2.0.0"),
    ]
    .into_iter()
    .collect();

    assert_eq!(catalog.len(), 2);
    assert!(catalog.contains("a"));
    assert!(!catalog.contains("c"));
    let b = catalog.descriptor("b");
    assert_eq!(b.map(|d| d.name), Some("Plugin B".to_string()));
    assert!(catalog.descriptor("c").is_none());
}

#[test]
fn test_display_name_falls_back_to_id() {
    let catalog: MemoryCatalog = [PluginDescriptor::new("a", "Plugin A", "1.0.0")]
        .into_iter()
        .collect();

    assert_eq!(catalog.display_name("a"), "Plugin A");
    assert_eq!(catalog.display_name("ghost"), "ghost");
}

#[test]
fn test_insert_replaces_existing_entry() {
    let mut catalog = MemoryCatalog::new();
    catalog.insert(PluginDescriptor::new("a", "Old Name", "1.0.0"));
    catalog.insert(PluginDescriptor::new("a", "New Name", "1.1.0"));

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.display_name("a"), "New Name");
}

#[test]
fn test_descriptor_json_defaults() {
    // Omitted list fields deserialize as empty
    let descriptor: PluginDescriptor =
        serde_json::from_str(r#"{"id":"a","name":"Plugin A","version":"1.0.0"}"#)
            .expect("descriptor should deserialize");
    assert!(descriptor.dependencies.is_empty());
    assert!(descriptor.conflicts.is_empty());
    assert!(descriptor.capabilities.is_empty());
}
