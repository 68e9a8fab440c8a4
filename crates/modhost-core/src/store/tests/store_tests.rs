#![cfg(test)]

use serde_json::json;

use crate::store::{StateStore, StateSnapshot};

#[test]
fn test_commit_install_creates_config_once() {
    let store = StateStore::new();
    store.commit_install("server-1", "worldedit");

    assert!(store.is_installed("server-1", "worldedit"));
    let config = store.config("server-1", "worldedit").expect("config should exist");
    assert!(config.enabled);
    assert!(!config.auto_update);
    assert!(config.settings.is_empty());

    // A second commit must not reset an existing config
    assert!(store.update_config("server-1", "worldedit", |c| c.auto_update = true));
    store.commit_install("server-1", "worldedit");
    let config = store.config("server-1", "worldedit").expect("config should exist");
    assert!(config.auto_update);
}

#[test]
fn test_config_exists_iff_installed() {
    let store = StateStore::new();
    assert!(store.config("server-1", "worldedit").is_none());

    store.commit_install("server-1", "worldedit");
    assert!(store.config("server-1", "worldedit").is_some());

    assert!(store.remove("server-1", "worldedit"));
    assert!(!store.is_installed("server-1", "worldedit"));
    assert!(store.config("server-1", "worldedit").is_none());
}

#[test]
fn test_remove_not_installed_leaves_state_unchanged() {
    let store = StateStore::new();
    store.commit_install("server-1", "worldedit");

    assert!(!store.remove("server-1", "essentials"));
    assert!(!store.remove("server-2", "worldedit"));
    assert!(store.is_installed("server-1", "worldedit"));
}

#[test]
fn test_targets_are_isolated() {
    let store = StateStore::new();
    store.commit_install("server-1", "worldedit");

    assert!(!store.is_installed("server-2", "worldedit"));
    assert!(store.installed("server-2").is_empty());
    assert_eq!(store.installed("server-1").len(), 1);
}

#[test]
fn test_installed_with_configs_sorted_by_id() {
    let store = StateStore::new();
    store.commit_install("server-1", "worldedit");
    store.commit_install("server-1", "essentials");
    store.commit_install("server-1", "vault");

    let entries = store.installed_with_configs("server-1");
    let ids: Vec<&str> = entries.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["essentials", "vault", "worldedit"]);
}

#[test]
fn test_update_config_bumps_timestamp() {
    let store = StateStore::new();
    store.commit_install("server-1", "worldedit");
    let before = store.config("server-1", "worldedit").unwrap().last_configured;

    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(store.update_config("server-1", "worldedit", |c| {
        c.enabled = false;
        c.settings.insert("max-radius".to_string(), json!(64));
    }));

    let config = store.config("server-1", "worldedit").unwrap();
    assert!(!config.enabled);
    assert_eq!(config.settings.get("max-radius"), Some(&json!(64)));
    assert!(config.last_configured > before);
}

#[test]
fn test_update_config_missing_pair() {
    let store = StateStore::new();
    assert!(!store.update_config("server-1", "ghost", |c| c.enabled = false));
}

#[test]
fn test_snapshot_restores_state() {
    let store = StateStore::new();
    store.commit_install("server-1", "worldedit");
    store.update_config("server-1", "worldedit", |c| c.auto_update = true);

    let json = serde_json::to_string(&store.snapshot()).expect("snapshot serializes");
    let snapshot: StateSnapshot = serde_json::from_str(&json).expect("snapshot deserializes");
    let restored = StateStore::from_snapshot(snapshot);

    assert!(restored.is_installed("server-1", "worldedit"));
    assert!(restored.config("server-1", "worldedit").unwrap().auto_update);
}
