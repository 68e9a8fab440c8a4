//! # Modhost Core
//!
//! Engine for installing plugins onto managed server instances ("targets").
//! It decides whether a plugin can legally be added to a target, computes the
//! transitive set of plugins that must also be present, detects illegal
//! configurations (cycles, missing dependencies, conflicting plugins), and
//! drives a multi-step asynchronous install lifecycle whose progress is
//! observable by any number of subscribers.
//!
//! The plugin catalog, persisted configuration storage, and all transport
//! concerns are external collaborators; the engine only consumes a read-only
//! [`catalog::PluginCatalog`] and owns the in-memory installation state.

pub mod catalog;
pub mod conflict;
pub mod error;
pub mod event;
pub mod installer;
pub mod resolver;
pub mod store;

// Re-export key public types for the binary and embedders
pub use catalog::{MemoryCatalog, PluginCatalog, PluginDescriptor};
pub use conflict::{ConflictDirection, ConflictReport};
pub use error::{EngineError, Result};
pub use event::{InstallEvent, ProgressBroadcaster};
pub use installer::{InstallStep, InstallationId, InstallationRecord, Installer, StepRunner};
pub use store::{PluginConfig, StateSnapshot, StateStore};
