//! # Modhost Core Engine Errors
//!
//! Defines [`EngineError`], the primary enum encompassing errors surfaced by
//! the installation engine: unknown plugins, double installs, dependency
//! resolution failures, conflicts, and illegal lifecycle operations.
//!
//! Validation errors are returned synchronously from
//! [`Installer::begin_install`](crate::installer::Installer::begin_install)
//! and create no installation record; errors occurring during step
//! advancement surface only through the terminal `Failed` event. No error
//! here is globally fatal.

use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::conflict::ConflictReport;
use crate::installer::{InstallStep, InstallationId};
use crate::resolver::ResolveError;

#[derive(Debug, ThisError)]
pub enum EngineError {
    /// The plugin identifier has no catalog entry, or is not installed where
    /// an installed plugin was expected (uninstall).
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Plugin '{plugin}' is already installed on target '{target}'")]
    AlreadyInstalled { target: String, plugin: String },

    /// At most one in-flight installation attempt exists per (target, plugin)
    /// pair; a second request while one is active is rejected with this.
    #[error("Installation already in progress for plugin '{plugin}' on target '{target}'")]
    InstallationInProgress { target: String, plugin: String },

    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("Plugin '{declared_by}' depends on '{missing}', which is not in the catalog")]
    MissingDependency { declared_by: String, missing: String },

    #[error("{} conflict(s) detected: {}", .reports.len(), format_reports(.reports))]
    ConflictDetected { reports: Vec<ConflictReport> },

    #[error("No installation with id {0}")]
    NoSuchInstallation(InstallationId),

    #[error("Installation can only be cancelled before steps begin (current step: {current})")]
    IllegalCancellation { current: InstallStep },
}

fn format_reports(reports: &[ConflictReport]) -> String {
    reports
        .iter()
        .map(|r| r.reason.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ResolveError> for EngineError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::CircularDependency(chain) => EngineError::CircularDependency { chain },
            ResolveError::MissingDependency { declared_by, missing } => {
                EngineError::MissingDependency { declared_by, missing }
            }
            ResolveError::UnknownPlugin(id) => EngineError::PluginNotFound(id),
        }
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, EngineError>;
