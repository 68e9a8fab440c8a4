use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

/// Identifier of a single installation attempt, unique per attempt
pub type InstallationId = u64;

/// Lifecycle steps of an installation attempt.
///
/// Fixed linear path with two escape transitions: any non-terminal step may
/// transition to `Failed`, and `Requested` (only) may transition to
/// `Cancelled`. Once past `Requested`, an attempt always runs to `Completed`
/// or `Failed`; the steps it models (file extraction, service start) are not
/// abortable mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstallStep {
    Requested,
    Downloading,
    Extracting,
    Validating,
    InstallingDependencies,
    Configuring,
    Starting,
    Completed,
    Failed,
    Cancelled,
}

impl InstallStep {
    /// The next step on the linear path, or None for terminal steps
    pub fn next(self) -> Option<InstallStep> {
        match self {
            InstallStep::Requested => Some(InstallStep::Downloading),
            InstallStep::Downloading => Some(InstallStep::Extracting),
            InstallStep::Extracting => Some(InstallStep::Validating),
            InstallStep::Validating => Some(InstallStep::InstallingDependencies),
            InstallStep::InstallingDependencies => Some(InstallStep::Configuring),
            InstallStep::Configuring => Some(InstallStep::Starting),
            InstallStep::Starting => Some(InstallStep::Completed),
            InstallStep::Completed | InstallStep::Failed | InstallStep::Cancelled => None,
        }
    }

    /// Fixed progress percentage associated with this step.
    ///
    /// The escape terminals carry no progress of their own; a failed or
    /// cancelled record keeps the last value it reached.
    pub fn progress(self) -> u8 {
        match self {
            InstallStep::Requested => 0,
            InstallStep::Downloading => 10,
            InstallStep::Extracting => 30,
            InstallStep::Validating => 50,
            InstallStep::InstallingDependencies => 70,
            InstallStep::Configuring => 85,
            InstallStep::Starting => 95,
            InstallStep::Completed => 100,
            InstallStep::Failed | InstallStep::Cancelled => 0,
        }
    }

    /// Whether no further transitions occur from this step
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InstallStep::Completed | InstallStep::Failed | InstallStep::Cancelled
        )
    }

    /// Step name for logging and display
    pub fn name(self) -> &'static str {
        match self {
            InstallStep::Requested => "requested",
            InstallStep::Downloading => "downloading",
            InstallStep::Extracting => "extracting",
            InstallStep::Validating => "validating",
            InstallStep::InstallingDependencies => "installing-dependencies",
            InstallStep::Configuring => "configuring",
            InstallStep::Starting => "starting",
            InstallStep::Completed => "completed",
            InstallStep::Failed => "failed",
            InstallStep::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// State of one in-flight installation attempt.
///
/// Lives in the orchestrator's active set only while the attempt is in
/// flight; retired on the terminal transition, after the terminal event has
/// been queued to all current subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct InstallationRecord {
    pub id: InstallationId,
    pub target: String,
    pub plugin: String,
    pub step: InstallStep,
    /// Monotonically non-decreasing within an attempt, 0-100
    pub progress: u8,
    pub started: SystemTime,
    pub finished: Option<SystemTime>,
    pub error: Option<String>,
}

impl InstallationRecord {
    /// Create a fresh record in the `Requested` step
    pub fn new(id: InstallationId, target: &str, plugin: &str) -> Self {
        Self {
            id,
            target: target.to_string(),
            plugin: plugin.to_string(),
            step: InstallStep::Requested,
            progress: 0,
            started: SystemTime::now(),
            finished: None,
            error: None,
        }
    }
}
