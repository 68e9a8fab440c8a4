use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time;

use crate::installer::record::InstallStep;

/// Default interval the built-in runner spends on each lifecycle step
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(250);

/// Failure of a single lifecycle step
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StepError {
    pub message: String,
}

impl StepError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Performs the work of one lifecycle step for an installation attempt.
///
/// The orchestrator calls the runner once per step, off the caller's thread,
/// and transitions the record only after the runner returns. A runner error
/// drives the attempt to its `Failed` terminal. Implementations are injected
/// at construction, so tests can exercise failure paths deterministically.
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run(&self, target: &str, plugin: &str, step: InstallStep) -> Result<(), StepError>;
}

/// Default runner: spends a fixed interval per step and always succeeds,
/// giving the timer-driven advancement callers observe in production.
pub struct DelayRunner {
    interval: Duration,
}

impl DelayRunner {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for DelayRunner {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_INTERVAL)
    }
}

impl fmt::Debug for DelayRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayRunner")
            .field("interval", &self.interval)
            .finish()
    }
}

#[async_trait]
impl StepRunner for DelayRunner {
    async fn run(&self, _target: &str, _plugin: &str, _step: InstallStep) -> Result<(), StepError> {
        time::sleep(self.interval).await;
        Ok(())
    }
}
