//! # Progress Broadcaster
//!
//! Fans installation lifecycle events out to any number of independent
//! subscribers. Each subscriber receives every event published after its
//! subscription, in publish order (per-subscriber FIFO); no ordering is
//! guaranteed across subscribers relative to wall-clock receipt. Publishing
//! is fire-and-forget: the orchestrator never waits for a subscriber, a
//! disconnected subscriber is silently dropped, and a slow subscriber that
//! overruns its buffer observes a lag marker rather than blocking the
//! publisher.

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use serde::Serialize;

use crate::installer::{InstallStep, InstallationId};

/// Default per-subscriber event buffer capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Installation lifecycle events published by the orchestrator.
///
/// The broadcaster is the source of truth for attempt outcomes: the terminal
/// event for an attempt is queued to every current subscriber before the
/// installation record is retired from the active set.
#[derive(Debug, Clone, Serialize)]
pub enum InstallEvent {
    /// An attempt entered a new lifecycle step
    Step {
        installation_id: InstallationId,
        target: String,
        plugin: String,
        step: InstallStep,
        progress: u8,
    },
    /// An attempt reached `Completed`; the store mutation has been applied
    Completed {
        installation_id: InstallationId,
        target: String,
        plugin: String,
    },
    /// An attempt failed at `step`; no store mutation was performed
    Failed {
        installation_id: InstallationId,
        target: String,
        plugin: String,
        step: InstallStep,
        error: String,
    },
    /// An attempt was cancelled before any step began
    Cancelled {
        installation_id: InstallationId,
        target: String,
        plugin: String,
    },
    /// A plugin was uninstalled from a target
    Uninstalled { target: String, plugin: String },
}

impl InstallEvent {
    /// Dotted event name, used for logging
    pub fn name(&self) -> &'static str {
        match self {
            InstallEvent::Step { .. } => "install.step",
            InstallEvent::Completed { .. } => "install.completed",
            InstallEvent::Failed { .. } => "install.failed",
            InstallEvent::Cancelled { .. } => "install.cancelled",
            InstallEvent::Uninstalled { .. } => "install.uninstalled",
        }
    }

    /// The installation attempt this event belongs to, if any
    pub fn installation_id(&self) -> Option<InstallationId> {
        match self {
            InstallEvent::Step { installation_id, .. }
            | InstallEvent::Completed { installation_id, .. }
            | InstallEvent::Failed { installation_id, .. }
            | InstallEvent::Cancelled { installation_id, .. } => Some(*installation_id),
            InstallEvent::Uninstalled { .. } => None,
        }
    }

    /// Whether this event ends an installation attempt
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InstallEvent::Completed { .. }
                | InstallEvent::Failed { .. }
                | InstallEvent::Cancelled { .. }
        )
    }
}

/// Publish/subscribe channel for [`InstallEvent`]s over a tokio broadcast
/// channel.
#[derive(Debug, Clone)]
pub struct ProgressBroadcaster {
    sender: broadcast::Sender<InstallEvent>,
}

impl ProgressBroadcaster {
    /// Create a broadcaster with the default per-subscriber buffer capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a broadcaster with an explicit per-subscriber buffer capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber; it receives every event published after
    /// this call
    pub fn subscribe(&self) -> broadcast::Receiver<InstallEvent> {
        self.sender.subscribe()
    }

    /// Register a new subscriber as a [`Stream`](tokio_stream::Stream)
    pub fn subscribe_stream(&self) -> BroadcastStream<InstallEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Number of currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event to all current subscribers. Having no subscribers is
    /// not an error.
    pub fn publish(&self, event: InstallEvent) {
        log::debug!("event {}: {:?}", event.name(), event);
        // send only fails when there are no receivers
        let _ = self.sender.send(event);
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
