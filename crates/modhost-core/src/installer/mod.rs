//! # Installation Orchestrator
//!
//! Owns the finite-state lifecycle of installation attempts. A request is
//! validated synchronously (already-installed and in-flight guards,
//! dependency resolution, conflict checking) before any state is created;
//! on success the orchestrator creates an [`InstallationRecord`], spawns an
//! advancement task, and returns the attempt id immediately. Step
//! advancement is independent of the caller; every transition publishes one
//! event through the [`ProgressBroadcaster`], which is the source of truth
//! for attempt outcomes rather than polling of the active set.
//!
//! At most one in-flight attempt exists per (target, plugin) pair; the pair
//! lock is held from record creation through the terminal transition, and
//! uninstall respects it too. Independent pairs advance in parallel.

pub mod record;
pub mod runner;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use tokio::sync::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::catalog::PluginCatalog;
use crate::conflict::{self, ConflictReport};
use crate::error::{EngineError, Result};
use crate::event::{InstallEvent, ProgressBroadcaster};
use crate::resolver;
use crate::store::{PluginConfig, StateStore};

pub use record::{InstallStep, InstallationId, InstallationRecord};
pub use runner::{DEFAULT_STEP_INTERVAL, DelayRunner, StepError, StepRunner};

/// In-flight attempts plus the per-(target, plugin) exclusion set. Guarded
/// by one mutex so pair admission and record creation are atomic.
#[derive(Debug, Default)]
struct ActiveSet {
    records: HashMap<InstallationId, InstallationRecord>,
    in_flight: HashSet<(String, String)>,
}

impl ActiveSet {
    fn retire(&mut self, id: InstallationId) {
        if let Some(record) = self.records.remove(&id) {
            self.in_flight.remove(&(record.target, record.plugin));
        }
    }
}

/// The installation engine facade.
///
/// Cheap to clone; clones share the same catalog, store, active set, and
/// broadcaster.
#[derive(Clone)]
pub struct Installer {
    catalog: Arc<dyn PluginCatalog>,
    store: Arc<StateStore>,
    broadcaster: ProgressBroadcaster,
    active: Arc<Mutex<ActiveSet>>,
    runner: Arc<dyn StepRunner>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer").finish_non_exhaustive()
    }
}

impl Installer {
    /// Create an installer over a catalog and state store, advancing steps
    /// with the default timed runner
    pub fn new(catalog: Arc<dyn PluginCatalog>, store: Arc<StateStore>) -> Self {
        Self::with_runner(catalog, store, Arc::new(DelayRunner::default()))
    }

    /// Create an installer with an explicit step runner
    pub fn with_runner(
        catalog: Arc<dyn PluginCatalog>,
        store: Arc<StateStore>,
        runner: Arc<dyn StepRunner>,
    ) -> Self {
        Self {
            catalog,
            store,
            broadcaster: ProgressBroadcaster::new(),
            active: Arc::new(Mutex::new(ActiveSet::default())),
            runner,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The installation state store this engine mutates
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Subscribe to lifecycle events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<InstallEvent> {
        self.broadcaster.subscribe()
    }

    /// Subscribe as a stream
    pub fn subscribe_stream(&self) -> BroadcastStream<InstallEvent> {
        self.broadcaster.subscribe_stream()
    }

    /// Read-only preview of the install order for a candidate, using the
    /// same algorithm as installation validation. No side effects.
    pub fn dependency_plan(&self, target: &str, plugin: &str) -> Result<Vec<String>> {
        let installed = self.store.installed(target);
        Ok(resolver::resolve(self.catalog.as_ref(), &installed, plugin)?)
    }

    /// Read-only preview of conflicts for a candidate. An empty vec means
    /// the candidate is clear.
    pub fn conflicts(&self, target: &str, plugin: &str) -> Result<Vec<ConflictReport>> {
        let descriptor = self
            .catalog
            .descriptor(plugin)
            .ok_or_else(|| EngineError::PluginNotFound(plugin.to_string()))?;
        let installed = self.store.installed(target);
        Ok(conflict::check(self.catalog.as_ref(), &installed, &descriptor))
    }

    /// Installed plugins with their configurations for a target
    pub fn installed_plugins(&self, target: &str) -> Vec<(String, PluginConfig)> {
        self.store.installed_with_configs(target)
    }

    /// Snapshot of one in-flight attempt, if it is still active
    pub async fn installation(&self, id: InstallationId) -> Option<InstallationRecord> {
        self.active.lock().await.records.get(&id).cloned()
    }

    /// Snapshots of all in-flight attempts
    pub async fn active_installations(&self) -> Vec<InstallationRecord> {
        self.active.lock().await.records.values().cloned().collect()
    }

    /// Request installation of `plugin` on `target`.
    ///
    /// Validation runs synchronously and creates no state on rejection; on
    /// success the returned id refers to an attempt whose advancement has
    /// been scheduled but not awaited. Subscribe before calling to observe
    /// every event of the attempt.
    pub async fn begin_install(
        &self,
        target: &str,
        plugin: &str,
        skip_dependency_check: bool,
    ) -> Result<InstallationId> {
        let descriptor = self
            .catalog
            .descriptor(plugin)
            .ok_or_else(|| EngineError::PluginNotFound(plugin.to_string()))?;

        let mut active = self.active.lock().await;

        if self.store.is_installed(target, plugin) {
            return Err(EngineError::AlreadyInstalled {
                target: target.to_string(),
                plugin: plugin.to_string(),
            });
        }
        let pair = (target.to_string(), plugin.to_string());
        if active.in_flight.contains(&pair) {
            return Err(EngineError::InstallationInProgress {
                target: target.to_string(),
                plugin: plugin.to_string(),
            });
        }

        if !skip_dependency_check {
            // Both validations run so a rejection carries its stage's full
            // diagnostics; resolution errors take precedence.
            let installed = self.store.installed(target);
            let resolution = resolver::resolve(self.catalog.as_ref(), &installed, plugin);
            let reports = conflict::check(self.catalog.as_ref(), &installed, &descriptor);
            resolution?;
            if !reports.is_empty() {
                return Err(EngineError::ConflictDetected { reports });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = InstallationRecord::new(id, target, plugin);
        active.in_flight.insert(pair);
        active.records.insert(id, record);
        self.broadcaster.publish(InstallEvent::Step {
            installation_id: id,
            target: target.to_string(),
            plugin: plugin.to_string(),
            step: InstallStep::Requested,
            progress: 0,
        });
        drop(active);

        log::info!("install {} of '{}' on '{}' scheduled", id, plugin, target);
        let engine = self.clone();
        tokio::spawn(async move {
            engine.drive(id).await;
        });

        Ok(id)
    }

    /// Cancel an attempt that has not yet left `Requested`.
    ///
    /// Once any step beyond `Requested` has begun, the attempt runs to a
    /// terminal state and cancellation is rejected.
    pub async fn cancel_install(&self, id: InstallationId) -> Result<()> {
        let mut active = self.active.lock().await;
        let record = active
            .records
            .get_mut(&id)
            .ok_or(EngineError::NoSuchInstallation(id))?;
        if record.step != InstallStep::Requested {
            return Err(EngineError::IllegalCancellation {
                current: record.step,
            });
        }
        record.step = InstallStep::Cancelled;
        record.finished = Some(SystemTime::now());
        let event = InstallEvent::Cancelled {
            installation_id: id,
            target: record.target.clone(),
            plugin: record.plugin.clone(),
        };
        log::info!(
            "install {} of '{}' on '{}' cancelled",
            id,
            record.plugin,
            record.target
        );
        self.broadcaster.publish(event);
        active.retire(id);
        Ok(())
    }

    /// Remove a plugin and its configuration from a target.
    ///
    /// No dependent-of-others check is made; callers wanting protection must
    /// ask whether other installed plugins depend on the one being removed.
    pub async fn uninstall(&self, target: &str, plugin: &str) -> Result<()> {
        let active = self.active.lock().await;
        let pair = (target.to_string(), plugin.to_string());
        if active.in_flight.contains(&pair) {
            return Err(EngineError::InstallationInProgress {
                target: target.to_string(),
                plugin: plugin.to_string(),
            });
        }
        if !self.store.remove(target, plugin) {
            return Err(EngineError::PluginNotFound(plugin.to_string()));
        }
        log::info!("uninstalled '{}' from '{}'", plugin, target);
        self.broadcaster.publish(InstallEvent::Uninstalled {
            target: target.to_string(),
            plugin: plugin.to_string(),
        });
        Ok(())
    }

    /// Advancement task for one attempt. Each iteration runs the next step's
    /// work through the runner, then transitions the record and publishes
    /// exactly one event. A missing record means the attempt was cancelled
    /// while still in `Requested`.
    async fn drive(&self, id: InstallationId) {
        loop {
            let (target, plugin, current) = {
                let active = self.active.lock().await;
                match active.records.get(&id) {
                    Some(record) => (record.target.clone(), record.plugin.clone(), record.step),
                    None => return,
                }
            };
            let Some(next) = current.next() else {
                return;
            };

            if let Err(err) = self.runner.run(&target, &plugin, next).await {
                self.fail(id, next, err).await;
                return;
            }

            let mut active = self.active.lock().await;
            let Some(record) = active.records.get_mut(&id) else {
                // Cancelled while the step work was running
                return;
            };
            record.step = next;
            record.progress = next.progress();

            if next == InstallStep::Completed {
                record.finished = Some(SystemTime::now());
                // Store mutation, completion event, and retirement happen
                // under the active lock: a reader never observes the record
                // gone but the store not yet updated.
                self.store.commit_install(&target, &plugin);
                self.broadcaster.publish(InstallEvent::Completed {
                    installation_id: id,
                    target: target.clone(),
                    plugin: plugin.clone(),
                });
                active.retire(id);
                log::info!("install {} of '{}' on '{}' completed", id, plugin, target);
                return;
            }

            self.broadcaster.publish(InstallEvent::Step {
                installation_id: id,
                target,
                plugin,
                step: next,
                progress: next.progress(),
            });
        }
    }

    /// Terminal `Failed` transition: no store mutation, event carries the
    /// failing step, record retired.
    async fn fail(&self, id: InstallationId, step: InstallStep, err: StepError) {
        let mut active = self.active.lock().await;
        let Some(record) = active.records.get_mut(&id) else {
            return;
        };
        record.step = InstallStep::Failed;
        record.finished = Some(SystemTime::now());
        record.error = Some(err.to_string());
        let event = InstallEvent::Failed {
            installation_id: id,
            target: record.target.clone(),
            plugin: record.plugin.clone(),
            step,
            error: err.to_string(),
        };
        log::warn!(
            "install {} of '{}' on '{}' failed at {}: {}",
            id,
            record.plugin,
            record.target,
            step,
            err
        );
        self.broadcaster.publish(event);
        active.retire(id);
    }
}
