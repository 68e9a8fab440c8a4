use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info};

use modhost_core::installer::DelayRunner;
use modhost_core::{
    EngineError, InstallEvent, Installer, MemoryCatalog, PluginDescriptor, StateSnapshot,
    StateStore,
};

/// Modhost: plugin installation manager for game server instances
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Path to the plugin catalog (JSON array of descriptors)
    #[arg(long, default_value = "catalog.json")]
    catalog: PathBuf,

    /// Path to the installation state file; created if missing
    #[arg(long, default_value = "state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed plugins and their configurations for a target
    List { target: String },
    /// Preview the install order for a plugin on a target
    Plan { target: String, plugin: String },
    /// Preview conflicts for a plugin on a target
    Conflicts { target: String, plugin: String },
    /// Install a plugin (and its not-yet-installed dependencies) on a target
    Install {
        target: String,
        plugin: String,
        /// Skip dependency resolution and conflict checking
        #[arg(long)]
        skip_checks: bool,
        /// Milliseconds spent on each lifecycle step
        #[arg(long, default_value_t = 250)]
        step_interval_ms: u64,
    },
    /// Uninstall a plugin from a target
    Uninstall { target: String, plugin: String },
}

fn init_logging() {
    // Bridge log-facade records from modhost-core into tracing
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize log bridge: {}", e);
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn load_catalog(path: &Path) -> Result<MemoryCatalog, String> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read catalog '{}': {}", path.display(), e))?;
    let descriptors: Vec<PluginDescriptor> = serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse catalog '{}': {}", path.display(), e))?;
    Ok(descriptors.into_iter().collect())
}

fn load_state(path: &Path) -> Result<StateStore, String> {
    if !path.exists() {
        return Ok(StateStore::new());
    }
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read state '{}': {}", path.display(), e))?;
    let snapshot: StateSnapshot = serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse state '{}': {}", path.display(), e))?;
    Ok(StateStore::from_snapshot(snapshot))
}

fn save_state(path: &Path, store: &StateStore) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&store.snapshot())
        .map_err(|e| format!("Failed to serialize state: {}", e))?;
    std::fs::write(path, json)
        .map_err(|e| format!("Failed to write state '{}': {}", path.display(), e))
}

/// Run one installation attempt to its terminal event, printing progress
async fn install_one(engine: &Installer, target: &str, plugin: &str, skip: bool) -> Result<(), String> {
    let mut events = engine.subscribe();
    let id = engine
        .begin_install(target, plugin, skip)
        .await
        .map_err(|e| e.to_string())?;

    loop {
        let event = events
            .recv()
            .await
            .map_err(|e| format!("Event stream closed: {}", e))?;
        if event.installation_id() != Some(id) {
            continue;
        }
        match &event {
            InstallEvent::Step { step, progress, .. } => {
                println!("  [{:>3}%] {}", progress, step);
            }
            InstallEvent::Completed { .. } => {
                println!("  installed '{}' on '{}'", plugin, target);
                return Ok(());
            }
            InstallEvent::Failed { step, error, .. } => {
                return Err(format!("install of '{}' failed at {}: {}", plugin, step, error));
            }
            InstallEvent::Cancelled { .. } => {
                return Err(format!("install of '{}' was cancelled", plugin));
            }
            InstallEvent::Uninstalled { .. } => {}
        }
    }
}

async fn run(args: CliArgs) -> Result<(), String> {
    let catalog = Arc::new(load_catalog(&args.catalog)?);
    let store = Arc::new(load_state(&args.state)?);

    match args.command {
        Commands::List { target } => {
            let engine = Installer::new(catalog, store);
            let installed = engine.installed_plugins(&target);
            if installed.is_empty() {
                println!("No plugins installed on '{}'", target);
            } else {
                println!("Plugins installed on '{}':", target);
                for (id, config) in installed {
                    println!(
                        "  {} (enabled: {}, auto-update: {})",
                        id, config.enabled, config.auto_update
                    );
                }
            }
        }
        Commands::Plan { target, plugin } => {
            let engine = Installer::new(catalog, store);
            let plan = engine
                .dependency_plan(&target, &plugin)
                .map_err(|e| e.to_string())?;
            println!("Install order for '{}' on '{}':", plugin, target);
            for (i, id) in plan.iter().enumerate() {
                println!("  {}. {}", i + 1, id);
            }
        }
        Commands::Conflicts { target, plugin } => {
            let engine = Installer::new(catalog, store);
            let reports = engine
                .conflicts(&target, &plugin)
                .map_err(|e| e.to_string())?;
            if reports.is_empty() {
                println!("No conflicts for '{}' on '{}'", plugin, target);
            } else {
                for report in reports {
                    println!("  [{}] {}", report.direction, report.reason);
                }
            }
        }
        Commands::Install {
            target,
            plugin,
            skip_checks,
            step_interval_ms,
        } => {
            let runner = Arc::new(DelayRunner::new(Duration::from_millis(step_interval_ms)));
            let engine = Installer::with_runner(catalog, store, runner);

            // The engine installs exactly the requested plugin; walking the
            // resolved plan installs missing dependencies first.
            let plan = if skip_checks {
                vec![plugin.clone()]
            } else {
                engine
                    .dependency_plan(&target, &plugin)
                    .map_err(|e| e.to_string())?
            };
            if plan.len() > 1 {
                info!("installing {} plugins: {}", plan.len(), plan.join(", "));
            }
            for id in &plan {
                println!("Installing '{}' on '{}'...", id, target);
                install_one(&engine, &target, id, skip_checks).await?;
            }
            save_state(&args.state, engine.store())?;
        }
        Commands::Uninstall { target, plugin } => {
            let engine = Installer::new(catalog, store);
            match engine.uninstall(&target, &plugin).await {
                Ok(()) => {
                    println!("Uninstalled '{}' from '{}'", plugin, target);
                    save_state(&args.state, engine.store())?;
                }
                Err(EngineError::PluginNotFound(_)) => {
                    return Err(format!("'{}' is not installed on '{}'", plugin, target));
                }
                Err(e) => return Err(e.to_string()),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = CliArgs::parse();
    if let Err(message) = run(args).await {
        error!("{}", message);
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}
