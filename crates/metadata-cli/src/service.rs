//! Startup orchestration for the `metadata-service` binary: load config,
//! load schemas, connect the backing store, register types, and run the
//! RPC/HTTP gateways and (optionally) the watcher until shutdown.
//!
//! Grounded on `schema-forge-cli::commands::serve::run`'s step-numbered
//! shape (load config -> parse schemas -> connect backend -> apply
//! schemas -> serve), adapted from a single `axum` router to this spec's
//! RPC+HTTP+watcher trio.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use metadata_backend_mem::{BackendKind, MemoryStore};
use metadata_core::{Category, SystemClock};
use metadata_schema::SchemaRegistry;
use metadata_service::api::NewType;
use metadata_service::{ApiState, MetadataApi};
use metadata_watcher::{GroupVersionKind, MetaLoggerMode, ScriptedChangeFeed};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::{self, ServiceConfig};
use crate::error::CliError;

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let file_config = config::load_config(cli.config.as_deref())?;
    let config = config::resolve(&cli, file_config);

    let backend_kind = BackendKind::parse(&config.store).ok_or_else(|| CliError::Config {
        message: format!("unknown backing-store kind '{}'", config.store),
    })?;
    backend_kind.check_implemented().map_err(|message| CliError::Config { message })?;

    info!(store = %config.store, "connecting backing store");
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(SystemClock);
    let state = ApiState::new(store, clock);
    let api = MetadataApi::new(state.clone());

    apply_schemas(&api, &config.schema_dir).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let rpc_addr: SocketAddr = format!("{}:{}", config.host, config.rpc_port)
        .parse()
        .map_err(|err| CliError::Config { message: format!("invalid RPC bind address: {err}") })?;
    let http_addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .map_err(|err| CliError::Config { message: format!("invalid HTTP bind address: {err}") })?;

    let watcher_task = if cli.watch {
        Some(spawn_watcher(api.clone(), &config, shutdown_rx.clone())?)
    } else {
        None
    };

    let shutdown_signal = tokio::spawn(wait_for_interrupt(shutdown_tx));

    info!(%rpc_addr, %http_addr, "starting metadata-service");
    metadata_service::serve(state, http_addr, rpc_addr, shutdown_rx).await?;

    if let Some(watcher_task) = watcher_task {
        let _ = watcher_task.await;
    }
    shutdown_signal.abort();

    info!("shut down cleanly");
    Ok(())
}

/// Registers every schema document under `schema_dir` as a type (spec §6,
/// the startup half of `schema-forge-cli::commands::serve::run`'s "Apply
/// parsed schemas" step). Idempotent-create (spec §9 decision 2 style):
/// a type that already exists with matching properties is left alone by
/// the store's own `put_type` semantics.
async fn apply_schemas(api: &MetadataApi, schema_dir: &Path) -> Result<(), CliError> {
    if !schema_dir.exists() {
        warn!(path = %schema_dir.display(), "schema directory does not exist; starting with an empty registry");
        return Ok(());
    }
    let registry = SchemaRegistry::load_from_dir(schema_dir)?;
    let mut registered = 0usize;
    for id in registry.ids() {
        let category = parse_category(&registry.category(id)?)?;
        let (namespace_version, kind) = registry.type_name(id)?;
        let name = format!("{namespace_version}/{kind}");
        let properties = registry.registrable_properties(id)?;
        api.create_type(category, NewType { name, properties }).await?;
        registered += 1;
    }
    info!(count = registered, path = %schema_dir.display(), "registered schema types");
    Ok(())
}

fn parse_category(raw: &str) -> Result<Category, CliError> {
    match raw {
        "artifact" => Ok(Category::Artifact),
        "execution" => Ok(Category::Execution),
        other => Err(CliError::Config { message: format!("unknown schema category '{other}'") }),
    }
}

fn spawn_watcher(
    api: MetadataApi,
    config: &ServiceConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<tokio::task::JoinHandle<()>, CliError> {
    let Some(resource_list_path) = &config.watcher.resource_list else {
        return Err(CliError::Config {
            message: "--watch requires --resource-list (or watcher.resource_list in config)".to_string(),
        });
    };
    let contents = std::fs::read_to_string(resource_list_path).map_err(|source| CliError::Io {
        path: resource_list_path.clone(),
        source,
    })?;
    let kinds = parse_resource_list(&contents)?;
    let mode = match config.watcher.metalogger_mode.as_str() {
        "artifact-centric" => MetaLoggerMode::ArtifactCentric,
        _ => MetaLoggerMode::ExecutionCentric,
    };

    info!(count = kinds.len(), ?mode, "starting resource watcher");
    let feed = ScriptedChangeFeed::new();
    // A real deployment drives `feed` from a cluster client implementing
    // `ChangeFeed`; this workspace carries the in-process fake (spec §6)
    // since no cluster client dependency is in scope for this service.
    feed.mark_synced();
    Ok(tokio::spawn(async move {
        if let Err(err) = metadata_watcher::run_watchers(&feed, api, kinds, mode, shutdown).await {
            warn!(%err, "watcher exited with an error");
        }
    }))
}

#[derive(Debug, serde::Deserialize)]
struct ResourceListEntry {
    group: String,
    version: String,
    kind: String,
}

fn parse_resource_list(contents: &str) -> Result<Vec<GroupVersionKind>, CliError> {
    let entries: Vec<ResourceListEntry> = serde_json::from_str(contents)
        .map_err(|err| CliError::Config { message: format!("invalid resource-list JSON: {err}") })?;
    Ok(entries
        .into_iter()
        .map(|entry| GroupVersionKind::new(entry.group, entry.version, entry.kind))
        .collect())
}

/// Waits for Ctrl+C (or SIGTERM on Unix) and flips the shutdown channel; a
/// second interrupt forces immediate exit (spec §6 "A second interrupt
/// signal during shutdown forces immediate exit").
async fn wait_for_interrupt(shutdown_tx: watch::Sender<bool>) {
    wait_for_first_interrupt().await;
    info!("shutdown signal received, draining");
    let _ = shutdown_tx.send(true);
    wait_for_first_interrupt().await;
    warn!("second interrupt received, forcing immediate exit");
    std::process::exit(130);
}

#[cfg(unix)]
async fn wait_for_first_interrupt() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_first_interrupt() {
    let _ = tokio::signal::ctrl_c().await;
}
