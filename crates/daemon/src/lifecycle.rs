// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon supervisor: startup checks, watcher supervision with backoff
//! restart, graceful shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use ss_adapters::{MetricsApi, SwitchMetrics};
use ss_script::{Kind, ScriptDir};
use ss_storage::{AttachedSrIndex, IndexError};
use ss_wire::queue_path;

use crate::env;
use crate::registry::DatapathRegistry;
use crate::watcher::{DatapathSink, PluginWatcher, VolumeSink, WatchError};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the `volume/` and `datapath/` plugin trees
    pub root: PathBuf,
    /// Path to the attached-SR state file
    pub state: PathBuf,
    /// Directory holding per-queue switch sockets
    pub switch_dir: PathBuf,
    /// Queue name of the metric-registration service
    pub metrics_queue: String,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("root directory {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("state file error: {0}")]
    Index(#[from] IndexError),
}

/// Run the daemon until shutdown. Returns the process exit code: 0 on a
/// clean shutdown, 1 when a watch stream ends.
pub async fn run(config: Config) -> Result<i32, LifecycleError> {
    if !config.root.is_dir() {
        return Err(LifecycleError::MissingRoot(config.root));
    }

    let index = Arc::new(AttachedSrIndex::load(&config.state)?);
    let scripts = ScriptDir::new(&config.root);
    let registry = Arc::new(DatapathRegistry::new(scripts.clone()));
    let metrics: Arc<dyn MetricsApi> =
        Arc::new(SwitchMetrics::new(queue_path(&config.switch_dir, &config.metrics_queue)));

    let volume_sink = Arc::new(VolumeSink::new(
        scripts.clone(),
        &config.switch_dir,
        Arc::clone(&index),
        Arc::clone(&registry),
        metrics,
    ));

    info!(root = %config.root.display(), "storage-script daemon starting");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        // Fresh watchers each round; registered services and datapath
        // capabilities survive the restart in the shared sinks.
        let volume_watcher =
            PluginWatcher::new(scripts.kind_dir(Kind::Volume), Arc::clone(&volume_sink));
        let datapath_watcher = PluginWatcher::new(
            scripts.kind_dir(Kind::Datapath),
            DatapathSink::new(Arc::clone(&registry)),
        );

        tokio::select! {
            result = run_watchers(&volume_watcher, &datapath_watcher) => match result {
                Err(WatchError::Eof) => {
                    error!("plugin watch stream ended; exiting");
                    return Ok(1);
                }
                Err(e) => {
                    let backoff = env::restart_backoff();
                    warn!(error = %e, "watcher failed; restarting in {:?}", backoff);
                    tokio::time::sleep(backoff).await;
                }
                Ok(()) => unreachable_watcher_exit(),
            },
            _ = &mut shutdown => {
                info!("shutdown signal received");
                volume_sink.shutdown_all().await;
                return Ok(0);
            }
        }
    }
}

/// Run both watchers until the first one fails.
async fn run_watchers<V, D>(
    volume: &PluginWatcher<V>,
    datapath: &PluginWatcher<D>,
) -> Result<(), WatchError>
where
    V: crate::watcher::PluginSink,
    D: crate::watcher::PluginSink,
{
    tokio::select! {
        result = volume.run() => result,
        result = datapath.run() => result,
    }
}

// Watcher loops only return through their error; keep the supervisor
// total anyway.
fn unreachable_watcher_exit() {
    warn!("watcher loop exited without an error; restarting");
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }
}
