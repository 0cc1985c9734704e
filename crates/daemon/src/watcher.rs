// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin discovery: two identical directory-watch loops, one per plugin
//! kind, feeding register/unregister into a [`PluginSink`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use ss_adapters::MetricsApi;
use ss_script::ScriptDir;
use ss_storage::AttachedSrIndex;
use ss_wire::Service;

use crate::dispatch::Dispatcher;
use crate::registry::DatapathRegistry;

/// Errors from a watch loop.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The event stream ended; the daemon cannot observe plugins anymore.
    #[error("plugin watch stream ended")]
    Eof,

    #[error("failed to watch {0}: {1}")]
    Watch(PathBuf, notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumer of plugin appearance/disappearance. Register of a present
/// name and unregister of an absent name are no-ops.
#[async_trait]
pub trait PluginSink: Send + Sync {
    async fn register(&self, name: &str);
    async fn unregister(&self, name: &str);
    fn registered(&self) -> HashSet<String>;
}

#[async_trait]
impl<T: PluginSink + ?Sized> PluginSink for Arc<T> {
    async fn register(&self, name: &str) {
        (**self).register(name).await
    }

    async fn unregister(&self, name: &str) {
        (**self).unregister(name).await
    }

    fn registered(&self) -> HashSet<String> {
        (**self).registered()
    }
}

/// Sink for volume plugins: each one gets a switch queue served by its
/// own [`Dispatcher`]. The server map is uniquely owned here.
pub struct VolumeSink {
    scripts: ScriptDir,
    switch_dir: PathBuf,
    index: Arc<AttachedSrIndex>,
    registry: Arc<DatapathRegistry>,
    metrics: Arc<dyn MetricsApi>,
    servers: Mutex<HashMap<String, Service>>,
}

impl VolumeSink {
    pub fn new(
        scripts: ScriptDir,
        switch_dir: impl Into<PathBuf>,
        index: Arc<AttachedSrIndex>,
        registry: Arc<DatapathRegistry>,
        metrics: Arc<dyn MetricsApi>,
    ) -> Self {
        VolumeSink {
            scripts,
            switch_dir: switch_dir.into(),
            index,
            registry,
            metrics,
            servers: Mutex::new(HashMap::new()),
        }
    }

    /// Shut down every bound queue service (graceful daemon shutdown).
    pub async fn shutdown_all(&self) {
        let servers: Vec<Service> = {
            let mut map = self.servers.lock();
            map.drain().map(|(_, service)| service).collect()
        };
        for service in servers {
            service.shutdown().await;
        }
    }
}

#[async_trait]
impl PluginSink for VolumeSink {
    async fn register(&self, name: &str) {
        if self.servers.lock().contains_key(name) {
            return;
        }
        let dispatcher = Arc::new(Dispatcher::new(
            name,
            self.scripts.clone(),
            Arc::clone(&self.index),
            Arc::clone(&self.registry),
            Arc::clone(&self.metrics),
        ));
        match ss_wire::bind(&self.switch_dir, name, dispatcher).await {
            Ok(service) => {
                info!(plugin = name, "volume plugin registered");
                self.servers.lock().insert(name.to_string(), service);
            }
            Err(e) => error!(plugin = name, error = %e, "failed to bind plugin queue"),
        }
    }

    async fn unregister(&self, name: &str) {
        let service = self.servers.lock().remove(name);
        if let Some(service) = service {
            service.shutdown().await;
            info!(plugin = name, "volume plugin unregistered");
        }
    }

    fn registered(&self) -> HashSet<String> {
        self.servers.lock().keys().cloned().collect()
    }
}

/// Sink for datapath plugins: delegates to the registry.
pub struct DatapathSink {
    registry: Arc<DatapathRegistry>,
}

impl DatapathSink {
    pub fn new(registry: Arc<DatapathRegistry>) -> Self {
        DatapathSink { registry }
    }
}

#[async_trait]
impl PluginSink for DatapathSink {
    async fn register(&self, name: &str) {
        self.registry.register(name).await;
    }

    async fn unregister(&self, name: &str) {
        self.registry.unregister(name);
    }

    fn registered(&self) -> HashSet<String> {
        self.registry.names()
    }
}

/// One finite-state watch loop over a plugin directory.
pub struct PluginWatcher<S> {
    dir: PathBuf,
    sink: S,
}

impl<S: PluginSink> PluginWatcher<S> {
    pub fn new(dir: impl Into<PathBuf>, sink: S) -> Self {
        PluginWatcher { dir: dir.into(), sink }
    }

    /// Initial scan, then event consumption. Returns [`WatchError::Eof`]
    /// when the event stream ends; any other error is retriable by the
    /// supervisor.
    pub async fn run(&self) -> Result<(), WatchError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let (tx, mut rx) = mpsc::channel::<Result<notify::Event, notify::Error>>(256);
        let mut watcher = notify::recommended_watcher(move |result| {
            // Runs on notify's own thread
            let _ = tx.blocking_send(result);
        })
        .map_err(|e| WatchError::Watch(self.dir.clone(), e))?;
        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Watch(self.dir.clone(), e))?;

        self.rescan().await?;

        while let Some(event) = rx.recv().await {
            match event {
                Ok(event) if event.need_rescan() => {
                    warn!(dir = %self.dir.display(), "watch queue overflowed; rescanning");
                    self.rescan().await?;
                }
                Ok(event) => self.apply(event).await?,
                Err(e) => {
                    // Reconcile rather than guess what was missed
                    warn!(dir = %self.dir.display(), error = %e, "watch error; rescanning");
                    self.rescan().await?;
                }
            }
        }

        Err(WatchError::Eof)
    }

    async fn apply(&self, event: notify::Event) -> Result<(), WatchError> {
        match event.kind {
            EventKind::Create(_) => {
                for path in &event.paths {
                    if path.is_dir() {
                        self.register_path(path).await;
                    }
                }
            }
            EventKind::Remove(_) => {
                for path in &event.paths {
                    self.unregister_path(path).await;
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                for path in &event.paths {
                    self.unregister_path(path).await;
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                for path in &event.paths {
                    self.register_path(path).await;
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                // paths = [from, to]
                if let [from, to] = event.paths.as_slice() {
                    self.unregister_path(from).await;
                    self.register_path(to).await;
                } else {
                    self.rescan().await?;
                }
            }
            // Other modifications inside a plugin directory are not
            // lifecycle events.
            _ => {}
        }
        Ok(())
    }

    async fn register_path(&self, path: &Path) {
        if let Some(name) = plugin_name(path) {
            self.sink.register(&name).await;
        }
    }

    async fn unregister_path(&self, path: &Path) {
        if let Some(name) = plugin_name(path) {
            self.sink.unregister(&name).await;
        }
    }

    /// Reconcile the sink against the directory: register what is needed
    /// but absent, unregister what is present but no longer needed.
    pub(crate) async fn rescan(&self) -> Result<(), WatchError> {
        let mut desired = HashSet::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = match tokio::fs::metadata(entry.path()).await {
                Ok(meta) => meta,
                Err(_) => continue, // entry vanished mid-scan
            };
            if !meta.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                desired.insert(name.to_string());
            }
        }

        let (to_add, to_remove) = reconcile(&self.sink.registered(), &desired);
        for name in to_remove {
            self.sink.unregister(&name).await;
        }
        for name in to_add {
            self.sink.register(&name).await;
        }
        Ok(())
    }
}

fn plugin_name(path: &Path) -> Option<String> {
    path.file_name()?.to_str().map(String::from)
}

/// The symmetric set difference driving reconciliation.
pub(crate) fn reconcile(
    current: &HashSet<String>,
    desired: &HashSet<String>,
) -> (Vec<String>, Vec<String>) {
    let mut to_add: Vec<String> = desired.difference(current).cloned().collect();
    let mut to_remove: Vec<String> = current.difference(desired).cloned().collect();
    to_add.sort();
    to_remove.sort();
    (to_add, to_remove)
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
