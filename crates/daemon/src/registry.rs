// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Datapath plugins currently visible on the system, keyed by URI scheme.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use ss_core::PluginMetadata;
use ss_script::{run_script, Kind, ScriptDir};

#[derive(Serialize)]
struct QueryCall<'a> {
    dbg: &'a str,
}

/// The datapath-plugin registry: scheme → advertised feature set.
///
/// Populated by the datapath watcher; may be a strict subset of the
/// datapath plugin directory, since a plugin whose `Plugin.Query` fails
/// is silently not registered.
#[derive(Debug)]
pub struct DatapathRegistry {
    scripts: ScriptDir,
    plugins: Mutex<HashMap<String, Vec<String>>>,
}

impl DatapathRegistry {
    pub fn new(scripts: ScriptDir) -> Self {
        DatapathRegistry { scripts, plugins: Mutex::new(HashMap::new()) }
    }

    /// Query the plugin and record its capabilities. Failure leaves the
    /// registry untouched: the plugin is effectively invisible.
    pub async fn register(&self, name: &str) {
        let script = self.scripts.script(Kind::Datapath, name, "Plugin.Query");
        let cwd = self.scripts.plugin_dir(Kind::Datapath, name);

        match run_script::<_, PluginMetadata>(&script, &cwd, &QueryCall { dbg: "register" }).await {
            Ok(meta) => {
                info!(datapath = name, features = ?meta.features, "datapath plugin registered");
                self.plugins.lock().insert(name.to_string(), meta.features);
            }
            Err(e) => {
                debug!(datapath = name, error = %e, "Plugin.Query failed; plugin not registered")
            }
        }
    }

    pub fn unregister(&self, name: &str) {
        if self.plugins.lock().remove(name).is_some() {
            info!(datapath = name, "datapath plugin unregistered");
        }
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.plugins.lock().contains_key(scheme)
    }

    /// False when the scheme is absent or the feature is not advertised.
    pub fn supports(&self, scheme: &str, feature: &str) -> bool {
        self.plugins.lock().get(scheme).is_some_and(|features| features.iter().any(|f| f == feature))
    }

    /// The currently registered scheme names.
    pub fn names(&self) -> HashSet<String> {
        self.plugins.lock().keys().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn seed(&self, name: &str, features: &[&str]) {
        self.plugins
            .lock()
            .insert(name.to_string(), features.iter().map(|f| f.to_string()).collect());
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
