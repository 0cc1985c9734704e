// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher harness driving fake plugins in a temp directory.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use ss_adapters::{FakeMetrics, MetricsApi};
use ss_script::{Kind, ScriptDir};
use ss_storage::AttachedSrIndex;
use ss_wire::{RpcHandler, RpcRequest, RpcResponse};

use crate::registry::DatapathRegistry;
use crate::test_helpers::{reply, reply_logged, volume_json, write_script};
use crate::Dispatcher;

pub(super) struct Harness {
    pub root: TempDir,
    pub plugin: String,
    pub dispatcher: Dispatcher,
    pub index: Arc<AttachedSrIndex>,
    pub registry: Arc<DatapathRegistry>,
    pub metrics: Arc<FakeMetrics>,
}

impl Harness {
    pub fn new(plugin: &str) -> Self {
        let root = TempDir::new().unwrap();
        let scripts = ScriptDir::new(root.path());
        let index =
            Arc::new(AttachedSrIndex::load(root.path().join("state.json")).unwrap());
        let registry = Arc::new(DatapathRegistry::new(scripts.clone()));
        let metrics = Arc::new(FakeMetrics::new());
        let dispatcher = Dispatcher::new(
            plugin,
            scripts,
            Arc::clone(&index),
            Arc::clone(&registry),
            Arc::clone(&metrics) as Arc<dyn MetricsApi>,
        );
        Harness {
            root,
            plugin: plugin.to_string(),
            dispatcher,
            index,
            registry,
            metrics,
        }
    }

    /// An attached harness: `sr-handle` maps to `backend-sr`.
    pub async fn attached(plugin: &str) -> Self {
        let h = Harness::new(plugin);
        h.index.add("sr-handle", "backend-sr", vec![]).await.unwrap();
        h
    }

    pub fn volume_dir(&self) -> PathBuf {
        self.root.path().join(Kind::Volume.dir()).join(&self.plugin)
    }

    pub fn datapath_dir(&self, name: &str) -> PathBuf {
        self.root.path().join(Kind::Datapath.dir()).join(name)
    }

    /// Path of the shared call log scripts append to.
    pub fn log(&self) -> PathBuf {
        self.root.path().join("calls.log")
    }

    /// Lines of the call log, empty when nothing was invoked.
    pub fn logged_calls(&self) -> Vec<String> {
        match std::fs::read_to_string(self.log()) {
            Ok(contents) => contents.lines().map(String::from).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Install a volume-plugin script that consumes the request and
    /// prints `json`.
    pub fn volume_script(&self, operation: &str, json: &str) {
        write_script(&self.volume_dir(), operation, &reply(json));
    }

    /// Install a volume-plugin script that also logs its invocation.
    pub fn volume_script_logged(&self, operation: &str, json: &str) {
        write_script(&self.volume_dir(), operation, &reply_logged(operation, &self.log(), json));
    }

    /// Install a datapath-plugin script that also logs its invocation.
    pub fn datapath_script_logged(&self, datapath: &str, operation: &str, json: &str) {
        write_script(
            &self.datapath_dir(datapath),
            operation,
            &reply_logged(operation, &self.log(), json),
        );
    }

    /// A `Volume.stat` answering per volume key, shadow-aware: requests
    /// mentioning `"key":"<shadow>"` get the shadow record.
    pub fn volume_stat_script(&self, volumes: &[(&str, String)]) {
        let mut body = String::from("req=$(cat)\ncase \"$req\" in\n");
        for (key, json) in volumes {
            body.push_str(&format!("  *'\"key\":\"{key}\"'*) printf '%s' '{json}' ;;\n"));
        }
        body.push_str("  *) echo '{\"code\":\"UNKNOWN_VOLUME\",\"params\":[]}'; exit 1 ;;\nesac");
        write_script(&self.volume_dir(), "Volume.stat", &body);
    }

    pub async fn call(&self, method: &str, arg: Value) -> RpcResponse {
        self.dispatcher.handle(RpcRequest::new(method, arg)).await
    }

    /// A standard volume record whose only URI uses `scheme`.
    pub fn volume(&self, key: &str, scheme: &str, keys: &[(&str, &str)]) -> String {
        volume_json(key, &[&format!("{scheme}://vol/{key}")], keys)
    }
}
