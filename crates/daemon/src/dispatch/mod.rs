// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation from inbound storage RPCs to script compositions.
//!
//! One [`Dispatcher`] serves one volume plugin's queue. Each recognized
//! method maps to one or more script executions whose results are
//! composed with lookups in the attached-SR index and the datapath
//! registry.

mod calls;
mod epoch;
mod query;
mod requests;
mod sr;
mod vdi;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use ss_adapters::MetricsApi;
use ss_core::SmError;
use ss_script::{run_script, Kind, ScriptDir};
use ss_storage::AttachedSrIndex;
use ss_wire::{RpcError, RpcHandler, RpcRequest, RpcResponse};

use crate::registry::DatapathRegistry;

/// Request handler bound to the queue named after one volume plugin.
pub struct Dispatcher {
    plugin: String,
    scripts: ScriptDir,
    index: Arc<AttachedSrIndex>,
    registry: Arc<DatapathRegistry>,
    metrics: Arc<dyn MetricsApi>,
}

#[async_trait]
impl RpcHandler for Dispatcher {
    async fn handle(&self, request: RpcRequest) -> RpcResponse {
        debug!(plugin = %self.plugin, method = %request.method, "dispatching");
        let id = request.id.clone();
        match self.dispatch(&request).await {
            Ok(result) => RpcResponse::ok(result, id),
            Err(e) => {
                warn!(plugin = %self.plugin, method = %request.method, error = %e, "request failed");
                RpcResponse::failure(RpcError::from(&e), id)
            }
        }
    }
}

impl Dispatcher {
    pub fn new(
        plugin: impl Into<String>,
        scripts: ScriptDir,
        index: Arc<AttachedSrIndex>,
        registry: Arc<DatapathRegistry>,
        metrics: Arc<dyn MetricsApi>,
    ) -> Self {
        Dispatcher { plugin: plugin.into(), scripts, index, registry, metrics }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    async fn dispatch(&self, request: &RpcRequest) -> Result<Value, SmError> {
        let arg = request.arg();
        match request.method.as_str() {
            "Query.query" => self.query(parse(arg)?).await,
            "Query.diagnostics" => self.diagnostics(parse(arg)?).await,

            "SR.attach" => self.sr_attach(parse(arg)?).await,
            "SR.detach" => self.sr_detach(parse(arg)?).await,
            "SR.probe" => self.sr_probe(parse(arg)?).await,
            "SR.create" => self.sr_create(parse(arg)?).await,
            "SR.set_name_label" => self.sr_set_name_label(parse(arg)?).await,
            "SR.set_name_description" => self.sr_set_name_description(parse(arg)?).await,
            "SR.destroy" => self.sr_destroy(parse(arg)?).await,
            "SR.scan" => self.sr_scan(parse(arg)?).await,
            "SR.stat" => self.sr_stat(parse(arg)?).await,

            "VDI.create" => self.vdi_create(parse(arg)?).await,
            "VDI.destroy" => self.vdi_destroy(parse(arg)?).await,
            "VDI.snapshot" => self.vdi_snapshot(parse(arg)?).await,
            "VDI.clone" => self.vdi_clone(parse(arg)?).await,
            "VDI.set_name_label" => self.vdi_set_name_label(parse(arg)?).await,
            "VDI.set_name_description" => self.vdi_set_name_description(parse(arg)?).await,
            "VDI.resize" => self.vdi_resize(parse(arg)?).await,
            "VDI.stat" => self.vdi_stat(parse(arg)?).await,
            "VDI.introduce" => self.vdi_introduce(parse(arg)?).await,
            "VDI.attach" => self.vdi_attach(parse(arg)?).await,
            "VDI.activate" => self.vdi_activate(parse(arg)?).await,
            "VDI.deactivate" => self.vdi_deactivate(parse(arg)?).await,
            "VDI.detach" => self.vdi_detach(parse(arg)?).await,
            "VDI.epoch_begin" => self.vdi_epoch_begin(parse(arg)?).await,
            "VDI.epoch_end" => self.vdi_epoch_end(parse(arg)?).await,
            "VDI.set_persistent" => self.vdi_set_persistent(parse(arg)?).await,

            method => Err(SmError::Unimplemented(method.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Script plumbing
    // ------------------------------------------------------------------

    async fn volume_call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, SmError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let script = self.scripts.script(Kind::Volume, &self.plugin, operation);
        let cwd = self.scripts.plugin_dir(Kind::Volume, &self.plugin);
        run_script(&script, &cwd, request).await
    }

    async fn datapath_call<Req, Resp>(
        &self,
        datapath: &str,
        operation: &str,
        request: &Req,
    ) -> Result<Resp, SmError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let script = self.scripts.script(Kind::Datapath, datapath, operation);
        let cwd = self.scripts.plugin_dir(Kind::Datapath, datapath);
        run_script(&script, &cwd, request).await
    }
}

fn parse<T: DeserializeOwned>(arg: Value) -> Result<T, SmError> {
    serde_json::from_value(arg).map_err(SmError::internal)
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, SmError> {
    serde_json::to_value(value).map_err(SmError::internal)
}

#[cfg(test)]
mod dispatch_tests;
