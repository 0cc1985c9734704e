// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metric-registration service contract.
//!
//! Data sources discovered in `SR.stat` output are published as local
//! plugins of the metric daemon, which scrapes them on a fixed cadence.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use ss_wire::{call, RpcRequest};

/// Scrape cadence of a registered data source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    #[serde(rename = "Five_Seconds")]
    FiveSeconds,
}

/// Errors from the metric service.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric service call failed: {0}")]
    Switch(#[from] ss_wire::SwitchError),

    #[error("metric service rejected {method}: {code}")]
    Rejected { method: String, code: String },
}

/// The subset of the metric daemon's surface the dispatcher needs.
#[async_trait]
pub trait MetricsApi: Send + Sync {
    /// Register a local data source scraped at `frequency`.
    async fn register_local(&self, uid: &str, frequency: Frequency) -> Result<(), MetricsError>;

    /// Remove a previously registered data source.
    async fn deregister(&self, uid: &str) -> Result<(), MetricsError>;
}

/// Metric service reached over its own switch queue.
#[derive(Debug, Clone)]
pub struct SwitchMetrics {
    socket: PathBuf,
}

impl SwitchMetrics {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        SwitchMetrics { socket: socket.into() }
    }

    async fn invoke(&self, method: &str, arg: serde_json::Value) -> Result<(), MetricsError> {
        let response = call(&self.socket, &RpcRequest::new(method, arg)).await?;
        match response.error {
            None => Ok(()),
            Some(e) => {
                debug!(method, code = %e.code, "metric service rejected call");
                Err(MetricsError::Rejected { method: method.to_string(), code: e.code })
            }
        }
    }
}

#[async_trait]
impl MetricsApi for SwitchMetrics {
    async fn register_local(&self, uid: &str, frequency: Frequency) -> Result<(), MetricsError> {
        self.invoke(
            "Plugin.Local.register",
            json!({"uid": uid, "info": frequency, "protocol": "V2"}),
        )
        .await
    }

    async fn deregister(&self, uid: &str) -> Result<(), MetricsError> {
        self.invoke("Plugin.Local.deregister", json!({"uid": uid})).await
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
