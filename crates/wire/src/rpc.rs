// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC 1.0-style request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use ss_core::SmError;

/// An inbound call: `{method, params: [<one object>], id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default)]
    pub id: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, arg: Value) -> Self {
        RpcRequest { method: method.into(), params: vec![arg], id: Value::Null }
    }

    /// The single by-name argument object of the call.
    pub fn arg(&self) -> Value {
        self.params.first().cloned().unwrap_or(Value::Null)
    }
}

/// The error member of a failed response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<Value>,
}

impl From<&SmError> for RpcError {
    fn from(err: &SmError) -> Self {
        RpcError { code: err.code().to_string(), params: err.params(), backtrace: err.backtrace() }
    }
}

/// An outbound reply: `{result, id}` or `{error, id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    #[serde(default)]
    pub id: Value,
}

impl RpcResponse {
    pub fn ok(result: Value, id: Value) -> Self {
        RpcResponse { result: Some(result), error: None, id }
    }

    pub fn failure(error: RpcError, id: Value) -> Self {
        RpcResponse { result: None, error: Some(error), id }
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
