// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error envelope surfaced through the RPC error channel.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The payload a failing script writes to stdout before exiting non-zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptFailure {
    pub code: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub backtrace: Value,
}

/// Every failure a storage RPC can surface to the caller.
///
/// Script-originated errors keep the backend's own code, params, and
/// backtrace; everything else carries a fixed code per kind.
#[derive(Debug, Error)]
pub enum SmError {
    #[error("required key 'uri' is missing from device_config")]
    MissingUri,

    #[error("SR {0} is not attached")]
    SrNotAttached(String),

    #[error("script {0} does not exist")]
    ScriptMissing(PathBuf),

    #[error("script {0} is not executable")]
    ScriptNotExecutable(PathBuf),

    #[error("script failed: {}", params.join("; "))]
    ScriptFailed { params: Vec<String> },

    #[error("backend error {code}: {}", params.join("; "))]
    Backend { code: String, params: Vec<String>, backtrace: Value },

    #[error("unknown method {0}")]
    Unimplemented(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SmError {
    /// The wire-level error code.
    pub fn code(&self) -> &str {
        match self {
            SmError::MissingUri => "MISSING_URI",
            SmError::SrNotAttached(_) => "SR_NOT_ATTACHED",
            SmError::ScriptMissing(_) => "SCRIPT_MISSING",
            SmError::ScriptNotExecutable(_) => "SCRIPT_NOT_EXECUTABLE",
            SmError::ScriptFailed { .. } => "SCRIPT_FAILED",
            SmError::Backend { code, .. } => code,
            SmError::Unimplemented(_) => "UNIMPLEMENTED",
            SmError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The wire-level error params.
    pub fn params(&self) -> Vec<String> {
        match self {
            SmError::MissingUri => vec!["uri".to_string()],
            SmError::SrNotAttached(sr) => vec![sr.clone()],
            SmError::ScriptMissing(path) | SmError::ScriptNotExecutable(path) => {
                vec![path.display().to_string()]
            }
            SmError::ScriptFailed { params } | SmError::Backend { params, .. } => params.clone(),
            SmError::Unimplemented(method) => vec![method.clone()],
            SmError::Internal(message) => vec![message.clone()],
        }
    }

    /// The preserved backend backtrace, for [`SmError::Backend`] only.
    pub fn backtrace(&self) -> Option<Value> {
        match self {
            SmError::Backend { backtrace, .. } => Some(backtrace.clone()),
            _ => None,
        }
    }

    /// Wrap an infrastructure failure that has no script of its own.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        SmError::Internal(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
