// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The attached-SR index: manager SR handle → backend identifier plus the
//! data-source UIDs registered for it. Every mutation is persisted so the
//! mapping survives a daemon restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use ss_core::SmError;

/// Current state-file schema version
pub const STATE_FILE_VERSION: u32 = 1;

/// Errors from persisting or loading the index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One attached SR.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachedSr {
    /// Backend-supplied SR identifier, passed to every script call.
    pub sr: String,
    /// UIDs of the data sources registered with the metric service.
    #[serde(default)]
    pub uids: Vec<String>,
}

/// The state file written after every mutation.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(rename = "v")]
    version: u32,
    saved_at: DateTime<Utc>,
    srs: BTreeMap<String, AttachedSr>,
}

/// Concurrent-safe mapping from the manager's SR handle to its backend
/// identity. The state file is written by this process only.
#[derive(Debug)]
pub struct AttachedSrIndex {
    path: PathBuf,
    srs: Mutex<BTreeMap<String, AttachedSr>>,
}

impl AttachedSrIndex {
    /// Load the index from `path`, or start empty when no file exists yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let path = path.into();
        let srs = match std::fs::read(&path) {
            Ok(bytes) => {
                let state: StateFile = serde_json::from_slice(&bytes)?;
                info!(state = %path.display(), attached = state.srs.len(), "restored attached-SR index");
                state.srs
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(AttachedSrIndex { path, srs: Mutex::new(srs) })
    }

    /// Insert or replace an entry, then persist.
    pub async fn add(
        &self,
        handle: &str,
        sr: &str,
        uids: Vec<String>,
    ) -> Result<(), IndexError> {
        self.srs
            .lock()
            .insert(handle.to_string(), AttachedSr { sr: sr.to_string(), uids });
        self.persist().await
    }

    /// Remove an entry, then persist. Removing an absent entry is a no-op.
    pub async fn remove(&self, handle: &str) -> Result<(), IndexError> {
        if self.srs.lock().remove(handle).is_none() {
            return Ok(());
        }
        self.persist().await
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.srs.lock().contains_key(handle)
    }

    /// The backend SR identifier for `handle`.
    pub fn find(&self, handle: &str) -> Result<String, SmError> {
        self.srs
            .lock()
            .get(handle)
            .map(|a| a.sr.clone())
            .ok_or_else(|| SmError::SrNotAttached(handle.to_string()))
    }

    /// The data-source UIDs registered for `handle`.
    pub fn uids(&self, handle: &str) -> Result<Vec<String>, SmError> {
        self.srs
            .lock()
            .get(handle)
            .map(|a| a.uids.clone())
            .ok_or_else(|| SmError::SrNotAttached(handle.to_string()))
    }

    /// Write the full table to the state file: temp file in the same
    /// directory, then rename, so a crash never leaves a torn file.
    async fn persist(&self) -> Result<(), IndexError> {
        let state = StateFile {
            version: STATE_FILE_VERSION,
            saved_at: Utc::now(),
            srs: self.srs.lock().clone(),
        };
        let bytes = serde_json::to_vec_pretty(&state)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub fn state_path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
