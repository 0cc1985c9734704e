// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory metric service for tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::metrics::{Frequency, MetricsApi, MetricsError};

/// One recorded call against [`FakeMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsCall {
    Register(String),
    Deregister(String),
}

/// Records every call; optionally rejects registrations.
#[derive(Debug, Default)]
pub struct FakeMetrics {
    calls: Mutex<Vec<MetricsCall>>,
    reject: Mutex<bool>,
}

impl FakeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `register_local` calls fail.
    pub fn reject_registrations(&self) {
        *self.reject.lock() = true;
    }

    pub fn calls(&self) -> Vec<MetricsCall> {
        self.calls.lock().clone()
    }

    /// UIDs currently registered (registered and not yet deregistered).
    pub fn registered(&self) -> Vec<String> {
        let mut uids = Vec::new();
        for c in self.calls.lock().iter() {
            match c {
                MetricsCall::Register(uid) => uids.push(uid.clone()),
                MetricsCall::Deregister(uid) => uids.retain(|u| u != uid),
            }
        }
        uids
    }
}

#[async_trait]
impl MetricsApi for FakeMetrics {
    async fn register_local(&self, uid: &str, _frequency: Frequency) -> Result<(), MetricsError> {
        if *self.reject.lock() {
            return Err(MetricsError::Rejected {
                method: "Plugin.Local.register".to_string(),
                code: "UNAVAILABLE".to_string(),
            });
        }
        self.calls.lock().push(MetricsCall::Register(uid.to_string()));
        Ok(())
    }

    async fn deregister(&self, uid: &str) -> Result<(), MetricsError> {
        self.calls.lock().push(MetricsCall::Deregister(uid.to_string()));
        Ok(())
    }
}
