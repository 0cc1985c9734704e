// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Datapath plugin results and their manager-facing translation.

use serde::{Deserialize, Serialize};

/// The only datapath feature the daemon interprets. A plugin advertising
/// it implements non-persistent disks natively, so the daemon skips the
/// clone-on-boot protocol for volumes attached through it.
pub const FEATURE_NONPERSISTENT: &str = "NONPERSISTENT";

/// How a datapath plugin exposes an attached volume to the guest domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Implementation {
    Blkback(String),
    Qdisk(String),
    Tapdisk3(String),
}

/// The result of `Datapath.attach`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatapathAttach {
    pub implementation: Implementation,
}

/// The manager-facing attach descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachInfo {
    #[serde(rename = "backend-kind")]
    pub backend_kind: String,
    pub params: String,
    pub o_direct: bool,
    pub o_direct_reason: String,
}

impl From<Implementation> for AttachInfo {
    fn from(implementation: Implementation) -> Self {
        let (backend_kind, params) = match implementation {
            Implementation::Blkback(p) => ("vbd", p),
            Implementation::Qdisk(p) => ("qdisk", p),
            Implementation::Tapdisk3(p) => ("vbd3", p),
        };
        AttachInfo {
            backend_kind: backend_kind.to_string(),
            params,
            o_direct: true,
            o_direct_reason: String::new(),
        }
    }
}

#[cfg(test)]
#[path = "datapath_tests.rs"]
mod tests;
