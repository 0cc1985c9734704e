// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SR-level status records returned by volume plugins.

use serde::{Deserialize, Serialize};

/// Backend-reported health of an attached SR.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Health {
    #[default]
    Healthy,
    Recovering,
}

/// The result of `SR.stat`, also embedded in probe results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SrStat {
    /// Backend-supplied SR identifier.
    pub sr: String,
    pub name: String,
    pub description: String,
    pub free_space: u64,
    pub total_space: u64,
    /// Metric-publishing endpoints, as URIs.
    #[serde(default)]
    pub datasources: Vec<String>,
    #[serde(default)]
    pub clustered: bool,
    #[serde(default)]
    pub health: Health,
}

/// The result of `SR.probe`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeResult {
    /// SRs found ready to attach at the probed location.
    #[serde(default)]
    pub srs: Vec<SrStat>,
    /// Further URIs worth probing.
    #[serde(default)]
    pub uris: Vec<String>,
}
