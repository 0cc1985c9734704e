// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound parameter objects, one per recognized method. Only the fields
//! the engine reads are declared; the rest of the manager's payload is
//! ignored.

use serde::Deserialize;

use ss_core::DeviceConfig;

fn default_persistent() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(super) struct QueryArgs {
    #[serde(default)]
    pub dbg: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SrAttachArgs {
    #[serde(default)]
    pub dbg: String,
    /// The manager's SR handle, recorded in the attached-SR index.
    pub sr: String,
    #[serde(default)]
    pub device_config: DeviceConfig,
}

#[derive(Debug, Deserialize)]
pub(super) struct SrProbeArgs {
    #[serde(default)]
    pub dbg: String,
    #[serde(default)]
    pub device_config: DeviceConfig,
}

#[derive(Debug, Deserialize)]
pub(super) struct SrCreateArgs {
    #[serde(default)]
    pub dbg: String,
    #[serde(default)]
    pub device_config: DeviceConfig,
    #[serde(default)]
    pub name_label: String,
    #[serde(default)]
    pub name_description: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SrArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SrSetNameArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub new_name_label: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SrSetDescriptionArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub new_name_description: String,
}

/// The subset of the manager's vdi_info a creation consumes.
#[derive(Debug, Deserialize)]
pub(super) struct NewVdiInfo {
    #[serde(default)]
    pub name_label: String,
    #[serde(default)]
    pub name_description: String,
    pub virtual_size: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct VdiCreateArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub vdi_info: NewVdiInfo,
}

#[derive(Debug, Deserialize)]
pub(super) struct VdiArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub vdi: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct VdiSetNameArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub vdi: String,
    pub new_name_label: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct VdiSetDescriptionArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub vdi: String,
    pub new_name_description: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct VdiResizeArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub vdi: String,
    pub new_size: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct VdiIntroduceArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    /// The backend volume key of the disk being introduced.
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct VdiEpochBeginArgs {
    #[serde(default)]
    pub dbg: String,
    pub sr: String,
    pub vdi: String,
    #[serde(default = "default_persistent")]
    pub persistent: bool,
}
