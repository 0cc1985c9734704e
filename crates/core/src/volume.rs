// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend volume records and their manager-facing VDI projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Distinguished per-volume metadata key naming the shadow volume that
/// backs a non-persistent session.
pub const CLONE_ON_BOOT_KEY: &str = "clone-on-boot";

/// Fixed snapshot timestamp reported for projected VDIs (the epoch).
pub const EPOCH_SNAPSHOT_TIME: &str = "19700101T00:00:00Z";

/// A virtual disk as described by a volume plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volume {
    /// Stable per-SR identifier, used as the script-level handle.
    pub key: String,
    /// Optional globally-unique identifier; backends may omit it.
    #[serde(default)]
    pub uuid: Option<String>,
    pub name: String,
    pub description: String,
    pub read_write: bool,
    pub virtual_size: u64,
    pub physical_utilisation: u64,
    #[serde(default)]
    pub sharable: bool,
    /// Candidate URIs through which the volume's data can be reached.
    pub uri: Vec<String>,
    /// Opaque per-volume metadata. Only [`CLONE_ON_BOOT_KEY`] is
    /// interpreted by the daemon.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

impl Volume {
    /// The key of the shadow volume backing this volume's non-persistent
    /// session, when one exists.
    pub fn shadow_key(&self) -> Option<&str> {
        self.keys.get(CLONE_ON_BOOT_KEY).map(String::as_str)
    }
}

/// The manager-facing VDI record projected from a [`Volume`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VdiInfo {
    pub vdi: String,
    pub uuid: String,
    pub content_id: String,
    pub name_label: String,
    pub name_description: String,
    pub ty: String,
    pub metadata_of_pool: String,
    pub is_a_snapshot: bool,
    pub snapshot_time: String,
    pub snapshot_of: String,
    pub read_only: bool,
    pub virtual_size: u64,
    pub physical_utilisation: u64,
    pub sharable: bool,
    pub sm_config: Vec<(String, String)>,
    pub persistent: bool,
}

impl From<Volume> for VdiInfo {
    fn from(v: Volume) -> Self {
        // Backends without a uuid notion fall back to the volume key.
        let uuid = v.uuid.unwrap_or_else(|| v.key.clone());
        VdiInfo {
            vdi: v.key,
            uuid,
            content_id: String::new(),
            name_label: v.name,
            name_description: v.description,
            ty: String::new(),
            metadata_of_pool: String::new(),
            is_a_snapshot: false,
            snapshot_time: EPOCH_SNAPSHOT_TIME.to_string(),
            snapshot_of: String::new(),
            read_only: !v.read_write,
            virtual_size: v.virtual_size,
            physical_utilisation: v.physical_utilisation,
            sharable: v.sharable,
            sm_config: Vec::new(),
            persistent: true,
        }
    }
}

#[cfg(test)]
#[path = "volume_tests.rs"]
mod tests;
