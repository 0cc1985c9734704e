// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Query.*`: plugin self-description with capability composition.

use std::collections::BTreeSet;

use serde_json::Value;

use ss_core::{PluginMetadata, QueryResult, SmError};
use ss_script::{probe, Kind};

use super::calls;
use super::requests::QueryArgs;
use super::{to_result, Dispatcher};

/// Optional operations probed for existence and execute permission; each
/// present script contributes its capability to the advertised set.
const PROBED_CAPABILITIES: &[(&str, &str)] = &[
    ("SR.attach", "SR_ATTACH"),
    ("SR.create", "SR_CREATE"),
    ("SR.destroy", "SR_DESTROY"),
    ("SR.detach", "SR_DETACH"),
    ("SR.ls", "SR_SCAN"),
    ("SR.stat", "SR_UPDATE"),
    ("Volume.create", "VDI_CREATE"),
    ("Volume.clone", "VDI_CLONE"),
    ("Volume.snapshot", "VDI_SNAPSHOT"),
    ("Volume.resize", "VDI_RESIZE"),
    ("Volume.destroy", "VDI_DELETE"),
    ("Volume.stat", "VDI_UPDATE"),
];

/// Implemented by the daemon itself through the datapath layer, so every
/// plugin advertises them.
const UNCONDITIONAL_CAPABILITIES: &[&str] =
    &["VDI_ATTACH", "VDI_DETACH", "VDI_ACTIVATE", "VDI_DEACTIVATE", "VDI_INTRODUCE"];

impl Dispatcher {
    pub(super) async fn query(&self, args: QueryArgs) -> Result<Value, SmError> {
        let meta: PluginMetadata =
            self.volume_call("Plugin.Query", &calls::Dbg { dbg: &args.dbg }).await?;

        let mut features: BTreeSet<String> = meta
            .features
            .into_iter()
            .map(|f| if f == "VDI_DESTROY" { "VDI_DELETE".to_string() } else { f })
            .collect();

        for (script, capability) in PROBED_CAPABILITIES {
            if probe(&self.scripts.script(Kind::Volume, &self.plugin, script)) {
                features.insert((*capability).to_string());
            }
        }
        features.extend(UNCONDITIONAL_CAPABILITIES.iter().map(|c| c.to_string()));
        if features.contains("VDI_CLONE") {
            features.insert("VDI_RESET_ON_BOOT/2".to_string());
        }

        let mut configuration =
            vec![("uri".to_string(), "URI of the storage medium".to_string())];
        configuration.extend(meta.configuration);

        to_result(&QueryResult {
            driver: meta.plugin,
            name: meta.name,
            description: meta.description,
            vendor: meta.vendor,
            copyright: meta.copyright,
            version: meta.version,
            required_api_version: meta.required_api_version,
            features: features.into_iter().collect(),
            configuration,
            required_cluster_stack: meta.required_cluster_stack,
        })
    }

    pub(super) async fn diagnostics(&self, args: QueryArgs) -> Result<Value, SmError> {
        self.volume_call("Plugin.diagnostics", &calls::Dbg { dbg: &args.dbg }).await
    }
}
