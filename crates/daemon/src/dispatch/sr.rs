// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SR.*`: repository lifecycle against the attached-SR index.

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;
use url::Url;

use ss_adapters::Frequency;
use ss_core::{ProbeResult, SmError, SrStat, VdiInfo, Volume};

use super::calls;
use super::requests::{SrArgs, SrAttachArgs, SrCreateArgs, SrProbeArgs, SrSetDescriptionArgs, SrSetNameArgs};
use super::{to_result, Dispatcher};

/// Scheme of SR data sources published to the metric service.
const DATASOURCE_SCHEME: &str = "xeno+shm";

impl Dispatcher {
    pub(super) async fn sr_attach(&self, args: SrAttachArgs) -> Result<Value, SmError> {
        let uri = args.device_config.uri()?;
        let sr_id: String =
            self.volume_call("SR.attach", &calls::SrUri { dbg: &args.dbg, uri }).await?;

        // Stat takes the backend-returned identifier, not the URI.
        let stat: SrStat =
            self.volume_call("SR.stat", &calls::Sr { dbg: &args.dbg, sr: &sr_id }).await?;

        let mut uids = Vec::new();
        for datasource in &stat.datasources {
            let Ok(parsed) = Url::parse(datasource) else { continue };
            if parsed.scheme() != DATASOURCE_SCHEME {
                continue;
            }
            let uid = parsed.path().trim_start_matches('/').to_string();
            match self.metrics.register_local(&uid, Frequency::FiveSeconds).await {
                Ok(()) => uids.push(uid),
                // A broken metric service must not fail the attach
                Err(e) => {
                    warn!(datasource = %uid, error = %e, "data source registration failed")
                }
            }
        }

        self.index.add(&args.sr, &sr_id, uids).await.map_err(SmError::internal)?;
        Ok(Value::Null)
    }

    /// Detaching an SR that is not attached succeeds: detach is how the
    /// manager cleans up after partial failures.
    pub(super) async fn sr_detach(&self, args: SrArgs) -> Result<Value, SmError> {
        if !self.index.contains(&args.sr) {
            return Ok(Value::Null);
        }
        let sr_id = self.index.find(&args.sr)?;

        self.volume_call::<_, Value>("SR.detach", &calls::Sr { dbg: &args.dbg, sr: &sr_id })
            .await?;

        for uid in self.index.uids(&args.sr).unwrap_or_default() {
            if let Err(e) = self.metrics.deregister(&uid).await {
                warn!(datasource = %uid, error = %e, "data source deregistration failed");
            }
        }

        self.index.remove(&args.sr).await.map_err(SmError::internal)?;
        Ok(Value::Null)
    }

    pub(super) async fn sr_probe(&self, args: SrProbeArgs) -> Result<Value, SmError> {
        let uri = args.device_config.uri()?;
        let result: ProbeResult =
            self.volume_call("SR.probe", &calls::SrUri { dbg: &args.dbg, uri }).await?;
        to_result(&result)
    }

    pub(super) async fn sr_create(&self, args: SrCreateArgs) -> Result<Value, SmError> {
        let uri = args.device_config.uri()?;
        self.volume_call::<_, Value>(
            "SR.create",
            &calls::SrCreate {
                dbg: &args.dbg,
                uri,
                name: &args.name_label,
                description: &args.name_description,
            },
        )
        .await?;
        Ok(Value::Null)
    }

    pub(super) async fn sr_set_name_label(&self, args: SrSetNameArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        self.volume_call::<_, Value>(
            "SR.set_name",
            &calls::SrRename { dbg: &args.dbg, sr: &sr_id, new_name: &args.new_name_label },
        )
        .await?;
        Ok(Value::Null)
    }

    pub(super) async fn sr_set_name_description(
        &self,
        args: SrSetDescriptionArgs,
    ) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        self.volume_call::<_, Value>(
            "SR.set_description",
            &calls::SrRedescribe {
                dbg: &args.dbg,
                sr: &sr_id,
                new_description: &args.new_name_description,
            },
        )
        .await?;
        Ok(Value::Null)
    }

    pub(super) async fn sr_destroy(&self, args: SrArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        self.volume_call::<_, Value>("SR.destroy", &calls::Sr { dbg: &args.dbg, sr: &sr_id })
            .await?;
        Ok(Value::Null)
    }

    pub(super) async fn sr_scan(&self, args: SrArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volumes: Vec<Volume> =
            self.volume_call("SR.ls", &calls::Sr { dbg: &args.dbg, sr: &sr_id }).await?;

        // Volumes named by another volume's clone-on-boot key are transient
        // shadows and stay hidden from the manager.
        let shadows: HashSet<String> =
            volumes.iter().filter_map(|v| v.shadow_key().map(str::to_string)).collect();
        let vdis: Vec<VdiInfo> = volumes
            .into_iter()
            .filter(|v| !shadows.contains(&v.key))
            .map(VdiInfo::from)
            .collect();
        to_result(&vdis)
    }

    pub(super) async fn sr_stat(&self, args: SrArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let stat: SrStat =
            self.volume_call("SR.stat", &calls::Sr { dbg: &args.dbg, sr: &sr_id }).await?;
        to_result(&stat)
    }
}
