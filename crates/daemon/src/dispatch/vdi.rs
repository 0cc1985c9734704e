// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `VDI.*`: per-disk operations, including the shared datapath
//! choreography for attach/activate/deactivate/detach.

use serde_json::Value;

use ss_core::{AttachInfo, DatapathAttach, SmError, VdiInfo, Volume};

use crate::chooser::choose_datapath;

use super::calls;
use super::requests::{
    VdiArgs, VdiCreateArgs, VdiIntroduceArgs, VdiResizeArgs, VdiSetDescriptionArgs,
    VdiSetNameArgs,
};
use super::{to_result, Dispatcher};

impl Dispatcher {
    pub(super) async fn vdi_create(&self, args: VdiCreateArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume: Volume = self
            .volume_call(
                "Volume.create",
                &calls::VolCreate {
                    dbg: &args.dbg,
                    sr: &sr_id,
                    name: &args.vdi_info.name_label,
                    description: &args.vdi_info.name_description,
                    size: args.vdi_info.virtual_size,
                },
            )
            .await?;
        to_result(&VdiInfo::from(volume))
    }

    /// A shadowed volume takes its shadow down with it.
    pub(super) async fn vdi_destroy(&self, args: VdiArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume = self.volume_stat(&args.dbg, &sr_id, &args.vdi).await?;
        if let Some(shadow) = volume.shadow_key() {
            let shadow = shadow.to_string();
            self.volume_destroy(&args.dbg, &sr_id, &shadow).await?;
        }
        self.volume_destroy(&args.dbg, &sr_id, &args.vdi).await?;
        Ok(Value::Null)
    }

    pub(super) async fn vdi_snapshot(&self, args: VdiArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume: Volume = self
            .volume_call(
                "Volume.snapshot",
                &calls::Vol { dbg: &args.dbg, sr: &sr_id, key: &args.vdi },
            )
            .await?;
        to_result(&VdiInfo::from(volume))
    }

    pub(super) async fn vdi_clone(&self, args: VdiArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume: Volume = self
            .volume_call("Volume.clone", &calls::Vol { dbg: &args.dbg, sr: &sr_id, key: &args.vdi })
            .await?;
        to_result(&VdiInfo::from(volume))
    }

    pub(super) async fn vdi_set_name_label(&self, args: VdiSetNameArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        self.volume_call::<_, Value>(
            "Volume.set_name",
            &calls::VolRename {
                dbg: &args.dbg,
                sr: &sr_id,
                key: &args.vdi,
                new_name: &args.new_name_label,
            },
        )
        .await?;
        Ok(Value::Null)
    }

    pub(super) async fn vdi_set_name_description(
        &self,
        args: VdiSetDescriptionArgs,
    ) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        self.volume_call::<_, Value>(
            "Volume.set_description",
            &calls::VolRedescribe {
                dbg: &args.dbg,
                sr: &sr_id,
                key: &args.vdi,
                new_description: &args.new_name_description,
            },
        )
        .await?;
        Ok(Value::Null)
    }

    /// Resize, then report the size the backend actually settled on.
    pub(super) async fn vdi_resize(&self, args: VdiResizeArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        self.volume_call::<_, Value>(
            "Volume.resize",
            &calls::VolResize {
                dbg: &args.dbg,
                sr: &sr_id,
                key: &args.vdi,
                new_size: args.new_size,
            },
        )
        .await?;
        let volume = self.volume_stat(&args.dbg, &sr_id, &args.vdi).await?;
        to_result(&volume.virtual_size)
    }

    pub(super) async fn vdi_stat(&self, args: VdiArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume = self.volume_stat(&args.dbg, &sr_id, &args.vdi).await?;
        to_result(&VdiInfo::from(volume))
    }

    pub(super) async fn vdi_introduce(&self, args: VdiIntroduceArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume = self.volume_stat(&args.dbg, &sr_id, &args.location).await?;
        to_result(&VdiInfo::from(volume))
    }

    // ------------------------------------------------------------------
    // Datapath choreography
    // ------------------------------------------------------------------

    pub(super) async fn vdi_attach(&self, args: VdiArgs) -> Result<Value, SmError> {
        let datapath = self.routed_volume(&args).await?;
        let attach: DatapathAttach = self
            .datapath_call(
                &datapath.name,
                "Datapath.attach",
                &calls::Dp { dbg: &args.dbg, uri: &datapath.uri, domain: &datapath.domain },
            )
            .await?;
        to_result(&AttachInfo::from(attach.implementation))
    }

    pub(super) async fn vdi_activate(&self, args: VdiArgs) -> Result<Value, SmError> {
        self.datapath_op(&args, "Datapath.activate").await
    }

    pub(super) async fn vdi_deactivate(&self, args: VdiArgs) -> Result<Value, SmError> {
        self.datapath_op(&args, "Datapath.deactivate").await
    }

    pub(super) async fn vdi_detach(&self, args: VdiArgs) -> Result<Value, SmError> {
        self.datapath_op(&args, "Datapath.detach").await
    }

    /// `VDI.set_persistent` succeeds immediately; the decision is consumed
    /// by `VDI.epoch_begin`.
    pub(super) async fn vdi_set_persistent(&self, _args: VdiArgs) -> Result<Value, SmError> {
        Ok(Value::Null)
    }

    async fn datapath_op(&self, args: &VdiArgs, operation: &str) -> Result<Value, SmError> {
        let datapath = self.routed_volume(args).await?;
        self.datapath_call::<_, Value>(
            &datapath.name,
            operation,
            &calls::Dp { dbg: &args.dbg, uri: &datapath.uri, domain: &datapath.domain },
        )
        .await?;
        Ok(Value::Null)
    }

    /// Stat the VDI, swap in its clone-on-boot shadow when one exists, and
    /// choose the datapath for the effective record.
    async fn routed_volume(&self, args: &VdiArgs) -> Result<crate::chooser::Datapath, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume = self.effective_volume(&args.dbg, &sr_id, &args.vdi).await?;
        choose_datapath(&self.registry, &volume, true)
    }

    // ------------------------------------------------------------------
    // Volume.stat / Volume.destroy plumbing shared with epoch handling
    // ------------------------------------------------------------------

    pub(super) async fn volume_stat(
        &self,
        dbg: &str,
        sr_id: &str,
        key: &str,
    ) -> Result<Volume, SmError> {
        self.volume_call("Volume.stat", &calls::Vol { dbg, sr: sr_id, key }).await
    }

    pub(super) async fn volume_destroy(
        &self,
        dbg: &str,
        sr_id: &str,
        key: &str,
    ) -> Result<(), SmError> {
        self.volume_call::<_, Value>("Volume.destroy", &calls::Vol { dbg, sr: sr_id, key })
            .await?;
        Ok(())
    }

    pub(super) async fn effective_volume(
        &self,
        dbg: &str,
        sr_id: &str,
        key: &str,
    ) -> Result<Volume, SmError> {
        let volume = self.volume_stat(dbg, sr_id, key).await?;
        match volume.shadow_key() {
            Some(shadow) => {
                let shadow = shadow.to_string();
                self.volume_stat(dbg, sr_id, &shadow).await
            }
            None => Ok(volume),
        }
    }
}
