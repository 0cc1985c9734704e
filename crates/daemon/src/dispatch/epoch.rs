// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clone-on-boot: the epoch protocol giving a VM a disposable copy of its
//! disk at each boot.
//!
//! A datapath plugin advertising `NONPERSISTENT` implements the policy
//! natively and just gets `Datapath.open`/`Datapath.close`. For every
//! other plugin the daemon maintains a shadow clone recorded under the
//! volume's `clone-on-boot` metadata key; attach-time routing then follows
//! the shadow instead of the baseline volume.

use serde_json::Value;

use ss_core::{SmError, FEATURE_NONPERSISTENT, CLONE_ON_BOOT_KEY, Volume};

use crate::chooser::choose_datapath;

use super::calls;
use super::requests::{VdiArgs, VdiEpochBeginArgs};
use super::Dispatcher;

impl Dispatcher {
    pub(super) async fn vdi_epoch_begin(&self, args: VdiEpochBeginArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume = self.volume_stat(&args.dbg, &sr_id, &args.vdi).await?;
        let datapath = choose_datapath(&self.registry, &volume, args.persistent)?;

        if self.registry.supports(&datapath.name, FEATURE_NONPERSISTENT) {
            self.datapath_call::<_, Value>(
                &datapath.name,
                "Datapath.open",
                &calls::DpOpen { dbg: &args.dbg, uri: &datapath.uri, persistent: args.persistent },
            )
            .await?;
            return Ok(Value::Null);
        }

        // The baseline volume is already persistent; nothing to do.
        if args.persistent {
            return Ok(Value::Null);
        }

        // A shadow left over from an earlier session is stale
        if let Some(shadow) = volume.shadow_key() {
            let shadow = shadow.to_string();
            self.volume_destroy(&args.dbg, &sr_id, &shadow).await?;
        }

        let shadow: Volume = self
            .volume_call("Volume.clone", &calls::Vol { dbg: &args.dbg, sr: &sr_id, key: &args.vdi })
            .await?;
        self.volume_call::<_, Value>(
            "Volume.set",
            &calls::VolSet {
                dbg: &args.dbg,
                sr: &sr_id,
                key: &args.vdi,
                k: CLONE_ON_BOOT_KEY,
                v: &shadow.key,
            },
        )
        .await?;
        Ok(Value::Null)
    }

    pub(super) async fn vdi_epoch_end(&self, args: VdiArgs) -> Result<Value, SmError> {
        let sr_id = self.index.find(&args.sr)?;
        let volume = self.volume_stat(&args.dbg, &sr_id, &args.vdi).await?;
        let datapath = choose_datapath(&self.registry, &volume, true)?;

        if self.registry.supports(&datapath.name, FEATURE_NONPERSISTENT) {
            self.datapath_call::<_, Value>(
                &datapath.name,
                "Datapath.close",
                &calls::DpClose { dbg: &args.dbg, uri: &datapath.uri },
            )
            .await?;
            return Ok(Value::Null);
        }

        if let Some(shadow) = volume.shadow_key() {
            let shadow = shadow.to_string();
            self.volume_destroy(&args.dbg, &sr_id, &shadow).await?;
            self.volume_call::<_, Value>(
                "Volume.unset",
                &calls::VolUnset {
                    dbg: &args.dbg,
                    sr: &sr_id,
                    key: &args.vdi,
                    k: CLONE_ON_BOOT_KEY,
                },
            )
            .await?;
        }
        Ok(Value::Null)
    }
}
