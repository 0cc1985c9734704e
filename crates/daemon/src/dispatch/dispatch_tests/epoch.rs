// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clone-on-boot choreography.

use serde_json::json;

use ss_core::FEATURE_NONPERSISTENT;

use super::helpers::Harness;

#[tokio::test]
async fn epoch_begin_clones_when_the_datapath_is_not_nonpersistent() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[]))]);
    h.volume_script_logged("Volume.clone", &h.volume("B", "nfs", &[]));
    h.volume_script_logged("Volume.set", "null");
    h.volume_script_logged("Volume.destroy", "null");
    h.datapath_script_logged("nfs", "Datapath.open", "null");

    let response = h
        .call("VDI.epoch_begin", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A", "persistent": false}))
        .await;

    assert!(response.error.is_none(), "{:?}", response.error);
    let calls = h.logged_calls();
    assert_eq!(calls.len(), 2, "{calls:?}");
    // No pre-existing shadow, so no destroy; clone then record it
    assert!(calls[0].starts_with("Volume.clone"), "{calls:?}");
    assert!(calls[0].contains("\"key\":\"A\""), "{calls:?}");
    assert!(calls[1].starts_with("Volume.set"), "{calls:?}");
    assert!(calls[1].contains("\"k\":\"clone-on-boot\""), "{calls:?}");
    assert!(calls[1].contains("\"v\":\"B\""), "{calls:?}");
}

#[tokio::test]
async fn epoch_begin_replaces_a_stale_shadow() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[("clone-on-boot", "old")]))]);
    h.volume_script_logged("Volume.destroy", "null");
    h.volume_script_logged("Volume.clone", &h.volume("B", "nfs", &[]));
    h.volume_script_logged("Volume.set", "null");

    h.call("VDI.epoch_begin", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A", "persistent": false}))
        .await;

    let calls = h.logged_calls();
    assert_eq!(calls.len(), 3, "{calls:?}");
    assert!(calls[0].starts_with("Volume.destroy"), "{calls:?}");
    assert!(calls[0].contains("\"key\":\"old\""), "{calls:?}");
    assert!(calls[1].starts_with("Volume.clone"), "{calls:?}");
    assert!(calls[2].starts_with("Volume.set"), "{calls:?}");
}

#[tokio::test]
async fn epoch_begin_delegates_to_a_nonpersistent_datapath() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[FEATURE_NONPERSISTENT]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[]))]);
    h.volume_script_logged("Volume.clone", &h.volume("B", "nfs", &[]));
    h.datapath_script_logged("nfs", "Datapath.open", "null");

    let response = h
        .call("VDI.epoch_begin", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A", "persistent": false}))
        .await;

    assert!(response.error.is_none(), "{:?}", response.error);
    let calls = h.logged_calls();
    assert_eq!(calls.len(), 1, "{calls:?}");
    assert!(calls[0].starts_with("Datapath.open"), "{calls:?}");
    assert!(calls[0].contains("\"persistent\":false"), "{calls:?}");
}

#[tokio::test]
async fn persistent_epoch_begin_is_a_noop_without_native_support() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[]))]);
    h.volume_script_logged("Volume.clone", &h.volume("B", "nfs", &[]));

    let response = h
        .call("VDI.epoch_begin", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A", "persistent": true}))
        .await;

    assert!(response.error.is_none());
    assert!(h.logged_calls().is_empty());
}

#[tokio::test]
async fn persistent_epoch_begin_still_opens_a_nonpersistent_datapath() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[FEATURE_NONPERSISTENT]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[]))]);
    h.datapath_script_logged("nfs", "Datapath.open", "null");

    h.call("VDI.epoch_begin", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A", "persistent": true}))
        .await;

    let calls = h.logged_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("\"persistent\":true"), "{calls:?}");
}

#[tokio::test]
async fn epoch_end_destroys_the_shadow_and_unsets_the_key() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[("clone-on-boot", "B")]))]);
    h.volume_script_logged("Volume.destroy", "null");
    h.volume_script_logged("Volume.unset", "null");

    let response =
        h.call("VDI.epoch_end", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A"})).await;

    assert!(response.error.is_none(), "{:?}", response.error);
    let calls = h.logged_calls();
    assert_eq!(calls.len(), 2, "{calls:?}");
    assert!(calls[0].starts_with("Volume.destroy"), "{calls:?}");
    assert!(calls[0].contains("\"key\":\"B\""), "{calls:?}");
    assert!(calls[1].starts_with("Volume.unset"), "{calls:?}");
    assert!(calls[1].contains("\"key\":\"A\""), "{calls:?}");
    assert!(calls[1].contains("\"k\":\"clone-on-boot\""), "{calls:?}");
}

#[tokio::test]
async fn epoch_end_without_shadow_is_a_noop() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[]))]);
    h.volume_script_logged("Volume.destroy", "null");

    let response =
        h.call("VDI.epoch_end", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A"})).await;

    assert!(response.error.is_none());
    assert!(h.logged_calls().is_empty());
}

#[tokio::test]
async fn epoch_end_closes_a_nonpersistent_datapath() {
    let h = Harness::attached("org.test.plugin").await;
    h.registry.seed("nfs", &[FEATURE_NONPERSISTENT]);
    h.volume_stat_script(&[("A", h.volume("A", "nfs", &[]))]);
    h.datapath_script_logged("nfs", "Datapath.close", "null");
    h.volume_script_logged("Volume.destroy", "null");

    let response =
        h.call("VDI.epoch_end", json!({"dbg": "t", "sr": "sr-handle", "vdi": "A"})).await;

    assert!(response.error.is_none());
    let calls = h.logged_calls();
    assert_eq!(calls.len(), 1, "{calls:?}");
    assert!(calls[0].starts_with("Datapath.close"), "{calls:?}");
}
