// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SR.*` dispatch: index composition, metric registration, shadow hiding.

use serde_json::json;

use ss_adapters::MetricsCall;
use ss_storage::AttachedSrIndex;

use crate::test_helpers::volume_json;

use super::helpers::Harness;

fn sr_stat_json(datasources: &[&str]) -> String {
    json!({
        "sr": "backend-sr",
        "name": "test SR",
        "description": "an SR",
        "free_space": 100u64,
        "total_space": 200u64,
        "datasources": datasources,
        "clustered": false,
        "health": "Healthy",
    })
    .to_string()
}

#[tokio::test]
async fn attach_records_the_backend_identifier() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("SR.attach", "\"backend-sr\"");
    h.volume_script("SR.stat", &sr_stat_json(&[]));

    let response = h
        .call("SR.attach", json!({"dbg": "t", "sr": "sr-handle", "device_config": {"uri": "nfs://server/export"}}))
        .await;

    assert!(response.error.is_none(), "{:?}", response.error);
    assert_eq!(h.index.find("sr-handle").unwrap(), "backend-sr");
}

#[tokio::test]
async fn attach_stats_with_the_backend_identifier_not_the_uri() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("SR.attach", "\"backend-sr\"");
    h.volume_script_logged("SR.stat", &sr_stat_json(&[]));

    h.call("SR.attach", json!({"dbg": "t", "sr": "sr-handle", "device_config": {"uri": "nfs://server/export"}}))
        .await;

    let calls = h.logged_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("\"sr\":\"backend-sr\""), "{calls:?}");
    assert!(!calls[0].contains("nfs://"), "{calls:?}");
}

#[tokio::test]
async fn attach_without_uri_fails_missing_uri() {
    let h = Harness::new("org.test.plugin");

    let response =
        h.call("SR.attach", json!({"dbg": "t", "sr": "sr-handle", "device_config": []})).await;

    assert_eq!(response.error.unwrap().code, "MISSING_URI");
}

#[tokio::test]
async fn attach_registers_shm_datasources_at_five_second_cadence() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("SR.attach", "\"backend-sr\"");
    h.volume_script(
        "SR.stat",
        &sr_stat_json(&[
            "xeno+shm:///dev/shm/sr1/ds0",
            "http://ignored.example/metrics",
            "not a uri",
        ]),
    );

    h.call("SR.attach", json!({"dbg": "t", "sr": "sr-handle", "device_config": {"uri": "nfs://server/export"}}))
        .await;

    assert_eq!(h.metrics.registered(), vec!["dev/shm/sr1/ds0".to_string()]);
    assert_eq!(h.index.uids("sr-handle").unwrap(), vec!["dev/shm/sr1/ds0".to_string()]);
}

#[tokio::test]
async fn metric_failures_do_not_fail_the_attach() {
    let h = Harness::new("org.test.plugin");
    h.metrics.reject_registrations();
    h.volume_script("SR.attach", "\"backend-sr\"");
    h.volume_script("SR.stat", &sr_stat_json(&["xeno+shm:///dev/shm/sr1/ds0"]));

    let response = h
        .call("SR.attach", json!({"dbg": "t", "sr": "sr-handle", "device_config": {"uri": "nfs://server/export"}}))
        .await;

    assert!(response.error.is_none());
    assert_eq!(h.index.find("sr-handle").unwrap(), "backend-sr");
    // The rejected data source is not recorded
    assert!(h.index.uids("sr-handle").unwrap().is_empty());
}

#[tokio::test]
async fn attach_survives_a_restart() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("SR.attach", "\"backend-sr\"");
    h.volume_script("SR.stat", &sr_stat_json(&[]));

    h.call("SR.attach", json!({"dbg": "t", "sr": "sr-handle", "device_config": {"uri": "nfs://server/export"}}))
        .await;

    let reloaded = AttachedSrIndex::load(h.root.path().join("state.json")).unwrap();
    assert_eq!(reloaded.find("sr-handle").unwrap(), "backend-sr");
}

#[tokio::test]
async fn detach_of_unattached_sr_succeeds() {
    let h = Harness::new("org.test.plugin");

    let response = h.call("SR.detach", json!({"dbg": "t", "sr": "unknown-handle"})).await;

    assert!(response.error.is_none());
    assert_eq!(response.result.unwrap(), serde_json::Value::Null);
}

#[tokio::test]
async fn detach_deregisters_datasources_and_forgets_the_sr() {
    let h = Harness::new("org.test.plugin");
    h.index.add("sr-handle", "backend-sr", vec!["dev/shm/sr1/ds0".into()]).await.unwrap();
    h.volume_script_logged("SR.detach", "null");

    let response = h.call("SR.detach", json!({"dbg": "t", "sr": "sr-handle"})).await;

    assert!(response.error.is_none());
    assert!(!h.index.contains("sr-handle"));
    assert_eq!(h.metrics.calls(), vec![MetricsCall::Deregister("dev/shm/sr1/ds0".into())]);
    assert!(h.logged_calls()[0].contains("\"sr\":\"backend-sr\""));
}

#[tokio::test]
async fn probe_requires_a_uri() {
    let h = Harness::new("org.test.plugin");

    let response = h.call("SR.probe", json!({"dbg": "t", "device_config": []})).await;
    assert_eq!(response.error.unwrap().code, "MISSING_URI");
}

#[tokio::test]
async fn probe_translates_the_health_enum() {
    let h = Harness::new("org.test.plugin");
    h.volume_script(
        "SR.probe",
        &json!({"srs": [serde_json::from_str::<serde_json::Value>(&sr_stat_json(&[])).unwrap()], "uris": ["nfs://server/other"]}).to_string(),
    );

    let response = h
        .call("SR.probe", json!({"dbg": "t", "device_config": {"uri": "nfs://server/export"}}))
        .await;
    let result = response.result.unwrap();

    assert_eq!(result["srs"][0]["health"], "Healthy");
    assert_eq!(result["uris"][0], "nfs://server/other");
}

#[tokio::test]
async fn create_requires_a_uri() {
    let h = Harness::new("org.test.plugin");

    let response = h
        .call("SR.create", json!({"dbg": "t", "sr": "sr-handle", "device_config": [], "name_label": "sr"}))
        .await;
    assert_eq!(response.error.unwrap().code, "MISSING_URI");
}

#[tokio::test]
async fn create_passes_uri_name_and_description() {
    let h = Harness::new("org.test.plugin");
    h.volume_script_logged("SR.create", "null");

    let response = h
        .call(
            "SR.create",
            json!({
                "dbg": "t",
                "sr": "sr-handle",
                "device_config": {"uri": "nfs://server/export"},
                "name_label": "My SR",
                "name_description": "space",
            }),
        )
        .await;

    assert!(response.error.is_none());
    let call = &h.logged_calls()[0];
    assert!(call.contains("\"uri\":\"nfs://server/export\""), "{call}");
    assert!(call.contains("\"name\":\"My SR\""), "{call}");
    assert!(call.contains("\"description\":\"space\""), "{call}");
}

#[tokio::test]
async fn set_name_label_resolves_the_backend_sr() {
    let h = Harness::attached("org.test.plugin").await;
    h.volume_script_logged("SR.set_name", "null");

    let response = h
        .call("SR.set_name_label", json!({"dbg": "t", "sr": "sr-handle", "new_name_label": "renamed"}))
        .await;

    assert!(response.error.is_none());
    let call = &h.logged_calls()[0];
    assert!(call.contains("\"sr\":\"backend-sr\""), "{call}");
    assert!(call.contains("\"new_name\":\"renamed\""), "{call}");
}

#[tokio::test]
async fn operations_on_unattached_srs_fail_sr_not_attached() {
    let h = Harness::new("org.test.plugin");

    for method in ["SR.scan", "SR.stat", "SR.destroy"] {
        let response = h.call(method, json!({"dbg": "t", "sr": "sr-handle"})).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, "SR_NOT_ATTACHED", "{method}");
        assert_eq!(error.params, vec!["sr-handle".to_string()], "{method}");
    }
}

#[tokio::test]
async fn scan_hides_clone_on_boot_shadows() {
    let h = Harness::attached("org.test.plugin").await;
    let a = volume_json("A", &["nfs://server/A"], &[("clone-on-boot", "B")]);
    let b = volume_json("B", &["nfs://server/B"], &[]);
    h.volume_script("SR.ls", &format!("[{a},{b}]"));

    let response = h.call("SR.scan", json!({"dbg": "t", "sr": "sr-handle"})).await;
    let vdis = response.result.unwrap();
    let vdis = vdis.as_array().unwrap();

    assert_eq!(vdis.len(), 1);
    assert_eq!(vdis[0]["vdi"], "A");
}

#[tokio::test]
async fn scan_projects_volumes_to_vdis() {
    let h = Harness::attached("org.test.plugin").await;
    let a = volume_json("A", &["nfs://server/A"], &[]);
    h.volume_script("SR.ls", &format!("[{a}]"));

    let response = h.call("SR.scan", json!({"dbg": "t", "sr": "sr-handle"})).await;
    let vdis = response.result.unwrap();

    assert_eq!(vdis[0]["vdi"], "A");
    assert_eq!(vdis[0]["uuid"], "A-uuid");
    assert_eq!(vdis[0]["name_label"], "A-name");
    assert_eq!(vdis[0]["read_only"], false);
    assert_eq!(vdis[0]["persistent"], true);
    assert_eq!(vdis[0]["snapshot_time"], "19700101T00:00:00Z");
}

#[tokio::test]
async fn stat_translates_the_health_enum() {
    let h = Harness::attached("org.test.plugin").await;
    let mut stat: serde_json::Value = serde_json::from_str(&sr_stat_json(&[])).unwrap();
    stat["health"] = json!("Recovering");
    h.volume_script("SR.stat", &stat.to_string());

    let response = h.call("SR.stat", json!({"dbg": "t", "sr": "sr-handle"})).await;
    assert_eq!(response.result.unwrap()["health"], "Recovering");
}
