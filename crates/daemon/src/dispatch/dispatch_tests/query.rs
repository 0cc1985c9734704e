// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Query.query` capability composition.

use serde_json::json;

use crate::test_helpers::{plugin_query_json, reply, write_script};

use super::helpers::Harness;

fn features_of(result: &serde_json::Value) -> Vec<String> {
    result["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn vdi_destroy_is_translated_to_vdi_delete() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("Plugin.Query", &plugin_query_json("org.test.plugin", &["VDI_DESTROY"]));

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    let features = features_of(&response.result.unwrap());

    assert!(features.contains(&"VDI_DELETE".to_string()));
    assert!(!features.contains(&"VDI_DESTROY".to_string()));
}

#[tokio::test]
async fn present_scripts_contribute_their_capabilities() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("Plugin.Query", &plugin_query_json("org.test.plugin", &[]));
    write_script(&h.volume_dir(), "SR.attach", &reply("null"));
    write_script(&h.volume_dir(), "Volume.stat", &reply("null"));

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    let features = features_of(&response.result.unwrap());

    assert!(features.contains(&"SR_ATTACH".to_string()));
    assert!(features.contains(&"VDI_UPDATE".to_string()));
    // No script, no capability
    assert!(!features.contains(&"VDI_SNAPSHOT".to_string()));
}

#[tokio::test]
async fn datapath_backed_capabilities_are_unconditional() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("Plugin.Query", &plugin_query_json("org.test.plugin", &[]));

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    let features = features_of(&response.result.unwrap());

    for capability in ["VDI_ATTACH", "VDI_DETACH", "VDI_ACTIVATE", "VDI_DEACTIVATE", "VDI_INTRODUCE"]
    {
        assert!(features.contains(&capability.to_string()), "missing {capability}");
    }
}

#[tokio::test]
async fn clone_capability_implies_reset_on_boot() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("Plugin.Query", &plugin_query_json("org.test.plugin", &[]));
    write_script(&h.volume_dir(), "Volume.clone", &reply("null"));

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    let features = features_of(&response.result.unwrap());

    assert!(features.contains(&"VDI_CLONE".to_string()));
    assert!(features.contains(&"VDI_RESET_ON_BOOT/2".to_string()));
}

#[tokio::test]
async fn without_clone_there_is_no_reset_on_boot() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("Plugin.Query", &plugin_query_json("org.test.plugin", &[]));

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    let features = features_of(&response.result.unwrap());

    assert!(!features.contains(&"VDI_RESET_ON_BOOT/2".to_string()));
}

#[tokio::test]
async fn uri_option_is_prepended_to_configuration() {
    let h = Harness::new("org.test.plugin");
    let mut query: serde_json::Value =
        serde_json::from_str(&plugin_query_json("org.test.plugin", &[])).unwrap();
    query["configuration"] = json!([["log", "logging verbosity"]]);
    h.volume_script("Plugin.Query", &query.to_string());

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    let result = response.result.unwrap();
    let configuration = result["configuration"].as_array().unwrap();

    assert_eq!(configuration[0][0], "uri");
    assert_eq!(configuration[0][1], "URI of the storage medium");
    assert_eq!(configuration[1][0], "log");
}

#[tokio::test]
async fn query_reports_the_plugin_as_driver() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("Plugin.Query", &plugin_query_json("org.test.plugin", &[]));

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    assert_eq!(response.result.unwrap()["driver"], "org.test.plugin");
}

#[tokio::test]
async fn diagnostics_pass_through() {
    let h = Harness::new("org.test.plugin");
    h.volume_script("Plugin.diagnostics", "\"all healthy\"");

    let response = h.call("Query.diagnostics", json!({"dbg": "t"})).await;
    assert_eq!(response.result.unwrap(), "all healthy");
}

#[tokio::test]
async fn missing_plugin_query_fails_script_missing() {
    let h = Harness::new("org.test.plugin");

    let response = h.call("Query.query", json!({"dbg": "t"})).await;
    assert_eq!(response.error.unwrap().code, "SCRIPT_MISSING");
}
