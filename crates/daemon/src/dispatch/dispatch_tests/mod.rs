// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod epoch;
mod helpers;
mod query;
mod sr;

use helpers::Harness;
use serde_json::json;

#[tokio::test]
async fn unknown_method_fails_unimplemented() {
    let h = Harness::new("org.test.plugin");

    let response = h.call("Nope.do", json!({})).await;

    let error = response.error.unwrap();
    assert_eq!(error.code, "UNIMPLEMENTED");
    assert_eq!(error.params, vec!["Nope.do".to_string()]);
}

#[tokio::test]
async fn malformed_params_fail_without_panicking() {
    let h = Harness::new("org.test.plugin");

    // SR.stat requires an `sr` field
    let response = h.call("SR.stat", json!({"dbg": "t"})).await;
    assert_eq!(response.error.unwrap().code, "INTERNAL_ERROR");
}
