// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders for fake script-backed plugins used across tests.

use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde_json::json;

/// Write an executable `/bin/sh` script implementing one operation.
pub(crate) fn write_script(plugin_dir: &Path, operation: &str, body: &str) -> PathBuf {
    std::fs::create_dir_all(plugin_dir).unwrap();
    let path = plugin_dir.join(operation);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Script body: consume the request, print `json`.
pub(crate) fn reply(json: &str) -> String {
    format!("cat > /dev/null\nprintf '%s' '{json}'")
}

/// Script body: append `"<tag> <request>"` to `log`, print `json`.
pub(crate) fn reply_logged(tag: &str, log: &Path, json: &str) -> String {
    format!(
        "req=$(cat)\necho \"{tag} $req\" >> \"{}\"\nprintf '%s' '{json}'",
        log.display()
    )
}

/// A backend volume record as a plugin script would print it.
pub(crate) fn volume_json(key: &str, uris: &[&str], keys: &[(&str, &str)]) -> String {
    let keys: BTreeMap<&str, &str> = keys.iter().cloned().collect();
    json!({
        "key": key,
        "uuid": format!("{key}-uuid"),
        "name": format!("{key}-name"),
        "description": format!("{key}-description"),
        "read_write": true,
        "virtual_size": 1_073_741_824u64,
        "physical_utilisation": 1_048_576u64,
        "sharable": false,
        "uri": uris,
        "keys": keys,
    })
    .to_string()
}

/// A `Plugin.Query` reply.
pub(crate) fn plugin_query_json(plugin: &str, features: &[&str]) -> String {
    json!({
        "plugin": plugin,
        "name": format!("{plugin} plugin"),
        "description": "test plugin",
        "vendor": "Test Vendor",
        "copyright": "(C) Test Vendor",
        "version": "1.0",
        "required_api_version": "5.0",
        "features": features,
        "configuration": [],
        "required_cluster_stack": [],
    })
    .to_string()
}
