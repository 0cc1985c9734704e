// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin self-description, backend and manager shapes.

use serde::{Deserialize, Serialize};

/// What a plugin's `Plugin.Query` script declares about itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginMetadata {
    pub plugin: String,
    pub name: String,
    pub description: String,
    pub vendor: String,
    pub copyright: String,
    pub version: String,
    pub required_api_version: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// Ordered (key, description) pairs of supported configuration options.
    #[serde(default)]
    pub configuration: Vec<(String, String)>,
    #[serde(default)]
    pub required_cluster_stack: Vec<String>,
}

/// The manager-facing `Query.query` result. Identical to
/// [`PluginMetadata`] except that the plugin identifier is reported under
/// `driver` and the feature set has been through capability composition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResult {
    pub driver: String,
    pub name: String,
    pub description: String,
    pub vendor: String,
    pub copyright: String,
    pub version: String,
    pub required_api_version: String,
    pub features: Vec<String>,
    pub configuration: Vec<(String, String)>,
    pub required_cluster_stack: Vec<String>,
}
