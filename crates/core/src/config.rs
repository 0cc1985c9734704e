// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `device_config` mapping attached to SR-level calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::SmError;

/// String-to-string configuration passed by the manager.
///
/// The manager serializes this either as a JSON object or as an
/// association list of pairs (an empty one arrives as `[]`), so
/// deserialization accepts both shapes.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DeviceConfig(BTreeMap<String, String>);

impl DeviceConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The mandatory `uri` entry, or [`SmError::MissingUri`].
    pub fn uri(&self) -> Result<&str, SmError> {
        self.get("uri").ok_or(SmError::MissingUri)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for DeviceConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Map(BTreeMap<String, String>),
            Pairs(Vec<(String, String)>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Map(map) => DeviceConfig(map),
            Repr::Pairs(pairs) => DeviceConfig(pairs.into_iter().collect()),
        })
    }
}

impl<const N: usize> From<[(&str, &str); N]> for DeviceConfig {
    fn from(pairs: [(&str, &str); N]) -> Self {
        DeviceConfig(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
