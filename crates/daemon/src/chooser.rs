// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Selection of the datapath used to attach a volume.

use url::Url;

use ss_core::{SmError, Volume, FEATURE_NONPERSISTENT};

use crate::registry::DatapathRegistry;

/// The domain datapath operations run against.
const CONTROL_DOMAIN: &str = "0";

/// A chosen attachment route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datapath {
    /// Registered datapath plugin name (the URI scheme).
    pub name: String,
    /// The volume URI handled by that plugin.
    pub uri: String,
    pub domain: String,
}

/// Pick the datapath for `volume` from its candidate URIs.
///
/// Candidates without a parseable scheme or without a registered plugin
/// are discarded. With `persistent` the volume's URI order is preserved;
/// otherwise candidates whose plugin natively supports non-persistent
/// sessions are stably moved to the front. The first survivor wins.
pub fn choose_datapath(
    registry: &DatapathRegistry,
    volume: &Volume,
    persistent: bool,
) -> Result<Datapath, SmError> {
    let mut candidates: Vec<(String, String)> = volume
        .uri
        .iter()
        .filter_map(|uri| Url::parse(uri).ok().map(|parsed| (parsed.scheme().to_string(), uri.clone())))
        .filter(|(scheme, _)| registry.contains(scheme))
        .collect();

    if !persistent {
        let (native, rest): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|(scheme, _)| registry.supports(scheme, FEATURE_NONPERSISTENT));
        candidates = native.into_iter().chain(rest).collect();
    }

    candidates
        .into_iter()
        .next()
        .map(|(name, uri)| Datapath { name, uri, domain: CONTROL_DOMAIN.to_string() })
        .ok_or(SmError::MissingUri)
}

#[cfg(test)]
#[path = "chooser_tests.rs"]
mod tests;
