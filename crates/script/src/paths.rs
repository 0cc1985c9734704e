// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script path resolution under the plugin root.

use std::path::{Path, PathBuf};

/// The two disjoint plugin kinds, named after their subdirectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Volume,
    Datapath,
}

impl Kind {
    pub fn dir(self) -> &'static str {
        match self {
            Kind::Volume => "volume",
            Kind::Datapath => "datapath",
        }
    }
}

/// Locates plugin directories and per-operation scripts under a root
/// containing the `volume/` and `datapath/` trees. The root is fixed at
/// daemon startup.
#[derive(Debug, Clone)]
pub struct ScriptDir {
    root: PathBuf,
}

impl ScriptDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ScriptDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory watched for plugins of `kind`.
    pub fn kind_dir(&self, kind: Kind) -> PathBuf {
        self.root.join(kind.dir())
    }

    /// The directory of one plugin; scripts run with this as their
    /// working directory.
    pub fn plugin_dir(&self, kind: Kind, plugin: &str) -> PathBuf {
        self.kind_dir(kind).join(plugin)
    }

    /// The script implementing one operation of one plugin.
    pub fn script(&self, kind: Kind, plugin: &str, operation: &str) -> PathBuf {
        self.plugin_dir(kind, plugin).join(operation)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
