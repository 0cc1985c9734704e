// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::time::Duration;

/// Backoff before restarting the watcher pair after a crash
/// (default 5s, configurable via `SSD_RESTART_BACKOFF_MS`).
pub fn restart_backoff() -> Duration {
    std::env::var("SSD_RESTART_BACKOFF_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}
