// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External-service contracts and their concrete adapters.
//!
//! The daemon only depends on the traits here; production wiring picks the
//! switch-backed implementations, tests pick the fakes.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod metrics;

pub use metrics::{Frequency, MetricsApi, MetricsError, SwitchMetrics};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMetrics, MetricsCall};
