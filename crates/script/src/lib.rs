// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script invocation: path resolution and the subprocess RPC protocol.
//!
//! A backend operation is an executable file invoked as `<script> --json`
//! with a JSON request on stdin; it answers with JSON on stdout and its
//! exit status.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod paths;
mod runner;

pub use paths::{Kind, ScriptDir};
pub use runner::{probe, run_script};
