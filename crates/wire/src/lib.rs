// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC transport for per-plugin switch queues.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. Each
//! queue is a Unix socket in the switch directory; one request/response
//! exchange per connection.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod framing;
mod rpc;
mod switch;

pub use framing::{decode, encode, read_message, write_message, ProtocolError, MAX_MESSAGE_SIZE};
pub use rpc::{RpcError, RpcRequest, RpcResponse};
pub use switch::{bind, call, queue_path, RpcHandler, Service, SwitchError};
