// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switch services: one Unix socket per queue, one exchange per connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::framing::{decode, encode, read_message, write_message, ProtocolError};
use crate::rpc::{RpcRequest, RpcResponse};

/// Errors from binding or calling a switch queue.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("failed to bind queue socket {0}: {1}")]
    Bind(PathBuf, std::io::Error),

    #[error("failed to connect to {0}: {1}")]
    Connect(PathBuf, std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-queue request handler.
#[async_trait]
pub trait RpcHandler: Send + Sync + 'static {
    async fn handle(&self, request: RpcRequest) -> RpcResponse;
}

/// The socket path of a queue in a switch directory.
pub fn queue_path(switch_dir: &Path, queue: &str) -> PathBuf {
    switch_dir.join(queue)
}

/// A bound queue service. Dropping the handle leaves the accept task
/// running; call [`Service::shutdown`] to stop it and unlink the socket.
pub struct Service {
    queue: String,
    socket_path: PathBuf,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Service {
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Stop accepting, wait for the accept loop, and unlink the socket.
    /// In-flight connection tasks complete on their own.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.task.await;
        if let Err(e) = tokio::fs::remove_file(&self.socket_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(socket = %self.socket_path.display(), error = %e, "failed to unlink queue socket");
            }
        }
        info!(queue = %self.queue, "queue service stopped");
    }
}

/// Bind a queue service in `switch_dir`, spawning its accept loop.
pub async fn bind(
    switch_dir: &Path,
    queue: &str,
    handler: Arc<dyn RpcHandler>,
) -> Result<Service, SwitchError> {
    tokio::fs::create_dir_all(switch_dir).await?;

    let socket_path = queue_path(switch_dir, queue);
    // A stale socket from a previous run would make bind fail.
    match tokio::fs::remove_file(&socket_path).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let listener =
        UnixListener::bind(&socket_path).map_err(|e| SwitchError::Bind(socket_path.clone(), e))?;
    let token = CancellationToken::new();

    let accept_token = token.clone();
    let accept_queue = queue.to_string();
    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = accept_token.cancelled() => break,
                result = listener.accept() => match result {
                    Ok((stream, _)) => {
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, handler).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!(queue = %accept_queue, "accept error: {}", e),
                },
            }
        }
    });

    info!(queue, socket = %socket_path.display(), "queue service bound");
    Ok(Service { queue: queue.to_string(), socket_path, token, task })
}

/// Handle a single client connection: one framed request, one framed reply.
async fn serve_connection(
    stream: UnixStream,
    handler: Arc<dyn RpcHandler>,
) -> Result<(), ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();

    let request: RpcRequest = decode(&read_message(&mut reader).await?)?;
    let response = handler.handle(request).await;
    write_message(&mut writer, &encode(&response)?).await
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::ConnectionClosed => debug!("client disconnected"),
        _ => error!("connection error: {}", e),
    }
}

/// Send one request to a queue socket and wait for the reply.
pub async fn call(socket: &Path, request: &RpcRequest) -> Result<RpcResponse, SwitchError> {
    let mut stream = UnixStream::connect(socket)
        .await
        .map_err(|e| SwitchError::Connect(socket.to_path_buf(), e))?;

    write_message(&mut stream, &encode(request)?).await?;
    Ok(decode(&read_message(&mut stream).await?)?)
}

#[cfg(test)]
#[path = "switch_tests.rs"]
mod tests;
