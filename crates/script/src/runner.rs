// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess RPC: run one script with a typed request and response.

use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::Stdio;

use nix::sys::signal::Signal;
use nix::unistd::{access, AccessFlags};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use ss_core::{ScriptFailure, SmError};

/// Whether `script` names an existing regular file the daemon may execute.
/// Used by `Query.query` to probe optional operations.
pub fn probe(script: &Path) -> bool {
    // metadata follows symlinks
    match std::fs::metadata(script) {
        Ok(meta) => meta.is_file() && access(script, AccessFlags::X_OK).is_ok(),
        Err(_) => false,
    }
}

/// Invoke `script --json` with `request` on stdin and parse its reply.
///
/// Failure encoding, in order of checks:
/// - not a regular file → `SCRIPT_MISSING`
/// - no execute permission → `SCRIPT_NOT_EXECUTABLE`
/// - spawn error, unparseable output, or death by signal → `SCRIPT_FAILED`
/// - non-zero exit with a parseable `{code, params, backtrace}` payload →
///   the backend's own error, preserved
pub async fn run_script<Req, Resp>(script: &Path, cwd: &Path, request: &Req) -> Result<Resp, SmError>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let meta = match tokio::fs::metadata(script).await {
        Ok(meta) => meta,
        Err(_) => return Err(SmError::ScriptMissing(script.to_path_buf())),
    };
    if !meta.is_file() {
        return Err(SmError::ScriptMissing(script.to_path_buf()));
    }
    if access(script, AccessFlags::X_OK).is_err() {
        return Err(SmError::ScriptNotExecutable(script.to_path_buf()));
    }

    let payload = serde_json::to_vec(request).map_err(SmError::internal)?;

    let mut child = tokio::process::Command::new(script)
        .arg("--json")
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SmError::ScriptFailed {
            params: vec![script.display().to_string(), e.to_string()],
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // A script may exit without reading its request; the exit status
        // decode below still governs the outcome.
        if let Err(e) = stdin.write_all(&payload).await {
            debug!(script = %script.display(), error = %e, "failed to write script request");
        }
        drop(stdin); // close pipe to signal EOF
    }

    let output = child.wait_with_output().await.map_err(|e| SmError::ScriptFailed {
        params: vec![script.display().to_string(), e.to_string()],
    })?;

    if !output.stderr.is_empty() {
        debug!(
            script = %script.display(),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "script stderr"
        );
    }

    decode_output(script, output)
}

fn decode_output<Resp: DeserializeOwned>(
    script: &Path,
    output: std::process::Output,
) -> Result<Resp, SmError> {
    if output.status.success() {
        return serde_json::from_slice(&output.stdout).map_err(|e| SmError::ScriptFailed {
            params: vec![
                format!("{} succeeded but returned an unexpected response", script.display()),
                String::from_utf8_lossy(&output.stdout).into_owned(),
                e.to_string(),
            ],
        });
    }

    if let Some(code) = output.status.code() {
        return match serde_json::from_slice::<ScriptFailure>(&output.stdout) {
            Ok(failure) => Err(SmError::Backend {
                code: failure.code,
                params: failure.params,
                backtrace: failure.backtrace,
            }),
            Err(_) => Err(SmError::ScriptFailed {
                params: vec![
                    script.display().to_string(),
                    format!("exit {code}"),
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                ],
            }),
        };
    }

    let signal = output
        .status
        .signal()
        .and_then(|s| Signal::try_from(s).ok())
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| "unknown signal".to_string());
    Err(SmError::ScriptFailed {
        params: vec![script.display().to_string(), format!("killed by {signal}")],
    })
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
