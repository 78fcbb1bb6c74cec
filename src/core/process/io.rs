// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! I/O streaming and output capture for processes.
//!
//! ```text
//! run_child()
//!   stdin task (optional)
//!   stdout/stderr reader tasks --> JoinHandle<String>
//!   wait (or timeout --> kill)
//!   --> ProcessOutput { exit_code, stdout, stderr }
//! ```
//!
//! Readers drain their pipe concurrently with `wait`, so large outputs never
//! block the child on a full pipe.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use super::builder::{ProcessBuilder, ProcessOutput, StreamFlags};
use crate::error::ProcessError;

fn spawn_reader<R>(
    stream: Option<R>,
    flags: StreamFlags,
    command: &str,
    stream_name: &'static str,
) -> Option<JoinHandle<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    if !flags.intersects(StreamFlags::FORWARD_TO_LOG | StreamFlags::KEEP_IN_STRING) {
        return None;
    }
    let command = command.to_string();
    stream.map(|stream| {
        tokio::spawn(async move { read_stream(stream, flags, &command, stream_name).await })
    })
}

async fn read_stream<R>(reader: R, flags: StreamFlags, command: &str, stream_name: &str) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut output = String::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if flags.contains(StreamFlags::FORWARD_TO_LOG) {
                    trace!(cmd = %command, stream = %stream_name, line = %line, "output");
                }
                if flags.contains(StreamFlags::KEEP_IN_STRING) {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(cmd = %command, stream = %stream_name, error = %e, "error reading stream");
                break;
            }
        }
    }
    output
}

async fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}

impl ProcessBuilder {
    /// Runs the child process, handling I/O streaming and waiting for completion.
    pub(super) async fn run_child(
        &self,
        command: &str,
        child: &mut Child,
    ) -> Result<ProcessOutput, ProcessError> {
        let io_error = |source| ProcessError::Io {
            command: command.to_string(),
            source,
        };

        let stdout = spawn_reader(child.stdout.take(), self.stdout_flags(), command, "stdout");
        let stderr = spawn_reader(child.stderr.take(), self.stderr_flags(), command, "stderr");

        if let Some(content) = self.stdin_content()
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin.write_all(content.as_bytes()).await.map_err(io_error)?;
            // Dropping stdin closes the pipe so the child sees EOF.
        }

        let status = if let Some(limit) = self.timeout_duration() {
            tokio::select! {
                status = child.wait() => status.map_err(io_error)?,
                () = tokio::time::sleep(limit) => {
                    warn!(cmd = %command, timeout = ?limit, "process timed out");
                    child.kill().await.map_err(io_error)?;
                    return Err(ProcessError::Timeout {
                        command: command.to_string(),
                        timeout_secs: limit.as_secs(),
                    });
                }
            }
        } else {
            child.wait().await.map_err(io_error)?
        };

        let stdout = join_reader(stdout).await;
        let stderr = join_reader(stderr).await;

        Ok(ProcessOutput::new(status.code().unwrap_or(-1), stdout, stderr))
    }
}
