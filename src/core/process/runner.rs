// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process execution.
//!
//! ```text
//!          run()
//!            |
//!            v
//!     build_command()
//!     args, cwd, env, stdio
//!            |
//!            v
//!         spawn() --> run_child()
//!            |
//!            v
//!    validate exit_code
//!    (skip if ALLOW_FAILURE)
//!            |
//!            v
//!      ProcessOutput
//! ```

use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

use super::builder::{ProcessBuilder, ProcessFlags, ProcessOutput, StreamFlags};
use crate::error::ProcessError;

impl ProcessBuilder {
    /// Returns the display name for this process.
    fn display_name(&self) -> String {
        self.name_override().map_or_else(
            || {
                self.program().file_stem().map_or_else(
                    || "process".to_string(),
                    |s| s.to_string_lossy().into_owned(),
                )
            },
            String::from,
        )
    }

    /// Returns the command line as a string for logs and errors.
    #[must_use]
    pub fn command_line(&self) -> String {
        use std::fmt::Write as _;

        let mut cmd = self.display_name();
        if self.process_flags().contains(ProcessFlags::HIDE_ARGS) {
            if let Some(first) = self.args_slice().first() {
                let _ = write!(cmd, " {first} ...");
            }
            return cmd;
        }
        for arg in self.args_slice() {
            if arg.is_empty() || arg.contains([' ', '\n', '"']) {
                let _ = write!(cmd, " {arg:?}");
            } else {
                let _ = write!(cmd, " {arg}");
            }
        }
        cmd
    }

    /// Spawns and runs the process, waiting for completion.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if:
    /// - Spawning the child process fails.
    /// - The process times out.
    /// - The process exits outside the success codes (and `ALLOW_FAILURE` is not set).
    pub async fn run(self) -> Result<ProcessOutput, ProcessError> {
        let cmd_line = self.command_line();

        if let Some(cwd) = self.working_dir() {
            debug!(cwd = %cwd.display(), cmd = %cmd_line, "exec");
        } else {
            debug!(cmd = %cmd_line, "exec");
        }

        let mut child = self
            .build_command()
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                command: cmd_line.clone(),
                source,
            })?;
        trace!(cmd = %cmd_line, pid = ?child.id(), "spawned");

        let output = self.run_child(&cmd_line, &mut child).await?;

        if !self.process_flags().contains(ProcessFlags::ALLOW_FAILURE)
            && !self.success_code_set().contains(&output.exit_code())
        {
            debug!(cmd = %cmd_line, exit_code = output.exit_code(), stderr = %output.stderr(), "failed");
            return Err(ProcessError::NonZeroExit {
                command: cmd_line,
                code: output.exit_code(),
                stdout: output.stdout().to_string(),
                stderr: output.stderr().to_string(),
            });
        }

        trace!(cmd = %cmd_line, exit_code = output.exit_code(), "completed");
        Ok(output)
    }

    fn build_command(&self) -> Command {
        let mut command = Command::new(self.program());
        command.args(self.args_slice());

        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }
        command.envs(self.environment());

        if self.stdin_content().is_some() {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::null());
        }
        command.stdout(Self::stdio_from_flags(self.stdout_flags()));
        command.stderr(Self::stdio_from_flags(self.stderr_flags()));
        command.kill_on_drop(true);

        command
    }

    fn stdio_from_flags(flags: StreamFlags) -> Stdio {
        if flags.contains(StreamFlags::BIT_BUCKET) {
            Stdio::null()
        } else {
            Stdio::piped()
        }
    }
}
