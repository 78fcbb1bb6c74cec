// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async process spawning for the VCS binaries and addon tools.
//!
//! ```text
//! ProcessBuilder::new("git")
//!   .args() .cwd() .env_var() .capture_output()
//!   .run()
//!       --> tokio::process::Command
//!           stdout/stderr reader tasks (JoinHandle<String>)
//!           optional timeout
//!       --> ProcessOutput { exit_code, stdout, stderr }
//!       --> ProcessError::NonZeroExit { stdout, stderr } outside success codes
//! ```

pub mod builder;
mod io;
mod runner;

pub use builder::{ProcessBuilder, ProcessFlags, ProcessOutput, StreamFlags};
