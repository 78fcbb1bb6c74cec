// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Background jobs.
//!
//! ```text
//! Scheduler (hourly tick)        CLI / addons
//!     commit-sweep                   update(id), commit(id), push(id)
//!     daily(hour)                    after-setup(ids)
//!     cleanup-changes(days)               |
//!            |                            |
//!            +-------> JobQueue (flume) <-+
//!                          |
//!                          v
//!                 WorkerPool  (semaphore bounded tokio tasks)
//!                          |
//!                  run_with_retry(job)
//!                    lock timeout? --> sleep base * 2^n --> again
//!                    other error   --> logged, counted as failed
//! ```
//!
//! Jobs carry ids and numbers only; everything else is reloaded from the
//! store when the job runs.

mod scheduler;
mod worker;


use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use scheduler::{Scheduler, jobs_for_hour};
pub use worker::{JobQueue, JobSummary, WorkerPool};

use crate::config::types::JobsConfig;
use crate::db;
use crate::error::{SyncError, SyncResult};
use crate::sync::Synchronizer;

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "job", rename_all = "kebab-case")]
pub enum Job {
    Update { component_id: i64 },
    Commit { component_id: i64 },
    Push { component_id: i64 },
    /// Commits changes older than each component's `commit_pending_age`.
    CommitSweep,
    /// Runs `DAILY` addons of the components sharded to `hour`.
    Daily { hour: u32 },
    /// Drops audit rows older than `days`.
    CleanupChanges { days: u32 },
    /// Clones and scans freshly registered components.
    AfterSetup { component_ids: Vec<i64> },
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update { component_id } => write!(f, "update({component_id})"),
            Self::Commit { component_id } => write!(f, "commit({component_id})"),
            Self::Push { component_id } => write!(f, "push({component_id})"),
            Self::CommitSweep => f.write_str("commit-sweep"),
            Self::Daily { hour } => write!(f, "daily({hour})"),
            Self::CleanupChanges { days } => write!(f, "cleanup-changes({days})"),
            Self::AfterSetup { component_ids } => write!(f, "after-setup({component_ids:?})"),
        }
    }
}

impl Job {
    /// Runs the job once.
    ///
    /// # Errors
    ///
    /// Returns the error of the synchronizer operation.
    pub async fn execute(&self, sync: &Synchronizer) -> SyncResult<()> {
        match self {
            Self::Update { component_id } => {
                let outcome = sync.update(*component_id, false).await?;
                debug!(component_id, ?outcome, "update job done");
            }
            Self::Commit { component_id } => {
                let report = sync.commit_pending(*component_id).await?;
                debug!(component_id, translations = report.translations, "commit job done");
            }
            Self::Push { component_id } => {
                let outcome = sync.push(*component_id).await?;
                debug!(component_id, ?outcome, "push job done");
            }
            Self::CommitSweep => {
                sync.commit_sweep().await?;
            }
            Self::Daily { hour } => {
                sync.daily(*hour).await?;
            }
            Self::CleanupChanges { days } => {
                let cutoff = Utc::now() - ChronoDuration::days(i64::from(*days));
                let deleted = db::changes::delete_older_than(sync.pool(), cutoff).await?;
                info!(days, deleted, "old changes removed");
            }
            Self::AfterSetup { component_ids } => {
                for &component_id in component_ids {
                    sync.setup_component(component_id).await?;
                }
            }
        }
        Ok(())
    }
}

/// Retry settings for lock timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn from_config(config: &JobsConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Wait before attempt `attempt + 1`, doubling per failed attempt.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1_u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Done { attempts: u32 },
    Failed { attempts: u32 },
    Cancelled,
}

/// Runs `attempt` until it succeeds, fails with something other than a
/// lock timeout, or the attempts are used up.
pub async fn retry<F, Fut>(
    label: &str,
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut attempt: F,
) -> (JobOutcome, Option<SyncError>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SyncResult<()>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        if cancel.is_cancelled() {
            return (JobOutcome::Cancelled, None);
        }
        attempts += 1;
        match attempt().await {
            Ok(()) => return (JobOutcome::Done { attempts }, None),
            Err(e) if e.is_lock_timeout() && attempts < max_attempts => {
                let delay = policy.delay(attempts);
                warn!(job = label, attempt = attempts, delay_ms = delay.as_millis(), "checkout busy, retrying");
                tokio::select! {
                    () = cancel.cancelled() => return (JobOutcome::Cancelled, Some(e)),
                    () = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => return (JobOutcome::Failed { attempts }, Some(e)),
        }
    }
}

/// Runs a job with the lock-timeout retry policy, logging the result.
pub async fn run_with_retry(
    sync: &Synchronizer,
    job: &Job,
    policy: RetryPolicy,
    cancel: &CancellationToken,
) -> JobOutcome {
    let label = job.to_string();
    let (outcome, error) = retry(&label, policy, cancel, || job.execute(sync)).await;
    match (&outcome, error) {
        (JobOutcome::Done { attempts }, _) => debug!(job = %label, attempts, "job finished"),
        (JobOutcome::Failed { attempts }, Some(e)) => {
            warn!(job = %label, attempts, error = %e, "job failed");
        }
        (JobOutcome::Cancelled, _) => info!(job = %label, "job cancelled"),
        (JobOutcome::Failed { .. }, None) => {}
    }
    outcome
}
