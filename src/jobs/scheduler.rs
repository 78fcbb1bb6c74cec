// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Periodic jobs.

use chrono::{Timelike, Utc};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{Job, JobQueue};

/// Hour at which the audit log is trimmed.
const CLEANUP_HOUR: u32 = 3;

/// Jobs due at `hour` (0-23).
#[must_use]
pub fn jobs_for_hour(hour: u32, retention_days: u32) -> Vec<Job> {
    let hour = hour % 24;
    let mut jobs = vec![Job::CommitSweep, Job::Daily { hour }];
    if hour == CLEANUP_HOUR {
        jobs.push(Job::CleanupChanges { days: retention_days });
    }
    jobs
}

/// Enqueues the periodic jobs on every tick.
#[derive(Debug)]
pub struct Scheduler {
    queue: JobQueue,
    period: Duration,
    retention_days: u32,
}

impl Scheduler {
    #[must_use]
    pub const fn new(queue: JobQueue, retention_days: u32) -> Self {
        Self {
            queue,
            period: Duration::from_secs(60 * 60),
            retention_days,
        }
    }

    #[must_use]
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Ticks until `cancel` fires or the queue closes; returns the number
    /// of ticks.
    pub async fn run(self, cancel: CancellationToken) -> usize {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = 0;
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            ticks += 1;
            let hour = Utc::now().hour();
            for job in jobs_for_hour(hour, self.retention_days) {
                if let Err(e) = self.queue.enqueue(job) {
                    warn!(error = %e, "scheduler stopped");
                    return ticks;
                }
            }
            info!(hour, "periodic jobs queued");
        }
        ticks
    }
}
