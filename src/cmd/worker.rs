// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Worker and daily commands.
//!
//! ```text
//! worker:
//!   register --> after-setup(missing checkouts) + update(others)
//!   Scheduler --hourly--> JobQueue --> WorkerPool
//!   Ctrl-C --> cancel token --> drain, summary
//! ```

use chrono::{Duration as ChronoDuration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::worker::{DailyArgs, WorkerArgs};
use crate::db;
use crate::error::Result;
use crate::jobs::{Job, JobQueue, Scheduler, WorkerPool};
use crate::sync::Synchronizer;

/// Queues the jobs bringing every registered component up to date.
async fn enqueue_startup(sync: &Synchronizer, queue: &JobQueue) -> Result<()> {
    let mut missing = Vec::new();
    for component in db::components::list(sync.pool()).await? {
        let handle = sync.open(&component).await?;
        if handle.repository.is_valid() {
            queue.enqueue(Job::Update {
                component_id: component.id,
            })?;
        } else {
            missing.push(component.id);
        }
    }
    if !missing.is_empty() {
        queue.enqueue(Job::AfterSetup {
            component_ids: missing,
        })?;
    }
    Ok(())
}

/// Runs the job workers, and the scheduler unless disabled, until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the startup jobs cannot be planned.
pub async fn run_worker_command(args: &WorkerArgs, sync: Synchronizer) -> Result<()> {
    let mut jobs = sync.config().jobs.clone();
    if let Some(workers) = args.workers {
        jobs.workers = workers;
    }

    let cancel = CancellationToken::new();
    let (pool, queue) = WorkerPool::new(sync.clone(), &jobs);

    if !args.no_setup {
        enqueue_startup(&sync, &queue).await?;
    }

    let scheduler = (!args.no_scheduler).then(|| {
        let scheduler = Scheduler::new(queue.clone(), jobs.changes_retention_days);
        tokio::spawn(scheduler.run(cancel.child_token()))
    });

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, finishing running jobs");
        } else {
            warn!("cannot listen for Ctrl-C");
        }
        interrupt.cancel();
    });

    info!(workers = jobs.workers, scheduler = scheduler.is_some(), "worker started");
    drop(queue);
    let summary = pool.run(cancel.clone()).await;
    cancel.cancel();
    if let Some(handle) = scheduler {
        let ticks = handle.await.unwrap_or_default();
        info!(ticks, "scheduler stopped");
    }

    println!(
        "{} done, {} failed, {} cancelled, {} retries",
        summary.done, summary.failed, summary.cancelled, summary.retries
    );
    Ok(())
}

/// Runs the daily maintenance once, in the foreground.
///
/// # Errors
///
/// Returns lock and store errors.
pub async fn run_daily_command(args: &DailyArgs, sync: &Synchronizer) -> Result<()> {
    let hours = args.hour.map_or(0..24, |hour| hour..hour + 1);
    let mut ran = 0;
    for hour in hours {
        ran += sync.daily(hour).await?;
    }
    println!("daily addons ran on {ran} components");

    if args.commit_sweep {
        let committed = sync.commit_sweep().await?;
        println!("{committed} components committed");
    }
    if args.cleanup_changes {
        let days = sync.config().jobs.changes_retention_days;
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(days));
        let deleted = db::changes::delete_older_than(sync.pool(), cutoff).await?;
        println!("{deleted} changes older than {days} days removed");
    }
    Ok(())
}
