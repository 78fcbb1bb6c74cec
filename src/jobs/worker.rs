// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Worker pool draining the job queue.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Job, JobOutcome, RetryPolicy, run_with_retry};
use crate::config::types::JobsConfig;
use crate::error::{SyncError, SyncResult};
use crate::sync::Synchronizer;

/// Sending side of the job queue; cheap to clone.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: flume::Sender<Job>,
}

impl JobQueue {
    /// Unbounded queue and its receiving end.
    pub(super) fn channel() -> (Self, flume::Receiver<Job>) {
        let (sender, receiver) = flume::unbounded();
        (Self { sender }, receiver)
    }

    /// Queues a job.
    ///
    /// # Errors
    ///
    /// Fails once the worker pool has stopped.
    pub fn enqueue(&self, job: Job) -> SyncResult<()> {
        debug!(job = %job, "job queued");
        self.sender
            .send(job)
            .map_err(|e| SyncError::other(format!("job queue is closed, dropped {}", e.into_inner())))
    }

    /// Jobs waiting for a worker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Counts of one worker pool run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub done: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Extra attempts caused by busy checkouts.
    pub retries: usize,
}

impl JobSummary {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Done { attempts } => {
                self.done += 1;
                self.retries += attempts.saturating_sub(1) as usize;
            }
            JobOutcome::Failed { attempts } => {
                self.failed += 1;
                self.retries += attempts.saturating_sub(1) as usize;
            }
            JobOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Runs queued jobs on at most `workers` tasks at once.
#[derive(Debug)]
pub struct WorkerPool {
    sync: Synchronizer,
    receiver: flume::Receiver<Job>,
    permits: Arc<Semaphore>,
    policy: RetryPolicy,
}

impl WorkerPool {
    /// Creates the pool and the queue feeding it.
    #[must_use]
    pub fn new(sync: Synchronizer, config: &JobsConfig) -> (Self, JobQueue) {
        let (queue, receiver) = JobQueue::channel();
        let pool = Self {
            sync,
            receiver,
            permits: Arc::new(Semaphore::new(config.workers.max(1))),
            policy: RetryPolicy::from_config(config),
        };
        (pool, queue)
    }

    /// Runs jobs until every queue handle is dropped or `cancel` fires,
    /// then waits for the jobs in flight.
    pub async fn run(self, cancel: CancellationToken) -> JobSummary {
        let mut summary = JobSummary::default();
        let mut running: JoinSet<JobOutcome> = JoinSet::new();
        info!(workers = self.permits.available_permits(), "worker pool started");

        loop {
            let job = tokio::select! {
                () = cancel.cancelled() => break,
                received = self.receiver.recv_async() => match received {
                    Ok(job) => job,
                    Err(_) => break,
                },
            };
            let permit = tokio::select! {
                () = cancel.cancelled() => {
                    summary.record(JobOutcome::Cancelled);
                    break;
                }
                permit = Arc::clone(&self.permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            while let Some(finished) = running.try_join_next() {
                collect(&mut summary, finished);
            }

            let sync = self.sync.clone();
            let policy = self.policy;
            let token = cancel.clone();
            running.spawn(async move {
                let outcome = run_with_retry(&sync, &job, policy, &token).await;
                drop(permit);
                outcome
            });
        }

        while let Some(finished) = running.join_next().await {
            collect(&mut summary, finished);
        }
        summary.cancelled += self.receiver.drain().count();
        info!(
            done = summary.done,
            failed = summary.failed,
            cancelled = summary.cancelled,
            retries = summary.retries,
            "worker pool stopped"
        );
        summary
    }
}

fn collect(summary: &mut JobSummary, finished: Result<JobOutcome, tokio::task::JoinError>) {
    match finished {
        Ok(outcome) => summary.record(outcome),
        Err(e) => {
            warn!(error = %e, "job task panicked");
            summary.failed += 1;
        }
    }
}
