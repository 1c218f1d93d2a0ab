//! Queue worker: drains eligible fetch tasks through the resolver.
//!
//! There is no task leasing. Two workers on the same database may process
//! the same task; resolution is idempotent and task updates are
//! last-write-wins, so the cost is only duplicated API calls.

use chrono::{DateTime, Utc};
use redmusical_db::{queue, OperationError};
use redmusical_spotify::CatalogApi;
use rusqlite::Connection;
use thiserror::Error;
use tokio::time::Duration;

use crate::progress::WorkerProgress;
use crate::resolver::CatalogResolver;

pub const DEFAULT_BATCH_LIMIT: u32 = 5;
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_secs(30);
/// Pause between batches while the queue still has work.
pub const BUSY_DELAY: Duration = Duration::from_secs(1);

const MIN_IDLE_SLEEP: Duration = Duration::from_secs(1);
const BACKOFF_STEP_SECS: i64 = 60;
const BACKOFF_CAP_SECS: i64 = 300;

/// Delay before a task that has failed `attempts` times may run again:
/// 60s per attempt, capped at 5 minutes.
pub fn backoff(attempts: u32) -> chrono::Duration {
    let secs = (BACKOFF_STEP_SECS * i64::from(attempts.max(1))).min(BACKOFF_CAP_SECS);
    chrono::Duration::seconds(secs)
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Queue database error: {0}")]
    Db(#[from] OperationError),
}

/// Options for [`QueueWorker::run`].
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Maximum tasks per batch.
    pub limit: u32,
    /// Keep polling instead of running a single batch.
    pub run_loop: bool,
    /// Sleep after a batch that found nothing. Clamped to at least 1s.
    pub idle_sleep: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_BATCH_LIMIT,
            run_loop: false,
            idle_sleep: DEFAULT_IDLE_SLEEP,
        }
    }
}

impl WorkerOptions {
    pub fn effective_idle_sleep(&self) -> Duration {
        self.idle_sleep.max(MIN_IDLE_SLEEP)
    }
}

/// Outcome of one batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub picked: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub tracks_created: u32,
    pub warnings: u32,
    /// Resolved, but the success could not be written to the queue. The
    /// task keeps its prior state and is picked up again later.
    pub unrecorded: u32,
}

impl BatchStats {
    /// True if the batch pulled at least one task, whatever the outcome.
    pub fn did_process(&self) -> bool {
        self.picked > 0
    }
}

pub struct QueueWorker<'a, A> {
    conn: &'a Connection,
    api: &'a A,
}

impl<'a, A: CatalogApi> QueueWorker<'a, A> {
    pub fn new(conn: &'a Connection, api: &'a A) -> Self {
        Self { conn, api }
    }

    /// Process up to `limit` eligible tasks, oldest first.
    pub async fn run_once(
        &self,
        limit: u32,
        progress: &dyn WorkerProgress,
    ) -> Result<BatchStats, WorkerError> {
        self.process_batch(limit, Utc::now, progress).await
    }

    /// [`run_once`](Self::run_once) with a fixed notion of "now", used both
    /// for eligibility and for the recorded timestamps.
    pub async fn run_once_at(
        &self,
        limit: u32,
        now: DateTime<Utc>,
        progress: &dyn WorkerProgress,
    ) -> Result<BatchStats, WorkerError> {
        self.process_batch(limit, || now, progress).await
    }

    /// Run one batch, or poll forever when `options.run_loop` is set.
    ///
    /// In loop mode a failing poll is logged and treated like an empty
    /// queue; the loop only ends when the future is dropped.
    pub async fn run(
        &self,
        options: &WorkerOptions,
        progress: &dyn WorkerProgress,
    ) -> Result<BatchStats, WorkerError> {
        if !options.run_loop {
            return self.run_once(options.limit, progress).await;
        }

        let idle_sleep = options.effective_idle_sleep();
        loop {
            let processed = match self.run_once(options.limit, progress).await {
                Ok(stats) => stats.did_process(),
                Err(e) => {
                    log::error!("Queue poll failed: {}", e);
                    false
                }
            };

            if processed {
                tokio::time::sleep(BUSY_DELAY).await;
            } else {
                progress.on_idle(idle_sleep);
                tokio::time::sleep(idle_sleep).await;
            }
        }
    }

    async fn process_batch(
        &self,
        limit: u32,
        clock: impl Fn() -> DateTime<Utc>,
        progress: &dyn WorkerProgress,
    ) -> Result<BatchStats, WorkerError> {
        let tasks = queue::eligible_tasks(self.conn, clock(), limit)?;
        let mut stats = BatchStats {
            picked: tasks.len() as u32,
            ..Default::default()
        };
        if tasks.is_empty() {
            return Ok(stats);
        }
        progress.on_batch(tasks.len());

        let resolver = CatalogResolver::new(self.conn, self.api);
        for task in &tasks {
            let attempts = task.attempts.saturating_add(1);
            let result = resolver.resolve_track(&task.external_id).await;
            let now = clock();

            match result {
                Ok(resolved) => {
                    stats.tracks_created += resolved.created.tracks;
                    stats.warnings += resolved.warnings.len() as u32;
                    if let Err(e) = queue::mark_task_success(self.conn, task.id, attempts, now) {
                        log::error!("Could not mark {} as done: {}", task.external_id, e);
                        stats.unrecorded += 1;
                        continue;
                    }
                    stats.succeeded += 1;
                    progress.on_task_success(task, &resolved);
                }
                Err(error) => {
                    stats.failed += 1;
                    let retry_at = now + backoff(attempts);
                    log::debug!(
                        "Fetch of {} failed on attempt {}: {}",
                        task.external_id,
                        attempts,
                        error
                    );
                    if let Err(e) = queue::mark_task_error(
                        self.conn,
                        task.id,
                        attempts,
                        &error.to_string(),
                        retry_at,
                        now,
                    ) {
                        log::error!("Could not record failure of {}: {}", task.external_id, e);
                    }
                    progress.on_task_error(task, &error, retry_at);
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly_to_cap() {
        let secs: Vec<i64> = (1..=7).map(|n| backoff(n).num_seconds()).collect();
        assert_eq!(secs, vec![60, 120, 180, 240, 300, 300, 300]);
        assert_eq!(backoff(0).num_seconds(), 60);
        assert_eq!(backoff(u32::MAX).num_seconds(), 300);
    }

    #[test]
    fn idle_sleep_is_at_least_one_second() {
        let options = WorkerOptions {
            idle_sleep: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(options.effective_idle_sleep(), Duration::from_secs(1));
        assert_eq!(
            WorkerOptions::default().effective_idle_sleep(),
            DEFAULT_IDLE_SLEEP
        );
    }
}
