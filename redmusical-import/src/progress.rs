//! Worker progress reporting.

use chrono::{DateTime, Utc};
use redmusical_catalog::types::{FetchTask, Track};
use tokio::time::Duration;

use crate::resolver::{ResolveError, Resolved};

/// Trait for receiving queue worker progress updates.
pub trait WorkerProgress {
    /// Called when a batch of eligible tasks has been selected.
    fn on_batch(&self, picked: usize);

    /// Called after a task's track was resolved and the task marked done.
    fn on_task_success(&self, task: &FetchTask, resolved: &Resolved<Track>);

    /// Called after a task failed and was rescheduled.
    fn on_task_error(&self, task: &FetchTask, error: &ResolveError, retry_at: DateTime<Utc>);

    /// Called before the loop sleeps on an empty queue.
    fn on_idle(&self, sleep: Duration);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl WorkerProgress for SilentProgress {
    fn on_batch(&self, _picked: usize) {}
    fn on_task_success(&self, _task: &FetchTask, _resolved: &Resolved<Track>) {}
    fn on_task_error(&self, _task: &FetchTask, _error: &ResolveError, _retry_at: DateTime<Utc>) {}
    fn on_idle(&self, _sleep: Duration) {}
}
