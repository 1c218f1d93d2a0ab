//! Ingestion of Spotify tracks into the local music catalog.
//!
//! The [`CatalogResolver`] turns an external track id into local rows
//! (artist, album, every track of a newly seen album). The [`QueueWorker`]
//! drains the fetch-task queue through the resolver and keeps retry
//! bookkeeping.

pub mod progress;
pub mod resolver;
pub mod worker;

pub use progress::{SilentProgress, WorkerProgress};
pub use resolver::{
    CatalogResolver, CreatedCounts, EnrichWarning, ResolveError, Resolved, UNKNOWN_ARTIST,
};
pub use worker::{
    BUSY_DELAY, BatchStats, DEFAULT_BATCH_LIMIT, DEFAULT_IDLE_SLEEP, QueueWorker, WorkerError,
    WorkerOptions, backoff,
};
