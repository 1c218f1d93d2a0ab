//! SQLite persistence layer for the music catalog and its fetch queue.
//!
//! Provides schema creation, idempotent get-or-create operations, the
//! fetch-task queue, and read queries backed by SQLite (via rusqlite with
//! bundled feature).

pub mod operations;
pub mod queries;
pub mod queue;
pub mod schema;

pub use operations::{
    add_artist_genres, find_album_by_external_id, find_artist_by_external_id,
    find_artist_by_name, find_track_by_external_id, find_unlinked_artist_by_name,
    get_or_create_album, get_or_create_artist, get_or_create_artist_by_name,
    get_or_create_genre, get_or_create_track, update_artist, OperationError,
};
pub use queries::{album_with_artist, albums_for_artist, catalog_stats, genres_for_artist, tracks_for_album};
pub use queue::{
    eligible_tasks, enqueue_fetch, find_task, format_timestamp, list_tasks, mark_task_error,
    mark_task_success, parse_timestamp, queue_counts,
};
pub use schema::{open_database, open_memory};
