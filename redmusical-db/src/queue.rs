//! Persistent fetch-task queue.
//!
//! Producers enqueue external track identifiers; the queue worker selects
//! eligible tasks and records the outcome of each attempt. Timestamps are
//! stored as fixed-width RFC 3339 UTC strings so that SQL text comparison
//! matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use redmusical_catalog::types::{FetchTask, QueueCounts, TaskStatus};
use rusqlite::{params, Connection};

use crate::operations::OperationError;

const TASK_COLUMNS: &str =
    "id, external_id, status, attempts, last_error, next_retry_at, created_at, updated_at";

/// Format a timestamp the way the queue stores it.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored queue timestamp.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Add a pending task for `external_id`.
///
/// Returns `false` if a task for that identifier already exists, in any
/// state. Existing tasks are left untouched.
pub fn enqueue_fetch(
    conn: &Connection,
    external_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, OperationError> {
    let ts = format_timestamp(now);
    let changed = conn.execute(
        "INSERT OR IGNORE INTO fetch_tasks (external_id, status, created_at, updated_at)
         VALUES (?1, 'pending', ?2, ?2)",
        params![external_id, ts],
    )?;
    Ok(changed == 1)
}

/// Look up the task for an external identifier.
pub fn find_task(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<FetchTask>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM fetch_tasks WHERE external_id = ?1"
    ))?;
    let result = stmt.query_row(params![external_id], row_to_task);
    match result {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Select up to `limit` tasks eligible at `now`, oldest first.
///
/// A task is eligible when it is pending, or when it failed and its retry
/// time is at or before `now`. Succeeded tasks are never selected.
pub fn eligible_tasks(
    conn: &Connection,
    now: DateTime<Utc>,
    limit: u32,
) -> Result<Vec<FetchTask>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM fetch_tasks
         WHERE status = 'pending'
            OR (status = 'error' AND next_retry_at IS NOT NULL AND next_retry_at <= ?1)
         ORDER BY created_at, id
         LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![format_timestamp(now), limit], row_to_task)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Record a successful attempt: clears the error and retry time.
pub fn mark_task_success(
    conn: &Connection,
    task_id: i64,
    attempts: u32,
    now: DateTime<Utc>,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE fetch_tasks
         SET status = 'success', attempts = ?2, last_error = '', next_retry_at = NULL,
             updated_at = ?3
         WHERE id = ?1",
        params![task_id, attempts, format_timestamp(now)],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "fetch_task".to_string(),
            id: task_id.to_string(),
        });
    }
    Ok(())
}

/// Record a failed attempt and when the task may be retried.
pub fn mark_task_error(
    conn: &Connection,
    task_id: i64,
    attempts: u32,
    error: &str,
    next_retry_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE fetch_tasks
         SET status = 'error', attempts = ?2, last_error = ?3, next_retry_at = ?4,
             updated_at = ?5
         WHERE id = ?1",
        params![
            task_id,
            attempts,
            error,
            format_timestamp(next_retry_at),
            format_timestamp(now),
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "fetch_task".to_string(),
            id: task_id.to_string(),
        });
    }
    Ok(())
}

/// List tasks, most recently updated first, optionally filtered by status.
pub fn list_tasks(
    conn: &Connection,
    status: Option<TaskStatus>,
    limit: u32,
) -> Result<Vec<FetchTask>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM fetch_tasks
         WHERE ?1 IS NULL OR status = ?1
         ORDER BY updated_at DESC, id DESC
         LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![status.map(|s| s.as_str()), limit], row_to_task)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Count tasks by state, splitting failed tasks on whether they are due.
pub fn queue_counts(conn: &Connection, now: DateTime<Utc>) -> Result<QueueCounts, OperationError> {
    let counts = conn.query_row(
        "SELECT
            COALESCE(SUM(status = 'pending'), 0),
            COALESCE(SUM(status = 'success'), 0),
            COALESCE(SUM(status = 'error' AND (next_retry_at IS NULL OR next_retry_at > ?1)), 0),
            COALESCE(SUM(status = 'error' AND next_retry_at IS NOT NULL AND next_retry_at <= ?1), 0)
         FROM fetch_tasks",
        params![format_timestamp(now)],
        |row| {
            Ok(QueueCounts {
                pending: row.get::<_, i64>(0)? as u64,
                success: row.get::<_, i64>(1)? as u64,
                error_waiting: row.get::<_, i64>(2)? as u64,
                error_eligible: row.get::<_, i64>(3)? as u64,
            })
        },
    )?;
    Ok(counts)
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<FetchTask> {
    let status: String = row.get(2)?;
    let next_retry_at: Option<String> = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(FetchTask {
        id: row.get(0)?,
        external_id: row.get(1)?,
        status: TaskStatus::from_str_loose(&status),
        attempts: row.get(3)?,
        last_error: row.get(4)?,
        next_retry_at: next_retry_at.as_deref().and_then(parse_timestamp),
        created_at: timestamp_column(6, &created_at)?,
        updated_at: timestamp_column(7, &updated_at)?,
    })
}

fn timestamp_column(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
