//! Data model types for the music catalog.
//!
//! These types represent the persistent catalog schema: artists, albums,
//! tracks, genre tags, and the fetch-task queue that feeds ingestion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Artist ──────────────────────────────────────────────────────────────────

/// A performing artist. `external_id` is the remote catalog identifier and
/// may be absent for artists created by name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub external_id: Option<String>,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Artist {
    /// True when the stored artist has no usable image, which is the trigger
    /// for fetching artist details again.
    pub fn needs_enrichment(&self) -> bool {
        self.image_url.as_deref().is_none_or(|u| u.trim().is_empty())
    }
}

/// A genre tag attached to artists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

// ── Album ───────────────────────────────────────────────────────────────────

/// An album, owned by exactly one artist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub external_id: Option<String>,
    pub title: String,
    pub artist_id: i64,
    /// Normalized `YYYY-MM-DD`, or `None` when the remote value was unusable.
    pub release_date: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Values used when an album row has to be created.
#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub external_id: String,
    pub title: String,
    pub artist_id: i64,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

// ── Track ───────────────────────────────────────────────────────────────────

/// A track, belonging to exactly one album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub external_id: Option<String>,
    pub title: String,
    pub album_id: i64,
    pub duration_ms: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Values used when a track row has to be created.
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub external_id: String,
    pub title: String,
    pub album_id: i64,
    pub duration_ms: i64,
}

// ── Fetch Queue ─────────────────────────────────────────────────────────────

/// Processing state of a queued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Success,
    Error,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "success" | "ok" | "done" => Self::Success,
            "error" | "failed" => Self::Error,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to ingest one track by its external identifier.
///
/// Created by producers in the `Pending` state and only ever mutated by the
/// queue worker. Rows are kept after success as an audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTask {
    pub id: i64,
    pub external_id: String,
    pub status: TaskStatus,
    pub attempts: u32,
    pub last_error: String,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FetchTask {
    /// Whether the worker may pick this task up at `now`.
    ///
    /// Pending tasks are always eligible. Failed tasks become eligible once
    /// their retry time has passed. Succeeded tasks never are.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            TaskStatus::Pending => true,
            TaskStatus::Error => self.next_retry_at.is_some_and(|at| at <= now),
            TaskStatus::Success => false,
        }
    }
}

// ── Stats ───────────────────────────────────────────────────────────────────

/// Row counts for the catalog tables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub artists: u64,
    pub albums: u64,
    pub tracks: u64,
    pub genres: u64,
}

/// Queue size by state. Failed tasks are split by whether their retry
/// time has already passed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueueCounts {
    pub pending: u64,
    pub success: u64,
    pub error_waiting: u64,
    pub error_eligible: u64,
}

impl QueueCounts {
    pub fn eligible(&self) -> u64 {
        self.pending + self.error_eligible
    }

    pub fn total(&self) -> u64 {
        self.pending + self.success + self.error_waiting + self.error_eligible
    }
}
