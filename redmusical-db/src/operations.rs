//! Get-or-create operations for catalog entities.
//!
//! Every create path is idempotent: rows are keyed by their external
//! identifier and inserted with `ON CONFLICT DO NOTHING`, then re-read. Two
//! processes racing on the same identifier both end up with the same row.

use redmusical_catalog::types::*;
use redmusical_catalog::format_release_date;
use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

impl OperationError {
    fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

pub(crate) const ARTIST_COLUMNS: &str =
    "id, external_id, name, image_url, created_at, updated_at";
pub(crate) const ALBUM_COLUMNS: &str =
    "id, external_id, title, artist_id, release_date, image_url, created_at, updated_at";
pub(crate) const TRACK_COLUMNS: &str =
    "id, external_id, title, album_id, duration_ms, created_at, updated_at";

// ── Artist Operations ───────────────────────────────────────────────────────

/// Find an artist by its external identifier.
pub fn find_artist_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<Artist>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists WHERE external_id = ?1"
    ))?;
    let result = stmt.query_row(params![external_id], row_to_artist);
    match result {
        Ok(a) => Ok(Some(a)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find an artist by name (case-insensitive). The oldest match wins.
pub fn find_artist_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Artist>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists
         WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1"
    ))?;
    let result = stmt.query_row(params![name], row_to_artist);
    match result {
        Ok(a) => Ok(Some(a)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find a name-only artist (no external identifier yet) by name.
pub fn find_unlinked_artist_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<Artist>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ARTIST_COLUMNS} FROM artists
         WHERE name = ?1 COLLATE NOCASE AND external_id IS NULL ORDER BY id LIMIT 1"
    ))?;
    let result = stmt.query_row(params![name], row_to_artist);
    match result {
        Ok(a) => Ok(Some(a)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Get the artist with this external identifier, creating it with `name`
/// if absent. Returns the row and whether it was created by this call.
pub fn get_or_create_artist(
    conn: &Connection,
    external_id: &str,
    name: &str,
) -> Result<(Artist, bool), OperationError> {
    let changed = conn.execute(
        "INSERT INTO artists (external_id, name) VALUES (?1, ?2)
         ON CONFLICT(external_id) DO NOTHING",
        params![external_id, name],
    )?;
    let artist = find_artist_by_external_id(conn, external_id)?
        .ok_or_else(|| OperationError::not_found("artist", external_id))?;
    Ok((artist, changed == 1))
}

/// Get an artist by name (case-insensitive), creating a name-only row if
/// none matches.
pub fn get_or_create_artist_by_name(
    conn: &Connection,
    name: &str,
) -> Result<(Artist, bool), OperationError> {
    if let Some(artist) = find_artist_by_name(conn, name)? {
        return Ok((artist, false));
    }
    conn.execute("INSERT INTO artists (name) VALUES (?1)", params![name])?;
    let id = conn.last_insert_rowid();
    let artist = find_artist_by_id(conn, id)?.ok_or_else(|| OperationError::not_found("artist", id))?;
    Ok((artist, true))
}

/// Write an artist's mutable fields back (name, image, external id).
pub fn update_artist(conn: &Connection, artist: &Artist) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE artists SET external_id = ?2, name = ?3, image_url = ?4,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![artist.id, artist.external_id, artist.name, artist.image_url],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("artist", artist.id));
    }
    Ok(())
}

fn find_artist_by_id(conn: &Connection, id: i64) -> Result<Option<Artist>, OperationError> {
    let mut stmt = conn.prepare(&format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ?1"))?;
    let result = stmt.query_row(params![id], row_to_artist);
    match result {
        Ok(a) => Ok(Some(a)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Genre Operations ────────────────────────────────────────────────────────

/// Get a genre id by name, creating the genre if needed.
pub fn get_or_create_genre(conn: &Connection, name: &str) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO genres (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM genres WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Attach genres to an artist. Existing links are kept; blank names are
/// skipped. Returns how many new links were added.
pub fn add_artist_genres(
    conn: &Connection,
    artist_id: i64,
    genres: &[String],
) -> Result<usize, OperationError> {
    let mut added = 0;
    for name in genres.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        let genre_id = get_or_create_genre(conn, name)?;
        added += conn.execute(
            "INSERT OR IGNORE INTO artist_genres (artist_id, genre_id) VALUES (?1, ?2)",
            params![artist_id, genre_id],
        )?;
    }
    Ok(added)
}

// ── Album Operations ────────────────────────────────────────────────────────

/// Find an album by its external identifier.
pub fn find_album_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<Album>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ALBUM_COLUMNS} FROM albums WHERE external_id = ?1"
    ))?;
    let result = stmt.query_row(params![external_id], row_to_album);
    match result {
        Ok(a) => Ok(Some(a)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Get the album with `album.external_id`, creating it from `album` if
/// absent. An existing row is returned untouched.
pub fn get_or_create_album(
    conn: &Connection,
    album: &NewAlbum,
) -> Result<(Album, bool), OperationError> {
    let changed = conn.execute(
        "INSERT INTO albums (external_id, title, artist_id, release_date, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(external_id) DO NOTHING",
        params![
            album.external_id,
            album.title,
            album.artist_id,
            album.release_date.map(format_release_date),
            album.image_url,
        ],
    )?;
    let row = find_album_by_external_id(conn, &album.external_id)?
        .ok_or_else(|| OperationError::not_found("album", &album.external_id))?;
    Ok((row, changed == 1))
}

// ── Track Operations ────────────────────────────────────────────────────────

/// Find a track by its external identifier.
pub fn find_track_by_external_id(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<Track>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE external_id = ?1"
    ))?;
    let result = stmt.query_row(params![external_id], row_to_track);
    match result {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Get the track with `track.external_id`, creating it from `track` if
/// absent. An existing row is returned untouched.
pub fn get_or_create_track(
    conn: &Connection,
    track: &NewTrack,
) -> Result<(Track, bool), OperationError> {
    let changed = conn.execute(
        "INSERT INTO tracks (external_id, title, album_id, duration_ms)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(external_id) DO NOTHING",
        params![track.external_id, track.title, track.album_id, track.duration_ms],
    )?;
    let row = find_track_by_external_id(conn, &track.external_id)?
        .ok_or_else(|| OperationError::not_found("track", &track.external_id))?;
    Ok((row, changed == 1))
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

pub(crate) fn row_to_artist(row: &rusqlite::Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        image_url: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub(crate) fn row_to_album(row: &rusqlite::Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        external_id: row.get(1)?,
        title: row.get(2)?,
        artist_id: row.get(3)?,
        release_date: row.get(4)?,
        image_url: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(crate) fn row_to_track(row: &rusqlite::Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        external_id: row.get(1)?,
        title: row.get(2)?,
        album_id: row.get(3)?,
        duration_ms: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
