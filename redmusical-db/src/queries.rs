//! Read queries for the catalog database.

use redmusical_catalog::types::*;
use rusqlite::{params, Connection};

use crate::operations::{
    row_to_album, row_to_artist, row_to_track, OperationError, ALBUM_COLUMNS, ARTIST_COLUMNS,
    TRACK_COLUMNS,
};

/// List an artist's albums, oldest release first. Albums without a release
/// date sort last.
pub fn albums_for_artist(
    conn: &Connection,
    artist_id: i64,
) -> Result<Vec<Album>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ALBUM_COLUMNS} FROM albums WHERE artist_id = ?1
         ORDER BY release_date IS NULL, release_date, title"
    ))?;
    let rows = stmt.query_map(params![artist_id], row_to_album)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Look up an album together with its artist.
pub fn album_with_artist(
    conn: &Connection,
    album_id: i64,
) -> Result<Option<(Album, Artist)>, OperationError> {
    let album = match conn.query_row(
        &format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE id = ?1"),
        params![album_id],
        row_to_album,
    ) {
        Ok(album) => album,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let artist = conn.query_row(
        &format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ?1"),
        params![album.artist_id],
        row_to_artist,
    )?;
    Ok(Some((album, artist)))
}

/// List the tracks stored for an album, in insertion order.
pub fn tracks_for_album(conn: &Connection, album_id: i64) -> Result<Vec<Track>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE album_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![album_id], row_to_track)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List the genres attached to an artist, alphabetically.
pub fn genres_for_artist(conn: &Connection, artist_id: i64) -> Result<Vec<Genre>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name FROM genres g
         JOIN artist_genres ag ON ag.genre_id = g.id
         WHERE ag.artist_id = ?1
         ORDER BY g.name",
    )?;
    let rows = stmt.query_map(params![artist_id], |row| {
        Ok(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Get catalog statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let count = |table: &str| -> Result<u64, rusqlite::Error> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get::<_, i64>(0).map(|n| n as u64)
        })
    };

    Ok(CatalogStats {
        artists: count("artists")?,
        albums: count("albums")?,
        tracks: count("tracks")?,
        genres: count("genres")?,
    })
}
