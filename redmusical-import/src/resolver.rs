//! Resolve Spotify ids into local catalog rows.
//!
//! Resolution is get-or-create throughout, so resolving the same id twice,
//! or from two processes at once, never duplicates rows. Failures of the
//! primary fetches (track, album, album listing) propagate; failures of
//! best-effort enrichment (artist details, release dates) are reported as
//! [`EnrichWarning`]s next to the result.

use redmusical_catalog::normalize_release_date;
use redmusical_catalog::types::*;
use redmusical_db::operations::{self, OperationError};
use redmusical_spotify::{ApiError, CatalogApi, SimplifiedArtist, SpotifyAlbum, SpotifyTrack};
use rusqlite::Connection;
use thiserror::Error;

/// Name given to the artist of a payload that credits nobody.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Spotify error: {0}")]
    Api(#[from] ApiError),
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{entity} '{external_id}' missing after resolution")]
    Vanished {
        entity: &'static str,
        external_id: String,
    },
}

/// A best-effort step that failed without failing the resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichWarning {
    /// Artist details could not be fetched; fallback values were stored.
    ArtistLookupFailed { artist_id: String, error: String },
    /// The payload credited no artist; the placeholder artist was used.
    MissingArtist { external_id: String },
    /// The album's release date was present but not a recognizable date.
    UnparsableReleaseDate { album_id: String, raw: String },
}

impl std::fmt::Display for EnrichWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArtistLookupFailed { artist_id, error } => {
                write!(f, "artist {} details unavailable: {}", artist_id, error)
            }
            Self::MissingArtist { external_id } => {
                write!(f, "{} credits no artist, using '{}'", external_id, UNKNOWN_ARTIST)
            }
            Self::UnparsableReleaseDate { album_id, raw } => {
                write!(f, "album {} has unparsable release date '{}'", album_id, raw)
            }
        }
    }
}

/// Rows created by one resolution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CreatedCounts {
    pub artists: u32,
    pub albums: u32,
    pub tracks: u32,
}

impl CreatedCounts {
    pub fn is_empty(&self) -> bool {
        self.artists == 0 && self.albums == 0 && self.tracks == 0
    }
}

/// A resolved row plus what happened while resolving it.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub warnings: Vec<EnrichWarning>,
    pub created: CreatedCounts,
}

impl<T> Resolved<T> {
    fn existing(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
            created: CreatedCounts::default(),
        }
    }
}

#[derive(Default)]
struct Report {
    warnings: Vec<EnrichWarning>,
    created: CreatedCounts,
}

impl Report {
    fn warn(&mut self, warning: EnrichWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn finish<T>(self, value: T) -> Resolved<T> {
        Resolved {
            value,
            warnings: self.warnings,
            created: self.created,
        }
    }
}

/// Resolves Spotify ids against one catalog connection and one API client.
pub struct CatalogResolver<'a, A> {
    conn: &'a Connection,
    api: &'a A,
}

impl<'a, A: CatalogApi> CatalogResolver<'a, A> {
    pub fn new(conn: &'a Connection, api: &'a A) -> Self {
        Self { conn, api }
    }

    /// Return the local track for `external_id`, fetching and storing it
    /// (with its artist, album and, for a new album, every album track) if
    /// it is not stored yet. A stored track is returned without any call.
    pub async fn resolve_track(&self, external_id: &str) -> Result<Resolved<Track>, ResolveError> {
        if let Some(track) = operations::find_track_by_external_id(self.conn, external_id)? {
            return Ok(Resolved::existing(track));
        }

        let mut report = Report::default();
        let remote = self.api.track(external_id).await?;
        let artist = self
            .credited_artist(&remote.artists, external_id, &mut report)
            .await?;
        self.store_album(&remote.album, artist.id, Some((external_id, &remote)), &mut report)
            .await?;

        let track = operations::find_track_by_external_id(self.conn, external_id)?.ok_or_else(
            || ResolveError::Vanished {
                entity: "track",
                external_id: external_id.to_string(),
            },
        )?;
        log::debug!(
            "Resolved track {} ('{}'): {} artist(s), {} album(s), {} track(s) created",
            external_id,
            track.title,
            report.created.artists,
            report.created.albums,
            report.created.tracks
        );
        Ok(report.finish(track))
    }

    /// Return the local album for `external_id`, fetching it and its whole
    /// track listing if it is not stored yet.
    pub async fn resolve_album(&self, external_id: &str) -> Result<Resolved<Album>, ResolveError> {
        if let Some(album) = operations::find_album_by_external_id(self.conn, external_id)? {
            return Ok(Resolved::existing(album));
        }

        let mut report = Report::default();
        let remote = self.api.album(external_id).await?;
        let artist = self
            .credited_artist(&remote.artists, external_id, &mut report)
            .await?;
        let album = self.store_album(&remote, artist.id, None, &mut report).await?;
        Ok(report.finish(album))
    }

    /// Return the local artist for `external_id`, creating or enriching it.
    ///
    /// Details are fetched only when the artist is new or has no image. If
    /// the fetch fails, `fallback_name` (or the id itself) names the artist.
    pub async fn resolve_artist(
        &self,
        external_id: &str,
        fallback_name: Option<&str>,
    ) -> Result<Resolved<Artist>, ResolveError> {
        let mut report = Report::default();
        let artist = self
            .artist_by_external_id(external_id, fallback_name, &mut report)
            .await?;
        Ok(report.finish(artist))
    }

    /// Resolve the lead artist of a track or album payload.
    async fn credited_artist(
        &self,
        artists: &[SimplifiedArtist],
        owner_id: &str,
        report: &mut Report,
    ) -> Result<Artist, ResolveError> {
        let lead = artists.first();
        if let Some(id) = lead.and_then(|a| a.id.as_deref()).filter(|id| !id.is_empty()) {
            let name = lead.map(|a| a.name.as_str());
            return self.artist_by_external_id(id, name, report).await;
        }

        let name = match lead.map(|a| a.name.trim()).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => {
                report.warn(EnrichWarning::MissingArtist {
                    external_id: owner_id.to_string(),
                });
                UNKNOWN_ARTIST
            }
        };
        let (artist, created) = operations::get_or_create_artist_by_name(self.conn, name)?;
        report.created.artists += u32::from(created);
        Ok(artist)
    }

    async fn artist_by_external_id(
        &self,
        external_id: &str,
        fallback_name: Option<&str>,
        report: &mut Report,
    ) -> Result<Artist, ResolveError> {
        let existing = operations::find_artist_by_external_id(self.conn, external_id)?;

        let details = if existing.as_ref().is_none_or(Artist::needs_enrichment) {
            match self.api.artist(external_id).await {
                Ok(details) => Some(details),
                Err(e) => {
                    report.warn(EnrichWarning::ArtistLookupFailed {
                        artist_id: external_id.to_string(),
                        error: e.to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        if let Some(details) = details {
            let remote_name = details.name.trim();
            let mut artist = match existing {
                Some(artist) => artist,
                None => {
                    let unlinked = if remote_name.is_empty() {
                        None
                    } else {
                        operations::find_unlinked_artist_by_name(self.conn, remote_name)?
                    };
                    match unlinked {
                        Some(artist) => {
                            log::debug!("Linking artist '{}' to {}", artist.name, external_id);
                            artist
                        }
                        None => {
                            let name = [Some(remote_name), fallback_name]
                                .into_iter()
                                .flatten()
                                .map(str::trim)
                                .find(|n| !n.is_empty())
                                .unwrap_or(external_id);
                            let (artist, created) =
                                operations::get_or_create_artist(self.conn, external_id, name)?;
                            report.created.artists += u32::from(created);
                            artist
                        }
                    }
                }
            };

            if artist.name.trim().is_empty() && !remote_name.is_empty() {
                artist.name = remote_name.to_string();
            }
            if let Some(url) = details.image_url() {
                artist.image_url = Some(url);
            }
            if artist.external_id.is_none() {
                artist.external_id = Some(external_id.to_string());
            }
            operations::update_artist(self.conn, &artist)?;
            operations::add_artist_genres(self.conn, artist.id, &details.genres)?;
            return Ok(artist);
        }

        if let Some(artist) = existing {
            return Ok(artist);
        }

        let lookup_name = fallback_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(external_id);
        if let Some(artist) = operations::find_artist_by_name(self.conn, lookup_name)? {
            return Ok(artist);
        }
        let (artist, created) = operations::get_or_create_artist(self.conn, external_id, lookup_name)?;
        report.created.artists += u32::from(created);
        Ok(artist)
    }

    /// Get or create `album`. A newly seen album is stored together with its
    /// full track listing, fetched before anything is written so a failed
    /// listing leaves the album unstored. `requested` is the track that led
    /// here; it is stored in either case.
    async fn store_album(
        &self,
        album: &SpotifyAlbum,
        artist_id: i64,
        requested: Option<(&str, &SpotifyTrack)>,
        report: &mut Report,
    ) -> Result<Album, ResolveError> {
        if let Some(existing) = operations::find_album_by_external_id(self.conn, &album.id)? {
            if let Some((id, track)) = requested {
                let (_, created) =
                    operations::get_or_create_track(self.conn, &new_track(id, track, existing.id))?;
                report.created.tracks += u32::from(created);
            }
            return Ok(existing);
        }

        let listing = self.api.album_tracks(&album.id).await?;
        let release_date = self.release_date(album, report);

        let tx = self.conn.unchecked_transaction()?;
        let (row, created) = operations::get_or_create_album(
            &tx,
            &NewAlbum {
                external_id: album.id.clone(),
                title: album.name.clone(),
                artist_id,
                release_date,
                image_url: album.image_url(),
            },
        )?;
        report.created.albums += u32::from(created);

        for item in &listing {
            let Some(id) = item.id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };
            let (_, created) = operations::get_or_create_track(
                &tx,
                &NewTrack {
                    external_id: id.to_string(),
                    title: item.name.clone(),
                    album_id: row.id,
                    duration_ms: item.duration_ms.max(0),
                },
            )?;
            report.created.tracks += u32::from(created);
        }

        if let Some((id, track)) = requested {
            let (_, created) = operations::get_or_create_track(&tx, &new_track(id, track, row.id))?;
            report.created.tracks += u32::from(created);
        }
        tx.commit()?;

        log::debug!(
            "Stored album {} ('{}') with {} listed track(s)",
            album.id,
            row.title,
            listing.len()
        );
        Ok(row)
    }

    fn release_date(&self, album: &SpotifyAlbum, report: &mut Report) -> Option<chrono::NaiveDate> {
        let raw = album.release_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let date = normalize_release_date(raw);
        if date.is_none() {
            report.warn(EnrichWarning::UnparsableReleaseDate {
                album_id: album.id.clone(),
                raw: raw.to_string(),
            });
        }
        date
    }
}

fn new_track(external_id: &str, track: &SpotifyTrack, album_id: i64) -> NewTrack {
    NewTrack {
        external_id: external_id.to_string(),
        title: track.name.clone(),
        album_id,
        duration_ms: track.duration_ms.max(0),
    }
}
