#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use redmusical_spotify::*;

/// In-memory Spotify with call logging and scripted failures.
#[derive(Default)]
pub struct FakeSpotify {
    tracks: HashMap<String, SpotifyTrack>,
    albums: HashMap<String, SpotifyAlbum>,
    listings: HashMap<String, Vec<SimplifiedTrack>>,
    artists: HashMap<String, SpotifyArtist>,
    /// Remaining failures per call key, e.g. `track:T2`.
    failures: RefCell<HashMap<String, u32>>,
    calls: RefCell<Vec<String>>,
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an album, its artist, and a listing of `track_ids`. Each
    /// listed track is also fetchable on its own.
    pub fn add_album(&mut self, album_id: &str, artist_id: &str, track_ids: &[&str]) {
        let album = album(album_id, artist_id);
        for id in track_ids {
            self.tracks.insert(
                id.to_string(),
                SpotifyTrack {
                    id: Some(id.to_string()),
                    name: format!("Song {id}"),
                    duration_ms: 200_000,
                    artists: vec![simplified_artist(artist_id)],
                    album: album.clone(),
                    preview_url: None,
                },
            );
        }
        self.listings.insert(
            album_id.to_string(),
            track_ids
                .iter()
                .enumerate()
                .map(|(n, id)| SimplifiedTrack {
                    id: Some(id.to_string()),
                    name: format!("Song {id}"),
                    duration_ms: 200_000,
                    track_number: Some(n as u32 + 1),
                })
                .collect(),
        );
        self.albums.insert(album_id.to_string(), album);
        self.artists
            .entry(artist_id.to_string())
            .or_insert_with(|| artist(artist_id));
    }

    pub fn track_mut(&mut self, id: &str) -> &mut SpotifyTrack {
        self.tracks.get_mut(id).expect("unknown fake track")
    }

    pub fn artist_mut(&mut self, id: &str) -> &mut SpotifyArtist {
        self.artists.get_mut(id).expect("unknown fake artist")
    }

    pub fn remove_artist(&mut self, id: &str) {
        self.artists.remove(id);
    }

    /// Make the next `times` calls for `key` fail with a 503.
    pub fn fail(&self, key: &str, times: u32) {
        self.failures.borrow_mut().insert(key.to_string(), times);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, key: String) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(key.clone());
        let mut failures = self.failures.borrow_mut();
        if let Some(left) = failures.get_mut(&key) {
            if *left > 0 {
                *left -= 1;
                return Err(ApiError::Status {
                    status: 503,
                    message: format!("{key} unavailable"),
                });
            }
        }
        Ok(())
    }
}

impl CatalogApi for FakeSpotify {
    async fn track(&self, id: &str) -> Result<SpotifyTrack, ApiError> {
        self.record(format!("track:{id}"))?;
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/tracks/{id}")))
    }

    async fn album(&self, id: &str) -> Result<SpotifyAlbum, ApiError> {
        self.record(format!("album:{id}"))?;
        self.albums
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/albums/{id}")))
    }

    async fn album_tracks_page(
        &self,
        album_id: &str,
        offset: u32,
    ) -> Result<Paging<SimplifiedTrack>, ApiError> {
        self.record(format!("album_tracks:{album_id}"))?;
        let all = self
            .listings
            .get(album_id)
            .ok_or_else(|| ApiError::NotFound(format!("/albums/{album_id}/tracks")))?;
        let start = (offset as usize).min(all.len());
        let end = (start + ALBUM_TRACKS_PAGE_SIZE as usize).min(all.len());
        Ok(Paging {
            items: all[start..end].to_vec(),
            total: all.len() as u32,
            offset,
            next: (end < all.len()).then(|| format!("offset={end}")),
        })
    }

    async fn artist(&self, id: &str) -> Result<SpotifyArtist, ApiError> {
        self.record(format!("artist:{id}"))?;
        self.artists
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/artists/{id}")))
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<SpotifyTrack>, ApiError> {
        self.record(format!("search:{query}"))?;
        Ok(self
            .tracks
            .values()
            .filter(|t| t.name.contains(query))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

pub fn album(album_id: &str, artist_id: &str) -> SpotifyAlbum {
    SpotifyAlbum {
        id: album_id.to_string(),
        name: format!("Album {album_id}"),
        artists: vec![simplified_artist(artist_id)],
        images: vec![Image {
            url: format!("https://img.example/{album_id}.jpg"),
            width: Some(640),
            height: Some(640),
        }],
        release_date: Some("1997-09".to_string()),
    }
}

pub fn simplified_artist(artist_id: &str) -> SimplifiedArtist {
    SimplifiedArtist {
        id: Some(artist_id.to_string()),
        name: format!("Artist {artist_id}"),
    }
}

pub fn artist(artist_id: &str) -> SpotifyArtist {
    SpotifyArtist {
        id: artist_id.to_string(),
        name: format!("Artist {artist_id}"),
        genres: vec!["trip hop".to_string(), "electronica".to_string()],
        images: vec![Image {
            url: format!("https://img.example/{artist_id}.jpg"),
            width: None,
            height: None,
        }],
    }
}
