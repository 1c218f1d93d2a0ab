use std::cell::Cell;

use redmusical_spotify::*;

/// An album listing of `total` tracks served in pages of 50.
struct PagedAlbum {
    total: u32,
    pages_served: Cell<u32>,
}

impl CatalogApi for PagedAlbum {
    async fn track(&self, id: &str) -> Result<SpotifyTrack, ApiError> {
        Err(ApiError::NotFound(id.to_string()))
    }

    async fn album(&self, id: &str) -> Result<SpotifyAlbum, ApiError> {
        Err(ApiError::NotFound(id.to_string()))
    }

    async fn album_tracks_page(
        &self,
        album_id: &str,
        offset: u32,
    ) -> Result<Paging<SimplifiedTrack>, ApiError> {
        self.pages_served.set(self.pages_served.get() + 1);
        let end = (offset + ALBUM_TRACKS_PAGE_SIZE).min(self.total);
        let items = (offset..end)
            .map(|n| SimplifiedTrack {
                id: Some(format!("{album_id}-{n}")),
                name: format!("Track {n}"),
                duration_ms: 1000,
                track_number: Some(n + 1),
            })
            .collect();
        Ok(Paging {
            items,
            total: self.total,
            offset,
            next: (end < self.total).then(|| format!("offset={end}")),
        })
    }

    async fn artist(&self, id: &str) -> Result<SpotifyArtist, ApiError> {
        Err(ApiError::NotFound(id.to_string()))
    }

    async fn search_tracks(&self, _query: &str, _limit: u32) -> Result<Vec<SpotifyTrack>, ApiError> {
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn album_tracks_follows_every_page() {
    let client = RateLimitedClient::new(PagedAlbum {
        total: 120,
        pages_served: Cell::new(0),
    });

    let start = tokio::time::Instant::now();
    let tracks = client.album_tracks("alb").await.unwrap();

    assert_eq!(tracks.len(), 120);
    assert_eq!(tracks[119].id.as_deref(), Some("alb-119"));
    assert_eq!(client.inner().pages_served.get(), 3);
    // Every page goes through the throttle.
    assert!(start.elapsed() >= DEFAULT_MIN_INTERVAL * 2);
}

#[tokio::test]
async fn short_album_is_a_single_page() {
    let api = PagedAlbum {
        total: 12,
        pages_served: Cell::new(0),
    };
    let tracks = api.album_tracks("alb").await.unwrap();
    assert_eq!(tracks.len(), 12);
    assert_eq!(api.pages_served.get(), 1);
}
