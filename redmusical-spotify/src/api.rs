use crate::error::ApiError;
use crate::types::{Paging, SimplifiedTrack, SpotifyAlbum, SpotifyArtist, SpotifyTrack};

/// Page size used when walking an album's track listing.
pub const ALBUM_TRACKS_PAGE_SIZE: u32 = 50;

/// Default number of results for a track search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 17;

/// The remote catalog operations the ingestion pipeline consumes.
///
/// Implemented by the HTTP client, by [`crate::RateLimitedClient`] as a
/// decorator around it, and by in-memory fakes in tests.
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    async fn track(&self, id: &str) -> Result<SpotifyTrack, ApiError>;

    async fn album(&self, id: &str) -> Result<SpotifyAlbum, ApiError>;

    /// One page of an album's track listing, starting at `offset`.
    async fn album_tracks_page(
        &self,
        album_id: &str,
        offset: u32,
    ) -> Result<Paging<SimplifiedTrack>, ApiError>;

    async fn artist(&self, id: &str) -> Result<SpotifyArtist, ApiError>;

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<SpotifyTrack>, ApiError>;

    /// The complete track listing of an album, following pages until
    /// exhausted. Each page is a separate call.
    async fn album_tracks(&self, album_id: &str) -> Result<Vec<SimplifiedTrack>, ApiError> {
        let mut items = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.album_tracks_page(album_id, offset).await?;
            let more = page.has_more();
            offset += page.items.len() as u32;
            items.extend(page.items);
            if !more {
                break;
            }
        }
        Ok(items)
    }
}
