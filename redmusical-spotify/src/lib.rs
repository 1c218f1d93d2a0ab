//! Spotify Web API access for catalog ingestion.
//!
//! [`SpotifyClient`] speaks HTTP; [`RateLimitedClient`] paces calls through a
//! shared [`Throttle`] and absorbs one HTTP 429 per call. Both implement
//! [`CatalogApi`], the seam the resolver is written against.

pub mod api;
pub mod client;
pub mod credentials;
pub mod error;
pub mod ids;
pub mod throttle;
pub mod types;

pub use api::{ALBUM_TRACKS_PAGE_SIZE, CatalogApi, DEFAULT_SEARCH_LIMIT};
pub use client::{DEFAULT_REQUEST_TIMEOUT, SpotifyClient};
pub use credentials::{
    CredentialSource, CredentialSources, Credentials, config_path, credential_sources,
};
pub use error::ApiError;
pub use ids::parse_track_id;
pub use throttle::{DEFAULT_MIN_INTERVAL, RateLimitedClient, Throttle, retry_after_delay};
pub use types::{
    Image, Paging, SimplifiedArtist, SimplifiedTrack, SpotifyAlbum, SpotifyArtist, SpotifyTrack,
};
