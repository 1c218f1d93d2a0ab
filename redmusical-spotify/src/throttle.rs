//! Call pacing for the Spotify client.
//!
//! A [`Throttle`] keeps a minimum gap between the starts of consecutive
//! calls. [`RateLimitedClient`] wraps any [`CatalogApi`] with a throttle and
//! absorbs a single HTTP 429 per call.

use std::future::Future;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::api::CatalogApi;
use crate::error::ApiError;
use crate::types::{Paging, SimplifiedTrack, SpotifyAlbum, SpotifyArtist, SpotifyTrack};

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

const DEFAULT_RETRY_AFTER_SECS: f64 = 5.0;
const MIN_RETRY_AFTER_SECS: f64 = 0.5;
const MAX_RETRY_AFTER_SECS: f64 = 8.0;

/// Minimum-interval gate shared by every call of one client.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call may start, then claim the slot.
    ///
    /// The lock is held across the sleep; concurrent callers are served one
    /// slot at a time.
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

/// How long to back off after a 429, from the raw `Retry-After` header.
///
/// Fractional seconds are accepted. Missing or unparsable values mean 5s;
/// the result is clamped to 0.5s..=8s.
pub fn retry_after_delay(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|s| s.is_finite())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
        .clamp(MIN_RETRY_AFTER_SECS, MAX_RETRY_AFTER_SECS);
    Duration::from_secs_f64(secs)
}

/// A [`CatalogApi`] decorator that paces calls and retries once on 429.
pub struct RateLimitedClient<A> {
    inner: A,
    throttle: Throttle,
}

impl<A> RateLimitedClient<A> {
    pub fn new(inner: A) -> Self {
        Self::with_throttle(inner, Throttle::default())
    }

    pub fn with_throttle(inner: A, throttle: Throttle) -> Self {
        Self { inner, throttle }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Run `op` after the throttle. A rate-limit failure is retried exactly
    /// once after the server's requested delay; any other outcome, including
    /// a second 429, is returned as is.
    pub async fn call<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.throttle.wait().await;
        match op().await {
            Err(ApiError::RateLimited { retry_after }) => {
                let delay = retry_after_delay(retry_after.as_deref());
                log::warn!(
                    "Spotify rate limit hit on {}; waiting {:.1}s before retrying",
                    what,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
                self.throttle.wait().await;
                op().await
            }
            other => other,
        }
    }
}

impl<A: CatalogApi> CatalogApi for RateLimitedClient<A> {
    async fn track(&self, id: &str) -> Result<SpotifyTrack, ApiError> {
        let inner = &self.inner;
        self.call("track", move || inner.track(id)).await
    }

    async fn album(&self, id: &str) -> Result<SpotifyAlbum, ApiError> {
        let inner = &self.inner;
        self.call("album", move || inner.album(id)).await
    }

    async fn album_tracks_page(
        &self,
        album_id: &str,
        offset: u32,
    ) -> Result<Paging<SimplifiedTrack>, ApiError> {
        let inner = &self.inner;
        self.call("album_tracks", move || inner.album_tracks_page(album_id, offset))
            .await
    }

    async fn artist(&self, id: &str) -> Result<SpotifyArtist, ApiError> {
        let inner = &self.inner;
        self.call("artist", move || inner.artist(id)).await
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<SpotifyTrack>, ApiError> {
        let inner = &self.inner;
        self.call("search", move || inner.search_tracks(query, limit))
            .await
    }
}

#[cfg(test)]
#[path = "tests/throttle_tests.rs"]
mod tests;
