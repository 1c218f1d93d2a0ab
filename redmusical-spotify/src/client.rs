use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::api::{ALBUM_TRACKS_PAGE_SIZE, CatalogApi};
use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::types::{
    ErrorBody, ErrorEnvelope, Paging, SearchResponse, SimplifiedTrack, SpotifyAlbum,
    SpotifyArtist, SpotifyTrack, TokenResponse,
};

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Per-request timeout. An expired timeout surfaces as [`ApiError::Http`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

// Refresh tokens slightly before Spotify says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// HTTP client for the Spotify Web API using the client-credentials flow.
///
/// Does no pacing of its own; wrap it in [`crate::RateLimitedClient`].
pub struct SpotifyClient {
    http: reqwest::Client,
    creds: Credentials,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyClient {
    pub fn new(creds: Credentials) -> Result<Self, ApiError> {
        Self::with_timeout(creds, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(creds: Credentials, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("redmusical/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            creds,
            token: Mutex::new(None),
        })
    }

    /// Obtain an access token, validating the configured credentials.
    pub async fn authenticate(&self) -> Result<(), ApiError> {
        self.access_token().await.map(|_| ())
    }

    /// Return the cached token, fetching a new one when missing or expired.
    async fn access_token(&self) -> Result<String, ApiError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        log::debug!("Requesting Spotify access token");
        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        let retry_after = retry_after_header(&resp);
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(token_error(status, retry_after, &text));
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let token = self.access_token().await?;
        let resp = self
            .http
            .get(format!("{}{}", API_BASE, path))
            .bearer_auth(&token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited {
                retry_after: retry_after_header(&resp),
            });
        }

        let text = resp.text().await?;
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked or expired early; fetch a fresh one next time.
            *self.token.lock().await = None;
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(Into::into)
    }
}

impl CatalogApi for SpotifyClient {
    async fn track(&self, id: &str) -> Result<SpotifyTrack, ApiError> {
        self.get_json(&format!("/tracks/{}", id), &[]).await
    }

    async fn album(&self, id: &str) -> Result<SpotifyAlbum, ApiError> {
        self.get_json(&format!("/albums/{}", id), &[]).await
    }

    async fn album_tracks_page(
        &self,
        album_id: &str,
        offset: u32,
    ) -> Result<Paging<SimplifiedTrack>, ApiError> {
        let query = [
            ("limit", ALBUM_TRACKS_PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ];
        self.get_json(&format!("/albums/{}/tracks", album_id), &query)
            .await
    }

    async fn artist(&self, id: &str) -> Result<SpotifyArtist, ApiError> {
        self.get_json(&format!("/artists/{}", id), &[]).await
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<SpotifyTrack>, ApiError> {
        let params = [
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", limit.clamp(1, 50).to_string()),
        ];
        let resp: SearchResponse = self.get_json("/search", &params).await?;
        Ok(resp.tracks.map(|p| p.items).unwrap_or_default())
    }
}

fn retry_after_header(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Classify a failed token request. Only client errors other than 429
/// mean the credentials were rejected.
fn token_error(status: reqwest::StatusCode, retry_after: Option<String>, text: &str) -> ApiError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ApiError::RateLimited { retry_after };
    }
    let message = error_message(text);
    if status.is_client_error() {
        ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        }
    } else {
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Best human-readable message from an error body.
fn error_message(text: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Regular { message },
        }) => message,
        Ok(ErrorEnvelope {
            error: ErrorBody::Code(code),
        }) => code,
        Err(_) if text.trim().is_empty() => "empty response".to_string(),
        Err(_) => text.chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_api_message() {
        assert_eq!(
            error_message(r#"{"error": {"status": 400, "message": "invalid id"}}"#),
            "invalid id"
        );
        assert_eq!(
            error_message(r#"{"error": "invalid_client", "error_description": "x"}"#),
            "invalid_client"
        );
        assert_eq!(error_message(""), "empty response");
        assert_eq!(error_message(&"x".repeat(500)).len(), 200);
    }

    #[test]
    fn token_rate_limit_is_retryable() {
        let err = token_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            Some("3".to_string()),
            "",
        );
        assert!(err.is_rate_limited());
        assert!(matches!(err, ApiError::RateLimited { retry_after: Some(ref v) } if v == "3"));
    }

    #[test]
    fn token_server_error_is_not_an_auth_failure() {
        let err = token_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, None, "down");
        assert!(matches!(err, ApiError::Status { status: 503, .. }));
        assert_eq!(err.to_string(), "Server error (HTTP 503): down");
    }

    #[test]
    fn token_rejection_is_unauthorized() {
        let err = token_error(
            reqwest::StatusCode::BAD_REQUEST,
            None,
            r#"{"error": "invalid_client", "error_description": "Invalid client"}"#,
        );
        assert!(matches!(err, ApiError::Unauthorized { status: 400, ref message } if message == "invalid_client"));
    }

    #[test]
    fn client_builds_without_network() {
        let creds = Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        assert!(SpotifyClient::with_timeout(creds, Duration::from_secs(1)).is_ok());
    }
}
