//! Serde models for the subset of Spotify Web API responses the catalog uses.
//!
//! Only the fields we persist are modelled; everything else in the payloads
//! is ignored. Optional collections default to empty.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// First usable image URL in a Spotify image list (largest first).
pub fn first_image_url(images: &[Image]) -> Option<String> {
    images
        .iter()
        .map(|i| i.url.trim())
        .find(|u| !u.is_empty())
        .map(str::to_string)
}

/// Artist reference embedded in track and album payloads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SimplifiedArtist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Full artist object from `GET /artists/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpotifyArtist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl SpotifyArtist {
    pub fn image_url(&self) -> Option<String> {
        first_image_url(&self.images)
    }
}

/// Album object, either embedded in a track or from `GET /albums/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpotifyAlbum {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD` depending on precision.
    #[serde(default)]
    pub release_date: Option<String>,
}

impl SpotifyAlbum {
    pub fn image_url(&self) -> Option<String> {
        first_image_url(&self.images)
    }
}

/// Full track object from `GET /tracks/{id}` or a search result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpotifyTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: i64,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub album: SpotifyAlbum,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl SpotifyTrack {
    /// The credited lead artist, if any.
    pub fn primary_artist(&self) -> Option<&SimplifiedArtist> {
        self.artists.first()
    }
}

/// Track entry of an album listing. Local files have no id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SimplifiedTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: i64,
    #[serde(default)]
    pub track_number: Option<u32>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Paging<T> {
    pub fn has_more(&self) -> bool {
        self.next.is_some() && !self.items.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Paging<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_lifetime")]
    pub expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorBody {
    Regular { message: String },
    // Token endpoint errors: {"error": "invalid_client", "error_description": ...}
    Code(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_payload_parses_with_missing_optionals() {
        let json = r#"{
            "id": "t1",
            "name": "Joga",
            "duration_ms": 305000,
            "artists": [{"id": "a1", "name": "Bjork", "type": "artist"}],
            "album": {"id": "al1", "name": "Homogenic", "release_date": "1997-09-22",
                      "images": [{"url": "https://i.scdn.co/big", "width": 640, "height": 640}]},
            "explicit": false
        }"#;
        let track: SpotifyTrack = serde_json::from_str(json).unwrap();
        assert_eq!(track.primary_artist().unwrap().name, "Bjork");
        assert_eq!(track.album.image_url().as_deref(), Some("https://i.scdn.co/big"));
        assert!(track.preview_url.is_none());
    }

    #[test]
    fn album_without_images_or_date() {
        let album: SpotifyAlbum = serde_json::from_str(r#"{"id": "al1", "name": "X"}"#).unwrap();
        assert!(album.image_url().is_none());
        assert!(album.release_date.is_none());
        assert!(album.artists.is_empty());
    }

    #[test]
    fn paging_reports_more() {
        let page: Paging<SimplifiedTrack> = serde_json::from_str(
            r#"{"items": [{"id": null, "name": "local"}], "total": 60, "offset": 0,
                "next": "https://api.spotify.com/v1/albums/x/tracks?offset=50"}"#,
        )
        .unwrap();
        assert!(page.has_more());
        assert!(page.items[0].id.is_none());
    }

    #[test]
    fn error_envelopes() {
        let api: ErrorEnvelope =
            serde_json::from_str(r#"{"error": {"status": 400, "message": "invalid id"}}"#).unwrap();
        assert!(matches!(api.error, ErrorBody::Regular { ref message } if message == "invalid id"));
        let auth: ErrorEnvelope = serde_json::from_str(
            r#"{"error": "invalid_client", "error_description": "Invalid client"}"#,
        )
        .unwrap();
        assert!(matches!(auth.error, ErrorBody::Code(ref c) if c == "invalid_client"));
    }
}
