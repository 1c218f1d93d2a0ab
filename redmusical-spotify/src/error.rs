/// Errors returned by Spotify Web API calls.
///
/// The display text always carries the HTTP status or the transport error,
/// since it ends up as the recorded failure reason of a queued fetch.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {}", error_chain(.0))]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by Spotify API (HTTP 429, Retry-After: {})", retry_after.as_deref().unwrap_or("none"))]
    RateLimited { retry_after: Option<String> },

    #[error("Not found (HTTP 404): {0}")]
    NotFound(String),

    #[error("Authentication failed (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Server error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render an error followed by each of its sources, so transport causes
/// such as a timeout reach the message.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if parts.last().is_none_or(|last| !last.contains(&text)) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

impl ApiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// HTTP status associated with the failure, if there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::NotFound(_) => Some(404),
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
