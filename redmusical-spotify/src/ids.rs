//! Normalization of user-supplied Spotify track references.

const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Extract a bare track id from a raw id, a `spotify:track:` URI, or an
/// `open.spotify.com` track URL. Returns `None` if the input is not a
/// recognizable track reference.
pub fn parse_track_id(input: &str) -> Option<String> {
    let input = input.trim();

    let candidate = if let Some(rest) = input.strip_prefix(TRACK_URI_PREFIX) {
        rest
    } else if input.contains("open.spotify.com/") {
        let (_, after) = input.split_once("/track/")?;
        after.split(['?', '#', '/']).next().unwrap_or_default()
    } else {
        input
    };

    is_base62(candidate).then(|| candidate.to_string())
}

fn is_base62(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_reference_forms() {
        let id = "4uLU6hMCjMI75M1A2tKUQC";
        assert_eq!(parse_track_id(id).as_deref(), Some(id));
        assert_eq!(parse_track_id(&format!("  {id}\n")).as_deref(), Some(id));
        assert_eq!(
            parse_track_id(&format!("spotify:track:{id}")).as_deref(),
            Some(id)
        );
        assert_eq!(
            parse_track_id(&format!("https://open.spotify.com/track/{id}?si=abc")).as_deref(),
            Some(id)
        );
        assert_eq!(
            parse_track_id(&format!("https://open.spotify.com/intl-es/track/{id}")).as_deref(),
            Some(id)
        );
    }

    #[test]
    fn rejects_other_references() {
        assert!(parse_track_id("").is_none());
        assert!(parse_track_id("spotify:album:4uLU6hMCjMI75M1A2tKUQC").is_none());
        assert!(parse_track_id("https://open.spotify.com/album/4uLU6hMCjMI75M1A2tKUQC").is_none());
        assert!(parse_track_id("not an id").is_none());
    }
}
