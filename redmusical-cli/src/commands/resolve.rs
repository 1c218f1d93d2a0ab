use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use redmusical_import::CatalogResolver;
use redmusical_spotify::parse_track_id;

use crate::CliError;
use crate::cli_types::ClientArgs;

/// Resolve a single track right away, bypassing the queue.
pub(crate) fn run_resolve(
    db: Option<PathBuf>,
    track: &str,
    client: &ClientArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let id = parse_track_id(track)
        .ok_or_else(|| CliError::invalid_input(format!("not a Spotify track reference: {}", track)))?;

    let (conn, _) = super::open_catalog(db)?;
    let api = super::build_client(client)?;
    let resolver = CatalogResolver::new(&conn, &api);
    let rt = super::runtime()?;

    let pb = super::spinner(quiet, format!("Resolving {}", id));
    let result = rt.block_on(resolver.resolve_track(&id));
    pb.finish_and_clear();
    let resolved = result.map_err(|e| CliError::api(format!("Failed to resolve {}: {}", id, e)))?;

    let track = &resolved.value;
    let album = redmusical_db::album_with_artist(&conn, track.album_id)
        .map_err(|e| CliError::database(e.to_string()))?;

    log::info!(
        "{} {}",
        track.title.if_supports_color(Stdout, |t| t.bold()),
        format!("[{}]", id).if_supports_color(Stdout, |t| t.dimmed()),
    );
    if let Some((album, artist)) = album {
        let year = album
            .release_date
            .as_deref()
            .map(|d| format!(" ({})", d.chars().take(4).collect::<String>()))
            .unwrap_or_default();
        log::info!("  Album:    {}{}", album.title, year);
        log::info!("  Artist:   {}", artist.name);
    }
    log::info!("  Duration: {}", format_duration(track.duration_ms));

    let created = &resolved.created;
    if created.is_empty() {
        log::info!("  Already in catalog.");
    } else {
        log::info!(
            "  Created {} artist(s), {} album(s), {} track(s)",
            created.artists.if_supports_color(Stdout, |t| t.green()),
            created.albums.if_supports_color(Stdout, |t| t.green()),
            created.tracks.if_supports_color(Stdout, |t| t.green()),
        );
    }
    for warning in &resolved.warnings {
        log::warn!("{}", warning);
    }
    Ok(())
}

/// Format milliseconds as `m:ss`.
fn format_duration(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
