use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use redmusical_spotify::CatalogApi;

use crate::CliError;
use crate::cli_types::ClientArgs;

use super::truncate_str;

pub(crate) fn run_search(query: &str, limit: u32, client: &ClientArgs) -> Result<(), CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::invalid_input("empty search query"));
    }

    let api = super::build_client(client)?;
    let rt = super::runtime()?;
    let tracks = rt
        .block_on(api.search_tracks(query, limit.max(1)))
        .map_err(|e| CliError::api(format!("Search failed: {}", e)))?;

    if tracks.is_empty() {
        log::info!("No tracks match '{}'.", query);
        return Ok(());
    }

    for track in &tracks {
        let id = track.id.as_deref().unwrap_or("-");
        let artist = track
            .primary_artist()
            .map(|a| a.name.as_str())
            .unwrap_or("?");
        log::info!(
            "  {:<22} {} {} {}",
            id.if_supports_color(Stdout, |t| t.cyan()),
            truncate_str(&track.name, 40),
            format!("- {}", truncate_str(artist, 30)).if_supports_color(Stdout, |t| t.bold()),
            format!("({})", truncate_str(&track.album.name, 30))
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}
