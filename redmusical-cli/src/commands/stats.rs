use std::path::PathBuf;

use chrono::Utc;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::open_existing_catalog;

pub(crate) fn run_stats(db: Option<PathBuf>) -> Result<(), CliError> {
    let Some((conn, path)) = open_existing_catalog(db)? else {
        return Ok(());
    };

    let stats = redmusical_db::catalog_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to get stats: {}", e)))?;
    let queue = redmusical_db::queue_counts(&conn, Utc::now())
        .map_err(|e| CliError::database(format!("Failed to count queue: {}", e)))?;

    log::info!("{}", "Catalog Statistics".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Database: {}", path.display());
    crate::log_blank();
    log::info!("  Artists:  {:>8}", stats.artists);
    log::info!("  Albums:   {:>8}", stats.albums);
    log::info!("  Tracks:   {:>8}", stats.tracks);
    log::info!("  Genres:   {:>8}", stats.genres);
    crate::log_blank();
    log::info!(
        "  Queue:    {:>8} task(s), {} eligible, {} done",
        queue.total(),
        queue.eligible().if_supports_color(Stdout, |t| t.cyan()),
        queue.success,
    );
    Ok(())
}
