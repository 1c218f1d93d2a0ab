pub(crate) mod config;
pub(crate) mod enqueue;
pub(crate) mod queue;
pub(crate) mod resolve;
pub(crate) mod search;
pub(crate) mod stats;
pub(crate) mod worker;

use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use redmusical_spotify::{Credentials, RateLimitedClient, SpotifyClient, Throttle};
use rusqlite::Connection;

use crate::CliError;
use crate::cli_types::ClientArgs;

/// Default catalog location: `<data_dir>/redmusical/catalog.db`.
pub(crate) fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("redmusical")
        .join("catalog.db")
}

/// Open (creating or migrating as needed) the catalog database.
pub(crate) fn open_catalog(db: Option<PathBuf>) -> Result<(Connection, PathBuf), CliError> {
    let path = db.unwrap_or_else(default_db_path);
    let conn = redmusical_db::open_database(&path).map_err(|e| {
        CliError::database(format!(
            "Failed to open catalog database {}: {}",
            path.display(),
            e
        ))
    })?;
    log::debug!("Using catalog database {}", path.display());
    Ok((conn, path))
}

/// Open the catalog if it already exists. Otherwise tell the user and
/// return `None`.
pub(crate) fn open_existing_catalog(
    db: Option<PathBuf>,
) -> Result<Option<(Connection, PathBuf)>, CliError> {
    let path = db.unwrap_or_else(default_db_path);
    if !path.exists() {
        log::warn!("No catalog database found at {}", path.display());
        log::info!("Run 'redmusical enqueue <TRACK>' to create one.");
        return Ok(None);
    }
    open_catalog(Some(path)).map(Some)
}

/// Build the paced Spotify client from configured credentials.
pub(crate) fn build_client(args: &ClientArgs) -> Result<RateLimitedClient<SpotifyClient>, CliError> {
    let creds = Credentials::load().map_err(|e| CliError::config(e.to_string()))?;
    let http = SpotifyClient::with_timeout(creds, Duration::from_secs(args.timeout_secs.max(1)))
        .map_err(|e| CliError::api(e.to_string()))?;
    let throttle = Throttle::new(Duration::from_millis(args.min_interval_ms));
    Ok(RateLimitedClient::with_throttle(http, throttle))
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}

/// A steady-ticking spinner, hidden in quiet mode.
pub(crate) fn spinner(quiet: bool, msg: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("/-\\|"));
    }
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Truncate a string to a maximum width in characters, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max).collect()
    }
}
