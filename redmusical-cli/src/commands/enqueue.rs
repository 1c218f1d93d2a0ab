use std::path::PathBuf;

use chrono::Utc;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use redmusical_spotify::parse_track_id;
use rusqlite::Connection;

use crate::CliError;

pub(crate) fn run_enqueue(db: Option<PathBuf>, tracks: &[String]) -> Result<(), CliError> {
    let ids: Vec<(String, &str)> = tracks
        .iter()
        .filter_map(|raw| match parse_track_id(raw) {
            Some(id) => Some((id, raw.as_str())),
            None => {
                log::warn!("Not a Spotify track reference: {}", raw);
                None
            }
        })
        .collect();
    if ids.is_empty() {
        return Err(CliError::invalid_input("no valid track references given"));
    }

    let (conn, _) = super::open_catalog(db)?;
    let now = Utc::now();
    let mut added = 0;

    for (id, raw) in &ids {
        let inserted = redmusical_db::enqueue_fetch(&conn, id, now)
            .map_err(|e| CliError::database(format!("Failed to enqueue {}: {}", raw, e)))?;
        if inserted {
            added += 1;
            log::info!(
                "  {} {}",
                "queued".if_supports_color(Stdout, |t| t.green()),
                id
            );
        } else {
            let status = existing_status(&conn, id);
            log::info!(
                "  {} {} ({})",
                "exists".if_supports_color(Stdout, |t| t.dimmed()),
                id,
                status
            );
        }
    }

    crate::log_blank();
    log::info!("{} of {} track(s) added to the queue", added, ids.len());
    Ok(())
}

/// Status of an already-queued task, for display.
fn existing_status(conn: &Connection, id: &str) -> String {
    match redmusical_db::find_task(conn, id) {
        Ok(Some(task)) => task.status.to_string(),
        Ok(None) => "unknown".to_string(),
        Err(e) => {
            log::warn!("Could not read queue entry for {}: {}", id, e);
            "unknown".to_string()
        }
    }
}
