use std::path::PathBuf;

use chrono::{Local, Utc};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use redmusical_catalog::types::TaskStatus;

use crate::CliError;

use super::{open_existing_catalog, truncate_str};

pub(crate) fn run_queue_status(db: Option<PathBuf>) -> Result<(), CliError> {
    let Some((conn, path)) = open_existing_catalog(db)? else {
        return Ok(());
    };

    let counts = redmusical_db::queue_counts(&conn, Utc::now())
        .map_err(|e| CliError::database(format!("Failed to count queue: {}", e)))?;

    log::info!("{}", "Fetch Queue".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Database: {}", path.display());
    crate::log_blank();
    log::info!("  Pending:          {:>8}", counts.pending);
    log::info!("  Failed (waiting): {:>8}", counts.error_waiting);
    log::info!("  Failed (due):     {:>8}", counts.error_eligible);
    log::info!("  Succeeded:        {:>8}", counts.success);
    crate::log_blank();
    log::info!(
        "  Eligible now:     {:>8}",
        counts.eligible().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}

pub(crate) fn run_queue_list(
    db: Option<PathBuf>,
    status: Option<TaskStatus>,
    limit: u32,
) -> Result<(), CliError> {
    let Some((conn, _)) = open_existing_catalog(db)? else {
        return Ok(());
    };

    let tasks = redmusical_db::list_tasks(&conn, status, limit)
        .map_err(|e| CliError::database(format!("Failed to list tasks: {}", e)))?;
    if tasks.is_empty() {
        log::info!("No tasks.");
        return Ok(());
    }

    for task in &tasks {
        let status = match task.status {
            TaskStatus::Pending => format!("{:<7}", "pending")
                .if_supports_color(Stdout, |t| t.yellow())
                .to_string(),
            TaskStatus::Success => format!("{:<7}", "success")
                .if_supports_color(Stdout, |t| t.green())
                .to_string(),
            TaskStatus::Error => format!("{:<7}", "error")
                .if_supports_color(Stdout, |t| t.red())
                .to_string(),
        };
        log::info!(
            "  {} {:<24} attempts {:>2}  updated {}",
            status,
            task.external_id,
            task.attempts,
            task.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        );
        if task.status == TaskStatus::Error {
            let retry = task
                .next_retry_at
                .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            log::info!(
                "          {} {}",
                format!("retry {}:", retry).if_supports_color(Stdout, |t| t.dimmed()),
                truncate_str(&task.last_error, 100),
            );
        }
    }
    Ok(())
}
