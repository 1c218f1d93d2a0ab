use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use redmusical_catalog::types::{FetchTask, Track};
use redmusical_import::{QueueWorker, ResolveError, Resolved, WorkerOptions, WorkerProgress};
use redmusical_spotify::CatalogApi;

use crate::CliError;
use crate::cli_types::ClientArgs;

/// Console progress for the worker: one line per task.
struct ConsoleProgress;

impl WorkerProgress for ConsoleProgress {
    fn on_batch(&self, picked: usize) {
        log::info!(
            "{}",
            format!("Processing {} task(s)", picked).if_supports_color(Stdout, |t| t.bold()),
        );
    }

    fn on_task_success(&self, task: &FetchTask, resolved: &Resolved<Track>) {
        let created = &resolved.created;
        let detail = if created.is_empty() {
            "already in catalog".to_string()
        } else {
            format!(
                "+{} track(s), +{} album(s), +{} artist(s)",
                created.tracks, created.albums, created.artists
            )
        };
        log::info!(
            "  {} {} {} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            task.external_id.if_supports_color(Stdout, |t| t.cyan()),
            resolved.value.title,
            format!("({})", detail).if_supports_color(Stdout, |t| t.dimmed()),
        );
        for warning in &resolved.warnings {
            log::info!(
                "    {}",
                warning.to_string().if_supports_color(Stdout, |t| t.yellow())
            );
        }
    }

    fn on_task_error(&self, task: &FetchTask, error: &ResolveError, retry_at: DateTime<Utc>) {
        log::warn!(
            "  {} {} {} (attempt {}, retry after {})",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            task.external_id,
            error,
            task.attempts.saturating_add(1),
            retry_at.with_timezone(&Local).format("%H:%M:%S"),
        );
    }

    fn on_idle(&self, sleep: Duration) {
        log::debug!("Queue empty, sleeping {}s", sleep.as_secs());
    }
}

pub(crate) fn run_worker(
    db: Option<PathBuf>,
    limit: u32,
    run_loop: bool,
    sleep: u64,
    client: &ClientArgs,
) -> Result<(), CliError> {
    let (conn, _) = super::open_catalog(db)?;
    let api = super::build_client(client)?;
    let options = WorkerOptions {
        limit: limit.max(1),
        run_loop,
        idle_sleep: Duration::from_secs(sleep),
    };
    let worker = QueueWorker::new(&conn, &api);
    let rt = super::runtime()?;
    rt.block_on(drive(&worker, &options))
}

async fn drive<A: CatalogApi>(
    worker: &QueueWorker<'_, A>,
    options: &WorkerOptions,
) -> Result<(), CliError> {
    if !options.run_loop {
        let stats = worker
            .run(options, &ConsoleProgress)
            .await
            .map_err(|e| CliError::database(e.to_string()))?;
        if stats.did_process() {
            crate::log_blank();
            log::info!(
                "Done: {} succeeded, {} failed, {} new track(s)",
                stats.succeeded.if_supports_color(Stdout, |t| t.green()),
                stats.failed.if_supports_color(Stdout, |t| t.red()),
                stats.tracks_created,
            );
            if stats.unrecorded > 0 {
                log::warn!(
                    "{} resolved task(s) could not be marked done and will be retried",
                    stats.unrecorded
                );
            }
        } else {
            log::info!("No eligible tasks in the queue.");
        }
        return Ok(());
    }

    log::info!(
        "Worker started (batch {}, idle sleep {}s). Press Ctrl-C to stop.",
        options.limit,
        options.effective_idle_sleep().as_secs(),
    );
    tokio::select! {
        result = worker.run(options, &ConsoleProgress) => {
            result.map(|_| ()).map_err(|e| CliError::database(e.to_string()))
        }
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| CliError::runtime(format!("Failed to listen for Ctrl-C: {}", e)))?;
            log::info!("Interrupted, stopping worker.");
            Ok(())
        }
    }
}
