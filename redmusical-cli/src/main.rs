//! redmusical CLI
//!
//! Command-line interface for the Spotify catalog ingestion pipeline.

mod cli_types;
mod commands;
mod error;
mod logging;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction, QueueAction};
pub(crate) use error::CliError;

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    let db = cli.db;
    let result = match cli.command {
        Commands::Worker {
            limit,
            run_loop,
            sleep,
            client,
        } => commands::worker::run_worker(db, limit, run_loop, sleep, &client),
        Commands::Enqueue { tracks } => commands::enqueue::run_enqueue(db, &tracks),
        Commands::Queue { action } => match action {
            QueueAction::Status => commands::queue::run_queue_status(db),
            QueueAction::List { status, limit } => {
                commands::queue::run_queue_list(db, status.map(Into::into), limit)
            }
        },
        Commands::Resolve { track, client } => {
            commands::resolve::run_resolve(db, &track, &client, cli.quiet)
        }
        Commands::Search {
            query,
            limit,
            client,
        } => commands::search::run_search(&query, limit, &client),
        Commands::Stats => commands::stats::run_stats(db),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::Test => commands::config::run_config_test(cli.quiet),
        },
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
