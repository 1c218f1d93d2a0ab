//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use redmusical_catalog::types::TaskStatus;
use redmusical_import::DEFAULT_BATCH_LIMIT;
use redmusical_spotify::DEFAULT_SEARCH_LIMIT;

#[derive(Parser)]
#[command(name = "redmusical")]
#[command(about = "Ingest Spotify tracks into the local music catalog", long_about = None)]
pub(crate) struct Cli {
    /// Catalog database path (defaults to the user data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tuning for outbound Spotify calls.
#[derive(Args, Clone)]
pub(crate) struct ClientArgs {
    /// Minimum gap between Spotify calls, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub min_interval_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 6)]
    pub timeout_secs: u64,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Process queued track fetches
    Worker {
        /// Maximum tasks per batch
        #[arg(short, long, default_value_t = DEFAULT_BATCH_LIMIT)]
        limit: u32,

        /// Keep polling the queue until interrupted
        #[arg(long = "loop")]
        run_loop: bool,

        /// Seconds to sleep when the queue is empty (minimum 1)
        #[arg(long, default_value_t = 30)]
        sleep: u64,

        #[command(flatten)]
        client: ClientArgs,
    },

    /// Queue tracks for ingestion (ids, spotify:track: URIs or open.spotify.com links)
    Enqueue {
        /// Track references
        #[arg(required = true)]
        tracks: Vec<String>,
    },

    /// Inspect the fetch queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Resolve one track immediately, bypassing the queue
    Resolve {
        /// Track reference
        track: String,

        #[command(flatten)]
        client: ClientArgs,
    },

    /// Search Spotify for tracks
    Search {
        /// Free-text query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,

        #[command(flatten)]
        client: ClientArgs,
    },

    /// Show catalog and queue statistics
    Stats,

    /// Manage Spotify credentials configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum QueueAction {
    /// Show task counts by state
    Status,

    /// List tasks, most recently updated first
    List {
        /// Only show tasks in this state
        #[arg(short, long)]
        status: Option<StatusFilter>,

        /// Maximum tasks to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current credentials and their sources
    Show,
    /// Print the config file path
    Path,
    /// Test credentials against the Spotify API
    Test,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum StatusFilter {
    Pending,
    Success,
    Error,
}

impl From<StatusFilter> for TaskStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Pending => TaskStatus::Pending,
            StatusFilter::Success => TaskStatus::Success,
            StatusFilter::Error => TaskStatus::Error,
        }
    }
}
