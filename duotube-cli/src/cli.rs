use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use duotube::SourceKind;

#[derive(Parser, Debug)]
#[command(name = "duotube", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DUOTUBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for videos
    Search {
        /// Search query
        query: String,

        /// Result page (mirror only)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Sort order: relevance, rating, date, views
        #[arg(long)]
        sort: Option<String>,

        /// Upload date: any, hour, today, week, month, year
        #[arg(long)]
        date: Option<String>,

        /// Duration: any, short, medium, long
        #[arg(long)]
        duration: Option<String>,

        /// Result type: all, video, channel, playlist, movie, show
        #[arg(long = "type")]
        result_type: Option<String>,
    },

    /// Show trending videos
    Trending {
        /// Two-letter region code, defaults to the stored setting
        #[arg(short, long)]
        region: Option<String>,

        /// Trending category (mirror only): music, gaming, news, movies
        #[arg(long)]
        category: Option<String>,
    },

    /// Show details for a video id or URL
    Video {
        /// Video id or URL
        video: String,
    },

    /// Show a channel summary (mirror only)
    Channel {
        /// Channel id
        id: String,
    },

    /// Print a direct stream URL
    Stream {
        /// Video id or URL
        video: String,
    },

    /// Print embed and watch URLs for the active source
    Embed {
        /// Video id or URL
        video: String,
    },

    /// Manage the mirror pool
    Instances {
        #[command(subcommand)]
        action: InstanceAction,
    },

    /// Show or clear search history
    History {
        /// Clear the history
        #[arg(long)]
        clear: bool,
    },

    /// Show the last cached result list
    Cache,

    /// Manage the primary API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Show or set the preferred source
    Source {
        /// primary or mirror
        source: Option<SourceKind>,
    },

    /// Show or update settings
    Settings {
        /// Default region code
        #[arg(long)]
        region: Option<String>,

        /// Results per request (1-50)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50))]
        max_results: Option<u32>,

        /// UI theme
        #[arg(long)]
        theme: Option<String>,
    },

    /// Delete stored state
    Reset {
        /// Only clear cached results and search history
        #[arg(long)]
        videos_only: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum InstanceAction {
    /// List the allow-list and the active instance
    List,
    /// Health-check the active instance, switching if it is down
    Check,
    /// Move to another random instance
    Refresh,
    /// Pin an instance from the allow-list
    Select {
        /// Instance URL
        url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Store an API key
    Set {
        /// API key
        key: String,
    },
    /// Remove the stored key
    Clear,
    /// Show whether a key is stored
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Rewrite the configuration file with defaults
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact)
    }
}
