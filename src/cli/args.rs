/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::engine::HttpMethod;

/// typeahead: search-as-you-type over grouped records.
#[derive(Debug, Parser)]
#[command(
    name = "typeahead",
    about = "Search-as-you-type over grouped records from a local file or a remote endpoint",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output format. Auto-detects: table when TTY, json when piped.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "auto")]
    pub output: OutputFormat,

    /// Shorthand for --output json.
    #[arg(long, global = true, conflicts_with = "output")]
    pub json: bool,

    /// Comma-separated record fields to show per result (projection).
    /// Defaults to the field that matched.
    #[arg(long, global = true, value_name = "FIELDS")]
    pub fields: Option<String>,

    /// Omit table headers (useful for awk/cut processing).
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Enable debug logging and print phase timings to stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Search settings; each flag overrides the config file.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// JSON settings file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remote URL (http/https) or path to a JSON file of groups.
    #[arg(long, global = true, value_name = "URL|PATH")]
    pub source: Option<String>,

    /// HTTP method for remote sources.
    #[arg(long, global = true, value_name = "METHOD")]
    pub method: Option<HttpMethod>,

    /// Queries must be longer than this many characters.
    #[arg(long, global = true, value_name = "N")]
    pub min_length: Option<usize>,

    /// Debounce window for remote searches, in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub delay: Option<u64>,

    /// Case-sensitive matching.
    #[arg(long, global = true)]
    pub case_sensitive: bool,

    /// Do not highlight the query in rendered results.
    #[arg(long, global = true)]
    pub no_highlight: bool,

    /// Production mode: suppress configuration and remote notices.
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Auto-detect: table when stdout is a TTY, json when piped.
    #[default]
    Auto,
    /// JSON array or object (pretty-printed).
    Json,
    /// Compact single-line JSON.
    Compact,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
    /// Aligned table with headers (human-readable).
    Table,
    /// Rendered results panel as HTML, with highlighting.
    Html,
}

/// All subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single search and print the matches.
    Search(SearchArgs),
    /// Read input values from stdin, one per line, and search as they arrive.
    Watch,
    /// List the groups of a local source with their record counts.
    Groups,
}

/// Arguments for `typeahead search`.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Search query string.
    pub query: String,
}
