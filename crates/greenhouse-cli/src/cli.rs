//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use greenhouse_model::ReadingStatus;
use greenhouse_query::{DEFAULT_PAGE, DEFAULT_PER_PAGE};

#[derive(Parser)]
#[command(
    name = "greenhouse",
    version,
    about = "Validate, store and query greenhouse telemetry documents",
    long_about = "Validate greenhouse telemetry XML documents against the document grammar \
                  and business rules, store accepted documents with their metadata, \
                  and query stored readings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding stored documents and metadata.
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "GREENHOUSE_DATA_DIR",
        default_value = "data",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate documents and store the ones that pass.
    Ingest(IngestArgs),

    /// Validate a document and list every finding without storing it.
    Validate(ValidateArgs),

    /// Print a stored document or its metadata.
    Show(ShowArgs),

    /// List stored readings matching filters.
    Query(QueryArgs),
}

#[derive(Parser)]
pub struct IngestArgs {
    /// XML documents to ingest.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Print outcomes as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// XML document to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the full report (diagnostics and metadata) as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Document id printed by `ingest`.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Print the metadata record instead of the raw document.
    #[arg(long)]
    pub metadata: bool,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Sensor kind, e.g. temperature.
    #[arg(long)]
    pub kind: Option<String>,

    /// Earliest timestamp (inclusive).
    #[arg(long, value_name = "DATETIME")]
    pub start: Option<String>,

    /// Latest timestamp (inclusive).
    #[arg(long, value_name = "DATETIME")]
    pub end: Option<String>,

    /// Reading status: ok, out_of_range or unknown_range.
    #[arg(long)]
    pub status: Option<ReadingStatus>,

    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: usize,

    #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: usize,

    /// Print the page as JSON.
    #[arg(long)]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
