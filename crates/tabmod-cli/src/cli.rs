//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tabmod",
    version,
    about = "Run serialized modifier pipelines over tables",
    long_about = "Load a table (CSV or JSON), apply a serialized modifier record \
                  (Chain, Sort, Range, Group, Invert, SeriesPoints) and write the result."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

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
    /// Apply a modifier pipeline to a table.
    Apply(ApplyArgs),

    /// List the registered modifier kinds and their default options.
    Kinds,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Input table (.csv or .json).
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// Serialized modifier record to apply.
    #[arg(long = "pipeline", value_name = "JSON")]
    pub pipeline: PathBuf,

    /// Output path (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format (default: from the output extension, else json).
    #[arg(long = "format", value_enum)]
    pub format: Option<TableFormatArg>,

    /// Print a per-step summary table.
    #[arg(long = "summary")]
    pub summary: bool,

    /// Print the first rows of the result as a DataFrame.
    #[arg(long = "preview", value_name = "ROWS", num_args = 0..=1, default_missing_value = "10")]
    pub preview: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TableFormatArg {
    Json,
    Csv,
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
