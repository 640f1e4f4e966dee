//! CLI argument definitions for the tabular aggregator.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tabagg",
    version,
    about = "Aggregate CSV and Excel files from a folder into one workbook",
    long_about = "Aggregate the CSV, XLSX and XLS files found directly inside a folder.\n\n\
                  Choose the columns to keep (or ALL), and every matching row is written to\n\
                  <FOLDER>/processed/output.xlsx with a Source_name column naming its file.\n\
                  Files missing any selected column are skipped."
)]
pub struct Cli {
    /// Folder containing the files to aggregate (prompted for when omitted).
    #[arg(value_name = "FOLDER")]
    pub folder: Option<PathBuf>,

    /// Columns to keep, comma-separated, or ALL (skips the interactive prompt).
    #[arg(long = "columns", value_name = "LIST")]
    pub columns: Option<String>,

    /// Aggregate and report without writing the output workbook.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
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
