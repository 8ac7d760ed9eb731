//! CLI argument definitions for the wavetab pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "wavetab",
    version,
    about = "Harmonize survey waves and tabulate cohort statistics",
    long_about = "Harmonize per-wave survey extracts into a canonical schema,\n\
                  stack them, and produce cohort-by-sex aggregate and gap\n\
                  tables with small-cell suppression."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
    /// Run the full pipeline for a configuration file.
    Run(RunArgs),

    /// Validate a configuration file against its input files.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the JSON run configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output directory (overrides the configured one).
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Minimum per-sex group size before a cohort is published
    /// (overrides the configured threshold).
    #[arg(long = "min-n", value_name = "N")]
    pub min_n: Option<usize>,

    /// Normalize and tabulate without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the JSON run configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
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
