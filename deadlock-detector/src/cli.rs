//! Argument parsing for the `deadlock-detector` binary.
//!
//! Replaces the hand-rolled `argv` loop in `original_source/src/main.c`
//! (`-c/--continuous`, `-i/--interval`, `-f/--format`, `-o/--output`, ...)
//! with a `clap` derive, in the style of `compliance-runner`'s `Cli`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deadlock-detector")]
#[command(about = "Resource-allocation-graph deadlock detector for Linux processes", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML config file overriding the detector's defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single detection pass and exit
    Once {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run detection passes continuously
    Watch {
        /// Seconds to sleep between passes
        #[arg(short, long, default_value_t = 5)]
        interval: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append each pass's text report to this log file when a deadlock is found
        #[arg(long)]
        alert_log: Option<PathBuf>,
    },
}
