//! Deadlock Detector CLI
//!
//! Thin front-end over `deadlock_core`: a single pass (`once`) or a
//! sleep-between-passes loop (`watch`), text or JSON output, and an optional
//! file alert sink. None of this is the detection algorithm — it is the
//! ambient front-end every module in `deadlock_core` is ultimately consumed
//! by.

mod alerting;
mod cli;
mod config_loader;
mod formatters;

use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use deadlock_core::{DeadlockReport, ProcReader};
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config_loader::load(cli.config.as_deref())?;
    let reader = ProcReader::new();

    match cli.command {
        Commands::Once { format, output } => {
            let report = deadlock_core::detect_once(&reader, &config)?;
            emit(&report, format, output.as_deref(), cli.verbose > 0)?;
            if report.deadlock_detected {
                std::process::exit(1);
            }
        }

        Commands::Watch {
            interval,
            format,
            output,
            alert_log,
        } => run_watch(&reader, &config, interval, format, output.as_deref(), alert_log.as_deref(), cli.verbose > 0)?,
    }

    Ok(())
}

fn run_watch(
    reader: &ProcReader,
    config: &deadlock_core::DetectorConfig,
    interval: u64,
    format: OutputFormat,
    output: Option<&Path>,
    alert_log: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let sink = alerting::sink_for(alert_log);
    tracing::info!(interval_seconds = interval, "starting continuous monitoring");

    loop {
        let report = deadlock_core::detect_once(reader, config)?;
        emit(&report, format, output, verbose)?;

        if report.deadlock_detected {
            let rendered = formatters::format_text(&report, verbose);
            sink.send(&report, &rendered)?;
        }

        std::thread::sleep(Duration::from_secs(interval));
    }
}

fn emit(
    report: &DeadlockReport,
    format: OutputFormat,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => formatters::format_text(report, verbose),
        OutputFormat::Json => formatters::format_json(report)?,
    };

    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            file.write_all(rendered.as_bytes())?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}
