//! Minimal alert-sink abstraction (out of scope per spec.md §1, ambient
//! front-end only).
//!
//! `original_source/src/main.c` also accepts `--email-to`/`--smtp-server`
//! flags for an SMTP alert path; that transport is simply not built here —
//! the trait below is the extension point a future `EmailSink` would
//! implement, not a stub standing in for one.

use anyhow::{Context, Result};
use deadlock_core::DeadlockReport;
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait AlertSink {
    fn send(&self, report: &DeadlockReport, rendered: &str) -> Result<()>;
}

/// Discards every alert. Used when the CLI is run without `--alert-log`.
pub struct NoopSink;

impl AlertSink for NoopSink {
    fn send(&self, _report: &DeadlockReport, _rendered: &str) -> Result<()> {
        Ok(())
    }
}

/// Appends the rendered text report to a file, grounded on
/// `original_source/src/main.c`'s `--log-file` option.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: PathBuf) -> Self {
        LogSink { path }
    }
}

impl AlertSink for LogSink {
    fn send(&self, report: &DeadlockReport, rendered: &str) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening alert log {}", self.path.display()))?;
        writeln!(
            file,
            "--- {} ---\n{}",
            report.timestamp.to_rfc3339(),
            rendered
        )
        .context("writing alert log entry")?;
        Ok(())
    }
}

pub fn sink_for(path: Option<&Path>) -> Box<dyn AlertSink> {
    match path {
        Some(p) => Box::new(LogSink::new(p.to_path_buf())),
        None => Box::new(NoopSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report() -> DeadlockReport {
        DeadlockReport {
            deadlock_detected: true,
            deadlocked_pids: vec![1, 2],
            cycles: Vec::new(),
            recommendations: Vec::new(),
            timestamp: Utc::now(),
            total_processes_scanned: 2,
            total_resources_found: 1,
        }
    }

    #[test]
    fn log_sink_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        let sink = LogSink::new(path.clone());

        sink.send(&report(), "first pass").unwrap();
        sink.send(&report(), "second pass").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("first pass"));
        assert!(content.contains("second pass"));
    }

    #[test]
    fn noop_sink_never_errors() {
        assert!(NoopSink.send(&report(), "ignored").is_ok());
    }
}
