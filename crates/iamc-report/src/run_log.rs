//! The per-run text log.
//!
//! Every warning, error and informational line the pipeline reports is
//! mirrored to `tracing` and kept here, then written as one plain text file
//! at the end of the run. The file is overwritten each run.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RunLog {
    started: DateTime<Local>,
    entries: Vec<LogEntry>,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            started: Local::now(),
            entries: Vec::new(),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.push(LogLevel::Error, message);
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.entries.push(LogEntry { level, message });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// Log lines without the header, one `LEVEL - message` per line.
    pub fn render_entries(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!("{} - {}\n", entry.level, entry.message));
        }
        out
    }

    /// Writes the log to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }
        let header = format!(
            "# run started {}\n",
            self.started.to_rfc3339_opts(SecondsFormat::Secs, false)
        );
        std::fs::write(path, header + &self.render_entries())
            .map_err(|e| ReportError::io(path, e))
    }
}
