//! Append-only JSON-lines sink for captured console messages
//!
//! Each accepted submission becomes one `LogEvent`, serialized to a single
//! line and appended to the configured file. The file is opened, written and
//! closed per event; nothing is buffered between requests.

use crate::errors::{QuillError, QuillResult};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DEFAULT_LEVEL: &str = "log";

/// Body of a `POST /log` request. Unknown fields are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LogSubmission {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LogSubmission {
    /// Decode a request body. Anything other than a JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> QuillResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(QuillError::malformed("log payload must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// One captured console message as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

impl LogEvent {
    /// Stamp a submission with the current server time.
    pub fn received(submission: LogSubmission) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: submission
                .level
                .unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            message: submission.message.unwrap_or_default(),
        }
    }

    pub fn to_line(&self) -> QuillResult<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Appends events to a single file.
///
/// Appends from this process are serialized behind a mutex and each line is
/// written with one `write_all`, so concurrent requests never interleave
/// within a line.
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocking append. Creates the file if it does not exist.
    pub fn append(&self, event: &LogEvent) -> QuillResult<()> {
        let line = event.to_line()?;
        let _guard = self.lock.lock().map_err(|_| QuillError::LockPoisoned)?;

        let persistence = |source: std::io::Error| QuillError::Persistence {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(persistence)?;
        file.write_all(line.as_bytes()).map_err(persistence)?;

        Ok(())
    }
}
