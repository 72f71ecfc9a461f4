// Runtime configuration for the console capture server.
// Built once at startup and shared read-only with every request handler.

use crate::errors::{QuillError, QuillResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9876;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const SCRIPT_ROUTE: &str = "/console-quill.js";
pub const SCRIPT_RELATIVE_PATH: &str = "static/console-quill.js";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Destination for appended JSON lines.
    pub logfile: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Location of the capture script served at `/console-quill.js`.
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,
    /// Emit one tracing span per request. Off unless asked for.
    #[serde(default)]
    pub access_log: bool,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

pub(crate) fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// `static/console-quill.js` next to the running executable, falling back to
/// the copy in the crate's source tree.
pub fn default_script_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_script_path(exe_dir.as_deref())
}

pub(crate) fn resolve_script_path(exe_dir: Option<&Path>) -> PathBuf {
    exe_dir
        .map(|dir| dir.join(SCRIPT_RELATIVE_PATH))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(SCRIPT_RELATIVE_PATH))
}

impl QuillConfig {
    pub fn new(logfile: impl Into<PathBuf>) -> Self {
        Self {
            logfile: logfile.into(),
            host: default_host(),
            port: default_port(),
            script_path: default_script_path(),
            access_log: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_script_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_path = path.into();
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> QuillResult<()> {
        if self.logfile.as_os_str().is_empty() {
            return Err(QuillError::config("logfile cannot be empty"));
        }
        if self.host.trim().is_empty() {
            return Err(QuillError::config("host cannot be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(QuillError::config("max_body_bytes must be greater than zero"));
        }
        Ok(())
    }
}
