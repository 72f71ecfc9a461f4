//! Library root for the `console_quill` crate
//! Local HTTP endpoint that appends browser console output to a JSON-lines file

// Core error handling
pub mod errors;

// Configuration & CLI
pub mod cli;
pub mod config;
pub mod config_loader;

// Log persistence
pub mod log_sink;

// Web server interface
pub mod server;
pub mod web;

// Logging
pub mod telemetry;

pub use config::QuillConfig;
pub use errors::{QuillError, QuillResult};
pub use log_sink::{LogEvent, LogSubmission, LogWriter};
pub use web::{build_router, AppState};
