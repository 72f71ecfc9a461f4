//! Error types for the console capture server
//!
//! Every per-request failure is a `QuillError`, which converts into an HTTP
//! response at the handler boundary. Startup failures use the same type but
//! are reported by the binary and end the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuillError {
    #[error("Not Found")]
    NotFound,

    #[error("JavaScript file not found: {}", path.display())]
    AssetMissing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error logging message: {message}")]
    MalformedSubmission { message: String },

    #[error("Error logging message: failed to append to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error logging message: log writer lock poisoned")]
    LockPoisoned,

    #[error("Error logging message: writer task failed: {source}")]
    WriterTask {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error("Failed to bind {addr}: {source}")]
    Startup {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type QuillResult<T> = Result<T, QuillError>;

impl QuillError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSubmission {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            QuillError::NotFound | QuillError::AssetMissing { .. } => StatusCode::NOT_FOUND,
            QuillError::AssetRead { .. }
            | QuillError::MalformedSubmission { .. }
            | QuillError::Persistence { .. }
            | QuillError::LockPoisoned
            | QuillError::WriterTask { .. }
            | QuillError::Startup { .. }
            | QuillError::Serve { .. }
            | QuillError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        QuillError::malformed(err.to_string())
    }
}

impl From<figment::Error> for QuillError {
    fn from(err: figment::Error) -> Self {
        QuillError::config(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for QuillError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        (code, Json(ErrBody { error: self.to_string() })).into_response()
    }
}
