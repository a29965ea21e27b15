//! Error types shared across Handweave crates.

use std::path::PathBuf;

/// Top-level error type for Handweave operations.
#[derive(Debug, thiserror::Error)]
pub enum HandweaveError {
    #[error("Malformed landmark frame: {message}")]
    MalformedFrame { message: String },

    #[error("Formation error: {message}")]
    Formation { message: String },

    #[error("Scheduler error: {message}")]
    Scheduler { message: String },

    #[error("Landmark source error: {message}")]
    Source { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using HandweaveError.
pub type HandweaveResult<T> = Result<T, HandweaveError>;

impl HandweaveError {
    pub fn malformed_frame(msg: impl Into<String>) -> Self {
        Self::MalformedFrame {
            message: msg.into(),
        }
    }

    pub fn formation(msg: impl Into<String>) -> Self {
        Self::Formation {
            message: msg.into(),
        }
    }

    pub fn scheduler(msg: impl Into<String>) -> Self {
        Self::Scheduler {
            message: msg.into(),
        }
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the error only affects a single detection cycle.
    ///
    /// Recoverable errors drop the offending frame; the session keeps running.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedFrame { .. } | Self::Json(_))
    }
}
