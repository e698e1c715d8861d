//! Error types shared across CubeCap crates.

use std::path::PathBuf;

/// Top-level error type for CubeCap operations.
#[derive(Debug, thiserror::Error)]
pub enum CubecapError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Resolutions above 4096 require prior explicit consent")]
    ConsentMissing,

    #[error("A capture is already in progress")]
    CaptureInProgress,

    #[error("Object has no usable storage identity: {message}")]
    MissingIdentity { message: String },

    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CubecapError.
pub type CubecapResult<T> = Result<T, CubecapError>;

impl CubecapError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn missing_identity(msg: impl Into<String>) -> Self {
        Self::MissingIdentity {
            message: msg.into(),
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }
}
