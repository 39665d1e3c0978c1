//! Error types for the formula ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pipeline operations.
///
/// Only structural problems surface here. Low-quality or oddly shaped
/// formula content is dropped or defaulted by the stages themselves.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted record line could not be decoded.
    #[error("Corrupt record in '{path}' at line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed XML in a Wikipedia dump.
    #[error("XML error in '{path}': {message}")]
    Xml { path: PathBuf, message: String },

    /// Request to an external service failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML topic map error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, IngestError>;
