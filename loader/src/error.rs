//! Error types for schema document loading.
//!
//! Covers reading and writing documents, decoding them as YAML or JSON, and
//! rejecting documents that describe an invalid command tree.

use argkit_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading or building a schema document.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document decoded but describes an invalid command.
    #[error("invalid schema for command '{command}': {source}")]
    Schema {
        command: String,
        #[source]
        source: SchemaError,
    },

    /// The file extension maps to no known document format.
    #[error("unsupported schema format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
