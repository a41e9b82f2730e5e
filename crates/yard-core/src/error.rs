//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `YardError` as one
//! variant where they need configuration or I/O failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by `yard-core` (configuration loading, parsing).
#[derive(Debug, Error)]
pub enum YardError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse {path}: {source}")]
    Json {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `yard-core`.
pub type YardResult<T> = Result<T, YardError>;
