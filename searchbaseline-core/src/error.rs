//! Error types for searchbaseline-core

use thiserror::Error;

/// Main error type for the searchbaseline-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Event store error
    #[error("event store error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A timestamp candidate matched neither accepted format
    #[error("unrecognized timestamp format: {value}")]
    Timestamp { value: String },

    /// An event carried no parseable timestamp in any candidate field
    #[error("no usable timestamp for event in session {session_id}")]
    MissingTimestamp { session_id: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for searchbaseline-core
pub type Result<T> = std::result::Result<T, Error>;
