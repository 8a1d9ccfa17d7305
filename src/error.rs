//! Error types for the relay.
//!
//! Every component returns [`RelayError`]; only `main` converts to
//! [`anyhow::Error`].  Startup failures (config, unreadable or corrupt store)
//! stop the process; everything raised inside a cycle is absorbed by
//! [`crate::poll`].

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The feed could not be downloaded or parsed.
    #[error("feed fetch failed: {0}")]
    Fetch(String),

    /// A single entry has no usable identifier.
    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    /// The notification transport rejected or never received the message.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The sent-id file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sent-id file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sent-id file exists but is not a JSON array of strings.
    #[error("corrupt store {}: {source}", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Fetch(e.to_string())
    }
}
