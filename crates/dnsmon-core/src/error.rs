//! Error types for DNS telemetry
//!
//! Public telemetry operations never return these; they surface only from
//! setup steps (configuration, watch establishment) and end at the log
//! boundary.

use thiserror::Error;

/// Result type alias for dnsmon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dnsmon
#[derive(Error, Debug)]
pub enum Error {
    /// File watch could not be established or re-established
    #[error("Watch error: {0}")]
    Watch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors reported by the file notification backend
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

impl Error {
    /// Create a watch error
    pub fn watch(msg: impl Into<String>) -> Self {
        Self::Watch(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
