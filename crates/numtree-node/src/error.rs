//! Error types for the numtree daemon.

use thiserror::Error;

/// Result type for daemon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the daemon.
#[derive(Debug, Error)]
pub enum Error {
    /// Ledger error
    #[error(transparent)]
    Ledger(#[from] numtree_ledger::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
