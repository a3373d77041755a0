//! Error types for the ledger.

use thiserror::Error;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ledger operations.
///
/// Every variant except [`Error::Storage`] and [`Error::Serialization`] is a
/// domain rejection scoped to the single failed call. The two store variants
/// report transport or storage failures and are never retried here.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An identifier is not well-formed
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// The referenced parent node does not exist
    #[error("Parent node not found: {0}")]
    ParentNotFound(String),

    /// Division with a zero right operand
    #[error("Division by zero")]
    DivisionByZero,

    /// Operation symbol outside `+ - * /`
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for failures of the underlying store rather than of the request.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Serialization(_))
    }
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
