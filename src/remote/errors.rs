//! Remote-store error types

use thiserror::Error;

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors from the remote store boundary
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The remote endpoint could not be reached
    #[error("remote store unreachable: {0}")]
    Connection(String),

    /// The remote rejected or failed the operation
    #[error("remote query on table \"{table}\" failed: {message}")]
    Query { table: String, message: String },

    /// The concrete client does not support this operation shape
    #[error("remote store does not support {0}")]
    Unsupported(&'static str),
}

impl RemoteError {
    /// Create a query error
    pub fn query(table: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::Query {
            table: table.into(),
            message: message.into(),
        }
    }
}
