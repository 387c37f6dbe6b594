//! Codec error types

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors converting between records and field maps
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The record could not be serialized into a field map
    #[error("failed to encode record for table \"{table}\": {message}")]
    Encode { table: String, message: String },

    /// A row from the remote store does not satisfy the record type,
    /// typically a required field is missing
    #[error("row from table \"{table}\" could not be decoded: {message}")]
    Decode { table: String, message: String },

    /// The record serialized to something other than a JSON object
    #[error("record for table \"{table}\" did not encode to an object")]
    NotAnObject { table: String },
}

impl CodecError {
    /// Table the failing row or record belongs to
    pub fn table(&self) -> &str {
        match self {
            CodecError::Encode { table, .. }
            | CodecError::Decode { table, .. }
            | CodecError::NotAnObject { table } => table,
        }
    }
}
