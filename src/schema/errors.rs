//! Schema error types
//!
//! All of these are startup-time errors: a record type with a bad column
//! declaration is a coding mistake, caught at registration and never at
//! the call sites that read or write rows.

use thiserror::Error;

/// Result type for schema registration
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors in a record type's declaration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No column is marked as the primary key and none is named `id`
    #[error("table \"{table}\" declares no primary-key column and has no \"id\" column")]
    MissingPrimaryKey { table: String },

    /// More than one column carries the primary-key marker
    #[error("table \"{table}\" marks {count} columns as primary key, expected exactly one")]
    AmbiguousPrimaryKey { table: String, count: usize },

    /// The same record type was registered twice
    #[error("record type for table \"{table}\" is already registered")]
    AlreadyRegistered { table: String },
}
