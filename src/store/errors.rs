//! Store error types
//!
//! Reads return these; they are never thrown past the facade. Write
//! failures travel on the ticket as `WriteError` instead.

use thiserror::Error;

use crate::codec::CodecError;
use crate::remote::RemoteError;

/// Result type for store reads
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the read surface
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A row could not be mapped to its record type
    #[error(transparent)]
    Codec(#[from] CodecError),
}
