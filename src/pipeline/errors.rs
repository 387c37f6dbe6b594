//! Write-pipeline error types

use thiserror::Error;

use crate::codec::CodecError;
use crate::remote::RemoteError;

/// Errors resolved onto a write ticket
#[derive(Debug, Error)]
pub enum WriteError {
    /// The remote call for this request failed
    #[error("{operation} on table \"{table}\" failed: {source}")]
    Remote {
        operation: &'static str,
        table: String,
        #[source]
        source: RemoteError,
    },

    /// The record could not be turned into a payload
    #[error(transparent)]
    Payload(#[from] CodecError),

    /// The request was submitted after the pipeline shut down, or the
    /// worker went away before resolving the ticket
    #[error("write pipeline is terminated")]
    Terminated,
}
