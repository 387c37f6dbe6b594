//! Write requests, outcomes, and completion tickets

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::codec::FieldMap;
use crate::remote::Filter;
use crate::schema::TableDescriptor;

use super::errors::WriteError;

/// The four mutations the pipeline can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Insert,
    Update,
    Upsert,
    Delete,
}

impl WriteOperation {
    /// Operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            WriteOperation::Insert => "insert",
            WriteOperation::Update => "update",
            WriteOperation::Upsert => "upsert",
            WriteOperation::Delete => "delete",
        }
    }
}

/// One pending mutation, immutable once created
#[derive(Debug)]
pub struct WriteRequest {
    /// Request id for log correlation
    pub id: Uuid,
    /// Target table
    pub table: String,
    /// Primary-key filter identifying the logical record
    pub key: Filter,
    /// Which mutation to apply
    pub operation: WriteOperation,
    /// Encoded fields; empty for deletes
    pub payload: FieldMap,
    /// When the request entered the queue
    pub submitted_at: DateTime<Utc>,
}

impl WriteRequest {
    /// Build a request against a resolved table descriptor
    pub fn new(
        descriptor: &TableDescriptor,
        key: impl Into<serde_json::Value>,
        operation: WriteOperation,
        payload: FieldMap,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            table: descriptor.table.clone(),
            key: Filter::eq(descriptor.primary_key.clone(), key),
            operation,
            payload,
            submitted_at: Utc::now(),
        }
    }
}

/// How a request finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The remote store accepted the mutation
    Applied,
    /// Test mode suppressed the mutation; a successful no-op
    Suppressed,
}

enum TicketState {
    Pending(oneshot::Receiver<Result<WriteOutcome, WriteError>>),
    Rejected(WriteError),
}

/// Completion handle for one write request
///
/// Await it with [`WriteTicket::wait`] for synchronous completion, or
/// drop it to fire and forget; the worker logs every outcome either way.
pub struct WriteTicket {
    state: TicketState,
}

impl WriteTicket {
    pub(crate) fn pending(rx: oneshot::Receiver<Result<WriteOutcome, WriteError>>) -> Self {
        Self {
            state: TicketState::Pending(rx),
        }
    }

    pub(crate) fn rejected(error: WriteError) -> Self {
        Self {
            state: TicketState::Rejected(error),
        }
    }

    /// Wait for the worker to resolve this request
    pub async fn wait(self) -> Result<WriteOutcome, WriteError> {
        match self.state {
            TicketState::Pending(rx) => rx.await.unwrap_or(Err(WriteError::Terminated)),
            TicketState::Rejected(error) => Err(error),
        }
    }

    /// Explicitly fire and forget
    pub fn detach(self) {}
}
