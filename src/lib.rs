//! guildstore - persistence and write-coordination for a Discord chat bot
//!
//! Every bot subsystem reads and mutates per-guild/per-user state through
//! the [`Store`] facade. Reads await the remote store directly; writes
//! update an in-memory cache in the calling task and then flow through a
//! single sequential pipeline that applies them to the remote store in
//! total FIFO order. A test-mode guard can suppress every write outside a
//! designated sandbox record without changing call sites.

pub mod cache;
pub mod codec;
pub mod config;
pub mod observability;
pub mod pipeline;
pub mod records;
pub mod remote;
pub mod schema;
pub mod store;

pub use codec::{CodecError, FieldMap};
pub use config::StoreConfig;
pub use pipeline::{TestModeGuard, WriteError, WriteOperation, WriteOutcome, WriteTicket};
pub use remote::{Filter, InMemoryRemote, RemoteError, RemoteStoreClient};
pub use schema::{Column, DefaultRecord, Record, SchemaError, SchemaRegistry, TableDescriptor};
pub use store::{Store, StoreError, StoreResult};
