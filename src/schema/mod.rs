//! Record declarations and the schema registry
//!
//! Every persisted type declares a table name and a static column table;
//! registration validates the declaration once at startup (exactly one
//! primary-key column, with a column named `id` assumed when no marker is
//! set) and caches a descriptor per type. Resolution after registration
//! never fails; an unregistered type is a programmer error and panics.

mod descriptor;
mod errors;

pub use descriptor::{Column, DefaultRecord, Record, SchemaRegistry, TableDescriptor};
pub use errors::{SchemaError, SchemaResult};
