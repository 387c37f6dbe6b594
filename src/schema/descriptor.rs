//! Record declarations and table descriptors
//!
//! A persisted type declares its table name and a static column table;
//! the registry validates the declaration once at startup and caches one
//! `TableDescriptor` per type for the process lifetime. No reflection:
//! the column table is the single source of truth.

use std::any::TypeId;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::{self, CodecResult};
use crate::observability::{Logger, PipelineEvent};

use super::errors::{SchemaError, SchemaResult};

/// One declared column of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name as stored remotely
    pub name: &'static str,
    /// Whether this column is the explicit primary-key marker
    pub primary_key: bool,
}

impl Column {
    /// Declare a plain column
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            primary_key: false,
        }
    }

    /// Declare the primary-key column
    pub const fn primary_key(name: &'static str) -> Self {
        Self {
            name,
            primary_key: true,
        }
    }
}

/// A type eligible for persistence
///
/// Implementors declare their table, columns, and how to read the
/// primary-key value out of an instance. Field maps are produced and
/// consumed by the codec through the serde derives.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Remote table name
    const TABLE: &'static str;

    /// Declared columns; exactly one must be the primary key (a column
    /// named `id` is assumed when none carries the marker)
    const COLUMNS: &'static [Column];

    /// Whether reads of this table consult the cache first
    const CACHE_READS: bool = false;

    /// Primary-key value of this instance
    fn primary_key_value(&self) -> Value;
}

/// A record type whose every non-key field has a declared default
///
/// Enables synthesis of a usable value when no row exists yet, which is
/// what settings-style call sites expect.
pub trait DefaultRecord: Record + Default {
    /// Build the declared defaults merged with the given primary key
    fn for_key(key: &Value) -> CodecResult<Self> {
        let pk = primary_key_column(Self::COLUMNS).unwrap_or("id");
        let mut fields = codec::encode(Self::TABLE, &Self::default())?;
        fields.insert(pk.to_string(), key.clone());
        codec::decode(Self::TABLE, fields)
    }
}

/// Everything the store needs to know about one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Remote table name
    pub table: String,
    /// Primary-key column name
    pub primary_key: String,
    /// Whether reads consult the cache first
    pub cache_reads: bool,
}

/// Resolve the primary-key column from a declaration, if valid
fn primary_key_column(columns: &[Column]) -> Option<&'static str> {
    let mut marked = columns.iter().filter(|c| c.primary_key);
    match (marked.next(), marked.next()) {
        (Some(col), None) => Some(col.name),
        (None, _) => columns.iter().find(|c| c.name == "id").map(|c| c.name),
        _ => None,
    }
}

/// Registry of persisted record types
///
/// Built once at process start; the store resolves descriptors from it on
/// every operation without further validation.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: HashMap<TypeId, TableDescriptor>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type, validating its column declaration
    ///
    /// Fails when the type marks zero or more than one primary-key column
    /// (a column literally named `id` is assumed when no marker is set),
    /// or when the type is already registered.
    pub fn register<T: Record>(&mut self) -> SchemaResult<TableDescriptor> {
        let marked = T::COLUMNS.iter().filter(|c| c.primary_key).count();
        if marked > 1 {
            return Err(SchemaError::AmbiguousPrimaryKey {
                table: T::TABLE.to_string(),
                count: marked,
            });
        }

        let primary_key =
            primary_key_column(T::COLUMNS).ok_or_else(|| SchemaError::MissingPrimaryKey {
                table: T::TABLE.to_string(),
            })?;

        if self.tables.contains_key(&TypeId::of::<T>()) {
            return Err(SchemaError::AlreadyRegistered {
                table: T::TABLE.to_string(),
            });
        }

        let descriptor = TableDescriptor {
            table: T::TABLE.to_string(),
            primary_key: primary_key.to_string(),
            cache_reads: T::CACHE_READS,
        };
        self.tables.insert(TypeId::of::<T>(), descriptor.clone());

        Logger::emit(
            PipelineEvent::SchemaRegistered,
            &[("table", T::TABLE), ("primary_key", primary_key)],
        );
        Ok(descriptor)
    }

    /// Resolve the descriptor of a registered type
    ///
    /// # Panics
    ///
    /// Panics when `T` was never registered. That can only come from a
    /// coding mistake, never from user input, so it fails loudly instead
    /// of returning an error every caller would have to thread through.
    pub fn descriptor<T: Record>(&self) -> &TableDescriptor {
        self.tables.get(&TypeId::of::<T>()).unwrap_or_else(|| {
            panic!(
                "record type for table \"{}\" is not registered; register it at startup",
                T::TABLE
            )
        })
    }

    /// Number of registered record types
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when no types are registered
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
