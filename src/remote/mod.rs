//! Remote store boundary
//!
//! The only place network I/O happens. The store core depends on this
//! trait alone; an external collaborator maps it onto whatever concrete
//! backend is configured. All operations are keyed by table name and
//! equality filters; every method is asynchronous and fallible.

mod errors;
pub mod memory;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::codec::FieldMap;

pub use errors::{RemoteError, RemoteResult};
pub use memory::InMemoryRemote;

/// One equality filter: `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column name
    pub column: String,
    /// Value the column must equal
    pub value: Value,
}

impl Filter {
    /// Build an equality filter
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// True when the row satisfies this filter
    pub fn matches(&self, row: &FieldMap) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

/// Abstract remote store operations
///
/// Object-safe; methods return boxed futures so the store can hold the
/// client as `Arc<dyn RemoteStoreClient>`. Implementations must never be
/// called from a context that cannot suspend.
pub trait RemoteStoreClient: Send + Sync + 'static {
    /// Fetch at most one row matching all filters
    fn select_one<'a>(
        &'a self,
        table: &'a str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'a, RemoteResult<Option<FieldMap>>>;

    /// Fetch every row matching all filters
    fn select_all<'a>(
        &'a self,
        table: &'a str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'a, RemoteResult<Vec<FieldMap>>>;

    /// Count rows matching all filters
    fn count<'a>(&'a self, table: &'a str, filters: Vec<Filter>)
        -> BoxFuture<'a, RemoteResult<u64>>;

    /// Escape hatch: run a raw query and return its rows
    ///
    /// No parameter binding guarantees; callers own their quoting.
    fn raw_query<'a>(&'a self, query: &'a str) -> BoxFuture<'a, RemoteResult<Vec<FieldMap>>>;

    /// Insert a row, returning it with any server-assigned columns attached
    fn insert<'a>(
        &'a self,
        table: &'a str,
        payload: FieldMap,
    ) -> BoxFuture<'a, RemoteResult<FieldMap>>;

    /// Update the row matching the primary-key filter
    fn update<'a>(
        &'a self,
        table: &'a str,
        key: Filter,
        payload: FieldMap,
    ) -> BoxFuture<'a, RemoteResult<()>>;

    /// Insert or replace; the payload must include the primary key
    fn upsert<'a>(&'a self, table: &'a str, payload: FieldMap)
        -> BoxFuture<'a, RemoteResult<()>>;

    /// Delete the row matching the primary-key filter
    fn delete<'a>(&'a self, table: &'a str, key: Filter) -> BoxFuture<'a, RemoteResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> FieldMap {
        match value {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_filter_matches_equal_value() {
        let filter = Filter::eq("server_id", 7);
        assert!(filter.matches(&row(json!({"server_id": 7, "tag": "x"}))));
    }

    #[test]
    fn test_filter_rejects_different_value() {
        let filter = Filter::eq("server_id", 7);
        assert!(!filter.matches(&row(json!({"server_id": 8}))));
    }

    #[test]
    fn test_filter_rejects_missing_column() {
        let filter = Filter::eq("server_id", 7);
        assert!(!filter.matches(&row(json!({"tag": "x"}))));
    }
}
