//! In-memory remote store
//!
//! A complete in-process implementation of [`RemoteStoreClient`], used by
//! tests and by the sandbox profile where no real backend is configured.
//! Rows live in per-table vectors; rows inserted without an `id` get a
//! serial one, mimicking a server-assigned identity column. Upsert needs
//! to know each table's primary key, so tables are declared up front with
//! `with_table`; undeclared tables fall back to `id`.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::codec::FieldMap;

use super::{Filter, RemoteError, RemoteResult, RemoteStoreClient};

#[derive(Debug, Default)]
struct TableRows {
    rows: Vec<FieldMap>,
    next_id: i64,
}

impl TableRows {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

/// In-process [`RemoteStoreClient`] backed by per-table row vectors
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    /// Declared primary-key column per table; immutable after construction
    primary_keys: HashMap<String, String>,
    tables: RwLock<HashMap<String, TableRows>>,
}

impl InMemoryRemote {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table and its primary-key column
    pub fn with_table(mut self, table: &str, primary_key: &str) -> Self {
        self.primary_keys
            .insert(table.to_string(), primary_key.to_string());
        self
    }

    /// Seed a row directly, bypassing the client interface
    pub async fn seed(&self, table: &str, row: FieldMap) {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_insert_with(TableRows::new)
            .rows
            .push(row);
    }

    /// Number of rows currently in a table
    pub async fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    fn primary_key(&self, table: &str) -> &str {
        self.primary_keys
            .get(table)
            .map(String::as_str)
            .unwrap_or("id")
    }

    fn matches_all(row: &FieldMap, filters: &[Filter]) -> bool {
        filters.iter().all(|f| f.matches(row))
    }
}

impl RemoteStoreClient for InMemoryRemote {
    fn select_one<'a>(
        &'a self,
        table: &'a str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'a, RemoteResult<Option<FieldMap>>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables.get(table).and_then(|t| {
                t.rows
                    .iter()
                    .find(|row| Self::matches_all(row, &filters))
                    .cloned()
            }))
        })
    }

    fn select_all<'a>(
        &'a self,
        table: &'a str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'a, RemoteResult<Vec<FieldMap>>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .get(table)
                .map(|t| {
                    t.rows
                        .iter()
                        .filter(|row| Self::matches_all(row, &filters))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    fn count<'a>(
        &'a self,
        table: &'a str,
        filters: Vec<Filter>,
    ) -> BoxFuture<'a, RemoteResult<u64>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .get(table)
                .map(|t| {
                    t.rows
                        .iter()
                        .filter(|row| Self::matches_all(row, &filters))
                        .count() as u64
                })
                .unwrap_or(0))
        })
    }

    fn raw_query<'a>(&'a self, query: &'a str) -> BoxFuture<'a, RemoteResult<Vec<FieldMap>>> {
        Box::pin(async move {
            // Supports only `SELECT * FROM "Table"` with an optional
            // `LIMIT n`; anything fancier needs a real backend.
            let parsed = parse_simple_select(query)
                .ok_or(RemoteError::Unsupported("this raw query shape"))?;

            let tables = self.tables.read().await;
            let mut rows: Vec<FieldMap> = tables
                .get(&parsed.table)
                .map(|t| t.rows.clone())
                .unwrap_or_default();
            if let Some(limit) = parsed.limit {
                rows.truncate(limit);
            }
            Ok(rows)
        })
    }

    fn insert<'a>(
        &'a self,
        table: &'a str,
        payload: FieldMap,
    ) -> BoxFuture<'a, RemoteResult<FieldMap>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let entry = tables
                .entry(table.to_string())
                .or_insert_with(TableRows::new);

            let mut row = payload;
            let assigned = !row.contains_key("id") || row["id"].is_null();
            if assigned {
                row.insert("id".to_string(), Value::from(entry.next_id));
                entry.next_id += 1;
            }
            entry.rows.push(row.clone());
            Ok(row)
        })
    }

    fn update<'a>(
        &'a self,
        table: &'a str,
        key: Filter,
        payload: FieldMap,
    ) -> BoxFuture<'a, RemoteResult<()>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            if let Some(t) = tables.get_mut(table) {
                if let Some(row) = t.rows.iter_mut().find(|row| key.matches(row)) {
                    for (column, value) in payload {
                        row.insert(column, value);
                    }
                }
            }
            // Zero matched rows is not an error, same as a real backend.
            Ok(())
        })
    }

    fn upsert<'a>(
        &'a self,
        table: &'a str,
        payload: FieldMap,
    ) -> BoxFuture<'a, RemoteResult<()>> {
        Box::pin(async move {
            let pk = self.primary_key(table);
            let key_value = payload.get(pk).cloned().ok_or_else(|| {
                RemoteError::query(table, format!("upsert payload is missing \"{pk}\""))
            })?;

            let mut tables = self.tables.write().await;
            let entry = tables
                .entry(table.to_string())
                .or_insert_with(TableRows::new);

            match entry
                .rows
                .iter_mut()
                .find(|row| row.get(pk) == Some(&key_value))
            {
                Some(row) => *row = payload,
                None => entry.rows.push(payload),
            }
            Ok(())
        })
    }

    fn delete<'a>(&'a self, table: &'a str, key: Filter) -> BoxFuture<'a, RemoteResult<()>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            if let Some(t) = tables.get_mut(table) {
                t.rows.retain(|row| !key.matches(row));
            }
            Ok(())
        })
    }
}

struct SimpleSelect {
    table: String,
    limit: Option<usize>,
}

fn parse_simple_select(query: &str) -> Option<SimpleSelect> {
    let mut words = query.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("select") {
        return None;
    }
    if words.next()? != "*" {
        return None;
    }
    if !words.next()?.eq_ignore_ascii_case("from") {
        return None;
    }
    let table = words.next()?.trim_matches('"').to_string();

    let mut limit = None;
    if let Some(word) = words.next() {
        if word.eq_ignore_ascii_case("limit") {
            limit = Some(words.next()?.parse().ok()?);
        } else {
            return None;
        }
    }
    if words.next().is_some() {
        return None;
    }
    Some(SimpleSelect { table, limit })
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

    #[tokio::test]
    async fn test_insert_assigns_serial_id() {
        let remote = InMemoryRemote::new();
        let first = remote
            .insert("Quotes", row(json!({"server_id": 1, "tag": "a"})))
            .await
            .unwrap();
        let second = remote
            .insert("Quotes", row(json!({"server_id": 1, "tag": "b"})))
            .await
            .unwrap();
        assert_eq!(first["id"], json!(1));
        assert_eq!(second["id"], json!(2));
    }

    #[tokio::test]
    async fn test_insert_keeps_caller_id() {
        let remote = InMemoryRemote::new();
        let inserted = remote
            .insert("Quotes", row(json!({"id": 99, "tag": "a"})))
            .await
            .unwrap();
        assert_eq!(inserted["id"], json!(99));
    }

    #[tokio::test]
    async fn test_select_one_applies_all_filters() {
        let remote = InMemoryRemote::new();
        remote.seed("Quotes", row(json!({"server_id": 1, "tag": "a"}))).await;
        remote.seed("Quotes", row(json!({"server_id": 2, "tag": "a"}))).await;

        let found = remote
            .select_one(
                "Quotes",
                vec![Filter::eq("server_id", 2), Filter::eq("tag", "a")],
            )
            .await
            .unwrap();
        assert_eq!(found.unwrap()["server_id"], json!(2));

        let missing = remote
            .select_one("Quotes", vec![Filter::eq("server_id", 3)])
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_count_matches_filters() {
        let remote = InMemoryRemote::new();
        remote.seed("Quotes", row(json!({"server_id": 1}))).await;
        remote.seed("Quotes", row(json!({"server_id": 1}))).await;
        remote.seed("Quotes", row(json!({"server_id": 2}))).await;

        let count = remote
            .count("Quotes", vec![Filter::eq("server_id", 1)])
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_update_merges_into_matching_row() {
        let remote = InMemoryRemote::new();
        remote
            .seed("Motd", row(json!({"user_id": 5, "motd": "old"})))
            .await;

        remote
            .update(
                "Motd",
                Filter::eq("user_id", 5),
                row(json!({"motd": "new"})),
            )
            .await
            .unwrap();

        let found = remote
            .select_one("Motd", vec![Filter::eq("user_id", 5)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["motd"], json!("new"));
    }

    #[tokio::test]
    async fn test_update_without_match_is_a_no_op() {
        let remote = InMemoryRemote::new();
        remote
            .update("Motd", Filter::eq("user_id", 5), row(json!({"motd": "x"})))
            .await
            .unwrap();
        assert_eq!(remote.row_count("Motd").await, 0);
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replaces() {
        let remote = InMemoryRemote::new().with_table("Motd", "user_id");

        remote
            .upsert("Motd", row(json!({"user_id": 5, "motd": "first"})))
            .await
            .unwrap();
        remote
            .upsert("Motd", row(json!({"user_id": 5, "motd": "second"})))
            .await
            .unwrap();

        assert_eq!(remote.row_count("Motd").await, 1);
        let found = remote
            .select_one("Motd", vec![Filter::eq("user_id", 5)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["motd"], json!("second"));
    }

    #[tokio::test]
    async fn test_upsert_requires_primary_key() {
        let remote = InMemoryRemote::new().with_table("Motd", "user_id");
        let err = remote
            .upsert("Motd", row(json!({"motd": "no key"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("user_id"));
    }

    #[tokio::test]
    async fn test_delete_removes_matching_rows() {
        let remote = InMemoryRemote::new();
        remote.seed("Quotes", row(json!({"id": 1}))).await;
        remote.seed("Quotes", row(json!({"id": 2}))).await;

        remote.delete("Quotes", Filter::eq("id", 1)).await.unwrap();
        assert_eq!(remote.row_count("Quotes").await, 1);
    }

    #[tokio::test]
    async fn test_raw_query_simple_select() {
        let remote = InMemoryRemote::new();
        remote.seed("Motd", row(json!({"user_id": 1, "motd": "a"}))).await;
        remote.seed("Motd", row(json!({"user_id": 2, "motd": "b"}))).await;

        let rows = remote.raw_query("SELECT * FROM \"Motd\"").await.unwrap();
        assert_eq!(rows.len(), 2);

        let limited = remote
            .raw_query("SELECT * FROM \"Motd\" LIMIT 1")
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_raw_query_rejects_unsupported_shape() {
        let remote = InMemoryRemote::new();
        let err = remote
            .raw_query("SELECT motd FROM \"Motd\" WHERE user_id = 1")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Unsupported(_)));
    }
}
