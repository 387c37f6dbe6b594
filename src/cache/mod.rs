//! Optimistic in-memory mirror of remote state
//!
//! Writers update the cache synchronously in the calling task before the
//! write request is queued, which is what gives callers read-your-own-write
//! consistency without waiting on the network. Entries are keyed by
//! `(table, primary key)` and replaced wholesale; the merge for a partial
//! update happens on a clone before the swap, so no entry is ever mutated
//! field-by-field in place.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::codec::FieldMap;

type CacheKey = (String, String);

/// Process-wide map of the last-known row per cached record
#[derive(Debug, Default)]
pub struct StoreCache {
    entries: RwLock<HashMap<CacheKey, FieldMap>>,
}

/// Canonical string form of a primary-key value, used as the map key
fn canonical(key: &Value) -> String {
    key.to_string()
}

impl StoreCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-known row for `(table, key)`, if any
    pub fn get(&self, table: &str, key: &Value) -> Option<FieldMap> {
        match self.entries.read() {
            Ok(entries) => entries.get(&(table.to_string(), canonical(key))).cloned(),
            Err(_) => None,
        }
    }

    /// Replace the entry for `(table, key)` wholesale
    pub fn put(&self, table: &str, key: &Value, fields: FieldMap) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert((table.to_string(), canonical(key)), fields);
        }
    }

    /// Drop the entry for `(table, key)`; the next read refetches
    pub fn remove(&self, table: &str, key: &Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&(table.to_string(), canonical(key)));
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
