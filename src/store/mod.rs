//! Store facade
//!
//! The public surface every bot subsystem talks to. Reads go straight to
//! the remote client (cache-first only for tables that opt in) and return
//! results, never panic. Writes update the cache synchronously in the
//! calling task, then hand an immutable request to the write pipeline and
//! return its completion ticket; awaiting the ticket is the caller's
//! choice per call.

mod errors;

use std::sync::Arc;

use serde_json::Value;

use crate::cache::StoreCache;
use crate::codec::{self, FieldMap};
use crate::config::StoreConfig;
use crate::observability::{Logger, MetricsSnapshot, PipelineEvent, PipelineMetrics};
use crate::pipeline::{TestModeGuard, WriteCoordinator, WriteOperation, WriteRequest, WriteTicket};
use crate::remote::{Filter, RemoteStoreClient};
use crate::schema::{DefaultRecord, Record, SchemaRegistry};

pub use errors::{StoreError, StoreResult};

/// Persistence facade over one remote store
///
/// Construct one per process and inject it into every subsystem that
/// needs persistence; there is no hidden global instance. Must be built
/// inside a tokio runtime, which the write worker is spawned onto.
pub struct Store {
    remote: Arc<dyn RemoteStoreClient>,
    registry: SchemaRegistry,
    cache: Arc<StoreCache>,
    pipeline: WriteCoordinator,
    metrics: Arc<PipelineMetrics>,
}

impl Store {
    /// Build a store over a remote client and a populated registry
    pub fn new(
        config: &StoreConfig,
        remote: Arc<dyn RemoteStoreClient>,
        registry: SchemaRegistry,
    ) -> Self {
        let guard = if config.test_mode {
            TestModeGuard::sandbox(config.sandbox_key())
        } else {
            TestModeGuard::disabled()
        };

        let cache = Arc::new(StoreCache::new());
        let metrics = Arc::new(PipelineMetrics::new());
        let pipeline = WriteCoordinator::spawn(
            Arc::clone(&remote),
            Arc::clone(&cache),
            guard.clone(),
            Arc::clone(&metrics),
        );

        Logger::emit(
            PipelineEvent::StoreInit,
            &[
                ("url", &config.url),
                ("test_mode", if guard.is_active() { "true" } else { "false" }),
                ("tables", &registry.len().to_string()),
            ],
        );

        Self {
            remote,
            registry,
            cache,
            pipeline,
            metrics,
        }
    }

    /// Read one record by primary key, synthesizing defaults when absent
    ///
    /// Settings-style call sites always get a usable value, even before
    /// the record has ever been persisted. Tables that opt into caching
    /// are served from the cache when possible; the synthesized defaults
    /// are cached too, so a later partial update lands on them.
    pub async fn select<T: DefaultRecord>(&self, key: impl Into<Value>) -> StoreResult<T> {
        let descriptor = self.registry.descriptor::<T>();
        let key = key.into();

        if descriptor.cache_reads {
            if let Some(fields) = self.cache.get(&descriptor.table, &key) {
                self.metrics.increment_cache_hits();
                return self.decode_fields(&descriptor.table, &key, fields);
            }
        }

        let filters = vec![Filter::eq(descriptor.primary_key.clone(), key.clone())];
        match self.remote.select_one(&descriptor.table, filters).await? {
            Some(fields) => {
                if descriptor.cache_reads {
                    self.cache.put(&descriptor.table, &key, fields.clone());
                }
                self.decode_fields(&descriptor.table, &key, fields)
            }
            None => {
                let synthesized = T::for_key(&key)?;
                if descriptor.cache_reads {
                    let fields = codec::encode(&descriptor.table, &synthesized)?;
                    self.cache.put(&descriptor.table, &key, fields);
                }
                Ok(synthesized)
            }
        }
    }

    /// Read at most one record matching all filters
    ///
    /// Absence is a normal empty option, not an error.
    pub async fn select_one<T: Record>(&self, filters: Vec<Filter>) -> StoreResult<Option<T>> {
        let descriptor = self.registry.descriptor::<T>();
        match self.remote.select_one(&descriptor.table, filters).await? {
            Some(fields) => {
                let record = self.decode_fields(&descriptor.table, &Value::Null, fields)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Read every record matching all filters
    pub async fn select_all<T: Record>(&self, filters: Vec<Filter>) -> StoreResult<Vec<T>> {
        let descriptor = self.registry.descriptor::<T>();
        let rows = self.remote.select_all(&descriptor.table, filters).await?;
        let mut records = Vec::with_capacity(rows.len());
        for fields in rows {
            records.push(self.decode_fields(&descriptor.table, &Value::Null, fields)?);
        }
        Ok(records)
    }

    /// Count records matching all filters
    pub async fn count<T: Record>(&self, filters: Vec<Filter>) -> StoreResult<u64> {
        let descriptor = self.registry.descriptor::<T>();
        Ok(self.remote.count(&descriptor.table, filters).await?)
    }

    /// Escape hatch: run a raw query and return untyped rows
    ///
    /// No parameter binding guarantees; callers own their quoting. Map
    /// rows into records with [`Store::decode_row`] as needed.
    pub async fn raw_query(&self, query: &str) -> StoreResult<Vec<FieldMap>> {
        Ok(self.remote.raw_query(query).await?)
    }

    /// Decode one raw row into a registered record type
    pub fn decode_row<T: Record>(&self, fields: FieldMap) -> StoreResult<T> {
        let descriptor = self.registry.descriptor::<T>();
        self.decode_fields(&descriptor.table, &Value::Null, fields)
    }

    /// Queue an insert; the remote may assign identity columns
    pub fn insert<T: Record>(&self, record: &T) -> WriteTicket {
        let descriptor = self.registry.descriptor::<T>();
        let payload = match codec::encode(&descriptor.table, record) {
            Ok(payload) => payload,
            Err(error) => return WriteTicket::rejected(error.into()),
        };
        let key = record.primary_key_value();

        if descriptor.cache_reads {
            self.cache.put(&descriptor.table, &key, payload.clone());
        }
        self.pipeline
            .submit(WriteRequest::new(descriptor, key, WriteOperation::Insert, payload))
    }

    /// Queue a partial update of the record with the given primary key
    ///
    /// `changes` is a JSON object of changed columns; `null` fields and
    /// the primary key are stripped from the payload, so unmentioned
    /// columns keep their remote values.
    pub fn update<T: Record>(&self, key: impl Into<Value>, changes: Value) -> WriteTicket {
        let descriptor = self.registry.descriptor::<T>();
        let key = key.into();
        let payload =
            match codec::update_payload(&descriptor.table, &descriptor.primary_key, changes) {
                Ok(payload) => payload,
                Err(error) => return WriteTicket::rejected(error.into()),
            };

        if descriptor.cache_reads {
            if let Some(mut current) = self.cache.get(&descriptor.table, &key) {
                for (column, value) in &payload {
                    current.insert(column.clone(), value.clone());
                }
                self.cache.put(&descriptor.table, &key, current);
            }
        }
        self.pipeline
            .submit(WriteRequest::new(descriptor, key, WriteOperation::Update, payload))
    }

    /// Queue an insert-or-replace of a full record
    pub fn upsert<T: Record>(&self, record: &T) -> WriteTicket {
        let descriptor = self.registry.descriptor::<T>();
        let payload = match codec::encode(&descriptor.table, record) {
            Ok(payload) => payload,
            Err(error) => return WriteTicket::rejected(error.into()),
        };
        let key = record.primary_key_value();

        if descriptor.cache_reads {
            self.cache.put(&descriptor.table, &key, payload.clone());
        }
        self.pipeline
            .submit(WriteRequest::new(descriptor, key, WriteOperation::Upsert, payload))
    }

    /// Queue a delete of the record with the given primary key
    pub fn delete<T: Record>(&self, key: impl Into<Value>) -> WriteTicket {
        let descriptor = self.registry.descriptor::<T>();
        let key = key.into();

        self.cache.remove(&descriptor.table, &key);
        self.pipeline.submit(WriteRequest::new(
            descriptor,
            key,
            WriteOperation::Delete,
            FieldMap::new(),
        ))
    }

    /// Drain the write pipeline and stop its worker
    ///
    /// Returns once every previously submitted write has been applied or
    /// suppressed. Writes submitted afterwards resolve with a terminated
    /// error. Idempotent.
    pub async fn shutdown(&self) {
        self.pipeline.shutdown().await;
    }

    /// Point-in-time pipeline counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn decode_fields<T: Record>(
        &self,
        table: &str,
        key: &Value,
        fields: FieldMap,
    ) -> StoreResult<T> {
        match codec::decode(table, fields) {
            Ok(record) => {
                self.metrics.increment_decoded();
                Ok(record)
            }
            Err(error) => {
                self.metrics.increment_decode_failures();
                Logger::emit(
                    PipelineEvent::DecodeFailed,
                    &[
                        ("table", table),
                        ("key", &key.to_string()),
                        ("error", &error.to_string()),
                    ],
                );
                Err(error.into())
            }
        }
    }
}
