//! Indexed collections
//!
//! A `Collection` stores records under primary keys in one namespace and
//! keeps one index namespace per registered index in step with it.
//!
//! # Invariants
//!
//! - For every record `(k, v)` and index `I`: exactly one entry
//!   `(I.getter(v), k)` when the getter yields a value, none otherwise
//! - Every write commits the record and its index entries in one batch
//! - Writes on the same primary key are serialized
//!
//! # API
//!
//! - `put(key, value)` / `delete(key)` - write path (`write.rs`)
//! - `query(index, value)` / `query_range` / `query_keys` - query path (`query.rs`)
//! - `get(key)` - primary lookup

mod config;
mod locks;
mod query;
mod write;

pub use config::{CollectionConfig, ConfigError};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encoding::{default_encoding, IndexKey};
use crate::index::{IndexDefinition, IndexError, IndexRegistry, IndexResult};
use crate::observability::{self, Event, LogSink, MetricsSnapshot, Observer};
use crate::store::{Namespace, OrderedStore};
use locks::KeyLocks;

/// Records of type `V` with secondary indexes, on top of store `S`
pub struct Collection<V, S: OrderedStore> {
    store: Arc<S>,
    primary: Namespace,
    registry: IndexRegistry<V>,
    config: CollectionConfig,
    locks: KeyLocks,
    observer: Observer,
}

impl<V, S> Collection<V, S>
where
    V: Serialize + DeserializeOwned + 'static,
    S: OrderedStore,
{
    /// Open with the default config and the process-wide log sink
    pub fn open<I, N>(store: Arc<S>, name_prefix: &str, definitions: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = (N, IndexDefinition<V>)>,
        N: Into<String>,
    {
        Self::open_with(
            store,
            name_prefix,
            definitions,
            CollectionConfig::default(),
            observability::current(),
        )
    }

    /// Open the collection `name_prefix` and register every index.
    ///
    /// Fails with `InvalidIndexDefinition` if any definition is malformed.
    pub fn open_with<I, N>(
        store: Arc<S>,
        name_prefix: &str,
        definitions: I,
        config: CollectionConfig,
        sink: Arc<dyn LogSink>,
    ) -> IndexResult<Self>
    where
        I: IntoIterator<Item = (N, IndexDefinition<V>)>,
        N: Into<String>,
    {
        let observer = Observer::new(sink, config.log_level, name_prefix);
        let primary = store.namespace(None, name_prefix, default_encoding())?;
        let registry = IndexRegistry::build(store.as_ref(), &primary, definitions, &observer)?;

        let index_count = registry.len().to_string();
        let namespace = primary.id().to_string();
        observer.emit(
            Event::CollectionOpen,
            &[("indexes", index_count.as_str()), ("namespace", namespace.as_str())],
        );

        Ok(Self {
            store,
            primary,
            registry,
            config,
            locks: KeyLocks::new(),
            observer,
        })
    }

    /// Current record at `key`
    pub fn get(&self, key: impl Into<IndexKey>) -> IndexResult<Option<V>> {
        let pk = self.encode_primary(&key.into())?;
        self.read_record(&pk)
    }

    fn read_record(&self, pk: &[u8]) -> IndexResult<Option<V>> {
        match self.store.get(&self.primary, pk)? {
            Some(bytes) => Ok(Some(decode_record(&bytes)?)),
            None => Ok(None),
        }
    }

    fn encode_primary(&self, key: &IndexKey) -> IndexResult<Vec<u8>> {
        self.primary.encoding().encode(key).map_err(IndexError::PrimaryKey)
    }
}

impl<V, S: OrderedStore> Collection<V, S> {
    /// Registered index names, in order
    pub fn index_names(&self) -> Vec<&str> {
        self.registry.names().collect()
    }

    pub fn primary_namespace(&self) -> &Namespace {
        &self.primary
    }

    /// Namespace holding the entries of `index`
    pub fn index_namespace(&self, index: &str) -> Option<&Namespace> {
        self.registry.get(index).map(|i| i.namespace())
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.observer.metrics().snapshot()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

fn decode_record<V: DeserializeOwned>(bytes: &[u8]) -> IndexResult<V> {
    Ok(serde_json::from_slice(bytes)?)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::index::IndexSpec;
    use crate::observability::MemorySink;
    use crate::store::{MemoryStore, WriteBatch};

    #[test]
    fn test_open_registers_indexes() {
        let (users, _store, sink) = users();
        assert_eq!(users.index_names(), vec!["byAge", "byName"]);
        assert_eq!(sink.count("INDEX_REGISTERED"), 2);
        assert_eq!(sink.count("COLLECTION_OPEN"), 1);

        let by_age = users.index_namespace("byAge").unwrap();
        assert_ne!(by_age.id(), users.primary_namespace().id());
        assert!(users.index_namespace("byEmail").is_none());
    }

    #[test]
    fn test_open_rejects_invalid_definition() {
        let store = Arc::new(MemoryStore::new());
        let result = Collection::<User, _>::open_with(
            store,
            "users",
            vec![("bad", IndexDefinition::Spec(IndexSpec::default()))],
            CollectionConfig::default(),
            Arc::new(MemorySink::new()),
        );
        let err = result.err().unwrap();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "INDEXKV_INVALID_INDEX_DEFINITION");
    }

    #[test]
    fn test_get_missing_key() {
        let (users, _store, _sink) = users();
        assert_eq!(users.get("nobody").unwrap(), None);
    }

    #[test]
    fn test_undecodable_record_is_codec_error() {
        let (users, store, _sink) = users();
        let pk = users.encode_primary(&IndexKey::from("u1")).unwrap();
        let mut batch = store.begin_batch();
        batch.put(users.primary_namespace(), pk, b"not json".to_vec());
        batch.commit().unwrap();

        let err = users.get("u1").unwrap_err();
        assert_eq!(err.code(), "INDEXKV_CODEC_FAILED");
    }
}
