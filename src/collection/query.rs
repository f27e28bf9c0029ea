//! Query path
//!
//! Two phases, no snapshot:
//!
//! 1. Scan the index namespace for entries under the requested values and
//!    collect their primary keys in ascending entry order
//! 2. Fetch all of those keys from the primary namespace in one `get_many`
//!
//! A record deleted between the two phases is dropped from the result and
//! counted as a query miss. Queries take no locks.

use std::ops::Bound;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{decode_record, Collection};
use crate::encoding::IndexKey;
use crate::index::{IndexResult, RegisteredIndex};
use crate::observability::Event;
use crate::store::OrderedStore;

impl<V, S> Collection<V, S>
where
    V: Serialize + DeserializeOwned + 'static,
    S: OrderedStore,
{
    /// Records whose `index_name` value equals `value`, in primary key order.
    ///
    /// Fails with `IndexNotFound` for an unregistered index.
    pub fn query(&self, index_name: &str, value: impl Into<IndexKey>) -> IndexResult<Vec<V>> {
        let value = value.into();
        self.query_range(index_name, Bound::Included(value.clone()), Bound::Included(value))
    }

    /// Records whose `index_name` value lies within the bounds, ordered by
    /// index value and then primary key.
    pub fn query_range(
        &self,
        index_name: &str,
        lower: Bound<IndexKey>,
        upper: Bound<IndexKey>,
    ) -> IndexResult<Vec<V>> {
        let index = self.registry.require(index_name)?;
        let keys = self.scan(index, lower.as_ref(), upper.as_ref())?;
        if keys.is_empty() {
            self.finish_query(index, 0, 0);
            return Ok(Vec::new());
        }

        let encoded = keys
            .iter()
            .map(|key| self.encode_primary(key))
            .collect::<IndexResult<Vec<_>>>()?;
        let fetched = self.store.get_many(&self.primary, &encoded)?;

        let mut records = Vec::with_capacity(fetched.len());
        let mut misses = 0u64;
        for (key, slot) in keys.iter().zip(fetched) {
            match slot {
                Some(bytes) => records.push(decode_record(&bytes)?),
                None => {
                    misses += 1;
                    let key_label = key.to_string();
                    self.observer.emit(
                        Event::QueryMiss,
                        &[("index", index.name()), ("key", key_label.as_str())],
                    );
                }
            }
        }

        self.finish_query(index, records.len(), misses);
        Ok(records)
    }

    /// Primary keys indexed under `value`, without fetching the records
    pub fn query_keys(
        &self,
        index_name: &str,
        value: impl Into<IndexKey>,
    ) -> IndexResult<Vec<IndexKey>> {
        let value = value.into();
        let index = self.registry.require(index_name)?;
        self.scan(index, Bound::Included(&value), Bound::Included(&value))
    }

    fn scan(
        &self,
        index: &RegisteredIndex<V>,
        lower: Bound<&IndexKey>,
        upper: Bound<&IndexKey>,
    ) -> IndexResult<Vec<IndexKey>> {
        let (after, before) = index.scan_bounds(lower, upper)?;
        self.store
            .iterate(index.namespace(), &after, &before)?
            .into_iter()
            .map(|(entry, _)| index.primary_key_of(&entry))
            .collect()
    }

    fn finish_query(&self, index: &RegisteredIndex<V>, returned: usize, misses: u64) {
        self.observer.metrics().record_query(misses);
        if self.observer.enabled(Event::QueryComplete) {
            let returned = returned.to_string();
            self.observer.emit(
                Event::QueryComplete,
                &[("index", index.name()), ("returned", returned.as_str())],
            );
        }
    }
}
