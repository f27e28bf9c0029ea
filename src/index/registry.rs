//! Index registry
//!
//! Binds each index name to its parsed definition and to a dedicated
//! namespace `<collection>/index.<name>`. Built once when the collection is
//! opened; never changes afterwards.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::Serialize;

use super::definition::{parse_definition, Getter, IndexDefinition};
use super::errors::{IndexError, IndexResult};
use crate::encoding::{IndexKey, KeyEncoding};
use crate::observability::{Event, Observer};
use crate::store::{Namespace, OrderedStore};

/// Prefix of every index namespace under the collection namespace
const INDEX_NAMESPACE_PREFIX: &str = "index.";

/// A registered index: getter plus the namespace holding its entries
#[derive(Debug)]
pub struct RegisteredIndex<V> {
    name: String,
    getter: Getter<V>,
    namespace: Namespace,
}

impl<V> RegisteredIndex<V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn encoding(&self) -> &dyn KeyEncoding {
        self.namespace.encoding()
    }

    /// Run the getter, attributing failures to this index
    pub fn derive(&self, record: &V) -> IndexResult<Option<IndexKey>> {
        self.getter.derive(record).map_err(|source| IndexError::Getter {
            index: self.name.clone(),
            source,
        })
    }

    /// Composite key `(value, primary_key)` under this index's ordering
    pub fn entry_key(&self, value: &IndexKey, primary_key: &IndexKey) -> IndexResult<Vec<u8>> {
        self.encoding()
            .encode_composite(&[value, primary_key])
            .map_err(|source| self.encoding_error(source))
    }

    /// Primary key stored in the second half of an entry key
    pub fn primary_key_of(&self, entry_key: &[u8]) -> IndexResult<IndexKey> {
        let mut parts = self
            .encoding()
            .decode_composite(entry_key)
            .map_err(|source| self.encoding_error(source))?;
        if parts.len() != 2 {
            return Err(self.encoding_error(crate::encoding::EncodingError::Arity {
                expected: 2,
                found: parts.len(),
            }));
        }
        Ok(parts.remove(1))
    }

    /// Exclusive scan bounds covering every entry whose value lies in the range.
    ///
    /// `Included(v)` as lower bound becomes `enc(v)`: no entry equals a bare
    /// value, so everything under `v` sorts above it. Upper bounds use the
    /// ordering's max sentinel to cover all primary keys under a value.
    pub fn scan_bounds(
        &self,
        lower: Bound<&IndexKey>,
        upper: Bound<&IndexKey>,
    ) -> IndexResult<(Vec<u8>, Vec<u8>)> {
        let encoding = self.encoding();
        let after = match lower {
            Bound::Included(v) => encoding.encode(v),
            Bound::Excluded(v) => encoding.prefix_upper_bound(&[v]),
            Bound::Unbounded => Ok(Vec::new()),
        }
        .map_err(|source| self.encoding_error(source))?;

        let before = match upper {
            Bound::Included(v) => encoding.prefix_upper_bound(&[v]),
            Bound::Excluded(v) => encoding.encode(v),
            Bound::Unbounded => Ok(encoding.max_sentinel().to_vec()),
        }
        .map_err(|source| self.encoding_error(source))?;

        Ok((after, before))
    }

    fn encoding_error(&self, source: crate::encoding::EncodingError) -> IndexError {
        IndexError::Encoding {
            index: self.name.clone(),
            source,
        }
    }
}

/// Every index of one collection, keyed by name
#[derive(Debug)]
pub struct IndexRegistry<V> {
    indexes: BTreeMap<String, RegisteredIndex<V>>,
}

impl<V> IndexRegistry<V>
where
    V: Serialize + 'static,
{
    /// Parse every definition, then open one namespace per index.
    ///
    /// Nothing is allocated in the store if any definition is invalid.
    pub fn build<S, I, N>(
        store: &S,
        collection: &Namespace,
        definitions: I,
        observer: &Observer,
    ) -> IndexResult<Self>
    where
        S: OrderedStore,
        I: IntoIterator<Item = (N, IndexDefinition<V>)>,
        N: Into<String>,
    {
        let mut parsed = BTreeMap::new();
        for (name, definition) in definitions {
            let name = name.into();
            if parsed.contains_key(&name) {
                return Err(IndexError::invalid_definition(&name, "index registered twice"));
            }
            let index = parse_definition(&name, definition)?;
            parsed.insert(name, index);
        }

        let mut indexes = BTreeMap::new();
        for (name, index) in parsed {
            let ns_name = format!("{}{}", INDEX_NAMESPACE_PREFIX, name);
            let namespace = store.namespace(Some(collection), &ns_name, index.encoding)?;

            let ns_label = namespace.id().to_string();
            observer.emit(
                Event::IndexRegistered,
                &[
                    ("index", name.as_str()),
                    ("namespace", ns_label.as_str()),
                    ("ordering", namespace.encoding().name()),
                ],
            );

            indexes.insert(
                name.clone(),
                RegisteredIndex {
                    name,
                    getter: index.getter,
                    namespace,
                },
            );
        }

        Ok(Self { indexes })
    }
}

impl<V> IndexRegistry<V> {
    pub fn get(&self, name: &str) -> Option<&RegisteredIndex<V>> {
        self.indexes.get(name)
    }

    /// Look up an index or fail with `IndexNotFound`
    pub fn require(&self, name: &str) -> IndexResult<&RegisteredIndex<V>> {
        self.get(name).ok_or_else(|| IndexError::IndexNotFound(name.to_string()))
    }

    /// Indexes in name order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredIndex<V>> {
        self.indexes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
