//! The ordered store contract
//!
//! The collection depends on exactly these primitives:
//!
//! - `namespace` - open a sub-range of keyspace with its own ordering
//! - `get` / `get_many` - point reads, `get_many` order-preserving
//! - `begin_batch` + `WriteBatch::commit` - atomic multi-namespace writes
//! - `iterate` - ascending scan between two exclusive bounds
//!
//! Nothing else is assumed: no per-key locks, no transactions beyond one batch.

use std::fmt;
use std::sync::Arc;

use super::errors::StoreResult;
use crate::encoding::KeyEncoding;

/// Path identifying a namespace. Children never collide with their parent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespaceId(Vec<String>);

impl NamespaceId {
    /// A top-level namespace
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// A namespace nested under this one
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Handle to an opened namespace and the ordering its keys are encoded with.
#[derive(Debug, Clone)]
pub struct Namespace {
    id: NamespaceId,
    encoding: Arc<dyn KeyEncoding>,
}

impl Namespace {
    pub fn new(id: NamespaceId, encoding: Arc<dyn KeyEncoding>) -> Self {
        Self { id, encoding }
    }

    pub fn id(&self) -> &NamespaceId {
        &self.id
    }

    /// The key ordering of this namespace
    pub fn encoding(&self) -> &dyn KeyEncoding {
        self.encoding.as_ref()
    }
}

/// Staged writes that become visible together or not at all.
pub trait WriteBatch {
    /// Stage a put of `key` in `ns`
    fn put(&mut self, ns: &Namespace, key: Vec<u8>, value: Vec<u8>);

    /// Stage a delete of `key` in `ns`
    fn delete(&mut self, ns: &Namespace, key: Vec<u8>);

    /// Number of staged operations
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every staged operation atomically.
    ///
    /// On error the store is left exactly as it was.
    fn commit(self) -> StoreResult<()>;
}

/// An ordered key-value store with namespaces and atomic batches.
pub trait OrderedStore: Send + Sync {
    type Batch: WriteBatch;

    /// Create or open the namespace `name` under `parent` (or at top level).
    fn namespace(
        &self,
        parent: Option<&Namespace>,
        name: &str,
        encoding: Arc<dyn KeyEncoding>,
    ) -> StoreResult<Namespace>;

    fn get(&self, ns: &Namespace, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// One result per key, in the order the keys were given
    fn get_many(&self, ns: &Namespace, keys: &[Vec<u8>]) -> StoreResult<Vec<Option<Vec<u8>>>>;

    fn begin_batch(&self) -> Self::Batch;

    /// Entries strictly between `after` and `before`, ascending
    fn iterate(
        &self,
        ns: &Namespace,
        after: &[u8],
        before: &[u8],
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;
}
