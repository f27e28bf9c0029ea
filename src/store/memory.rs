//! In-memory reference backend
//!
//! Namespaces are `BTreeMap`s keyed by encoded bytes, so iteration is in
//! byte order. A batch commit applies every staged operation under one write
//! lock: readers see either none or all of it.
//!
//! Commit failures can be injected to exercise the all-or-nothing contract.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::errors::{StoreError, StoreResult};
use super::traits::{Namespace, NamespaceId, OrderedStore, WriteBatch};
use crate::encoding::KeyEncoding;

#[derive(Debug)]
struct Space {
    ordering: &'static str,
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    spaces: RwLock<BTreeMap<NamespaceId, Space>>,
    failing_commits: AtomicUsize,
    commits: AtomicU64,
}

/// Ordered in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` batch commits fail without applying anything
    pub fn fail_next_commits(&self, n: usize) {
        self.inner.failing_commits.store(n, Ordering::SeqCst);
    }

    /// Number of successfully committed batches
    pub fn commit_count(&self) -> u64 {
        self.inner.commits.load(Ordering::SeqCst)
    }

    /// Every entry of a namespace, ascending
    pub fn entries(&self, ns: &Namespace) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let spaces = self.inner.spaces.read().unwrap_or_else(PoisonError::into_inner);
        let space = spaces
            .get(ns.id())
            .ok_or_else(|| StoreError::UnknownNamespace(ns.id().to_string()))?;
        Ok(space.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Number of entries in a namespace
    pub fn len(&self, ns: &Namespace) -> StoreResult<usize> {
        let spaces = self.inner.spaces.read().unwrap_or_else(PoisonError::into_inner);
        spaces
            .get(ns.id())
            .map(|space| space.entries.len())
            .ok_or_else(|| StoreError::UnknownNamespace(ns.id().to_string()))
    }
}

impl OrderedStore for MemoryStore {
    type Batch = MemoryBatch;

    fn namespace(
        &self,
        parent: Option<&Namespace>,
        name: &str,
        encoding: Arc<dyn KeyEncoding>,
    ) -> StoreResult<Namespace> {
        if name.is_empty() {
            return Err(StoreError::InvalidNamespaceName(name.to_string()));
        }

        let id = match parent {
            Some(parent) => parent.id().child(name),
            None => NamespaceId::root(name),
        };

        let mut spaces = self.inner.spaces.write().unwrap_or_else(PoisonError::into_inner);
        match spaces.get(&id) {
            Some(space) if space.ordering != encoding.name() => {
                return Err(StoreError::OrderingMismatch {
                    namespace: id.to_string(),
                    existing: space.ordering.to_string(),
                    requested: encoding.name().to_string(),
                });
            }
            Some(_) => {}
            None => {
                spaces.insert(
                    id.clone(),
                    Space {
                        ordering: encoding.name(),
                        entries: BTreeMap::new(),
                    },
                );
            }
        }

        Ok(Namespace::new(id, encoding))
    }

    fn get(&self, ns: &Namespace, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let spaces = self.inner.spaces.read().unwrap_or_else(PoisonError::into_inner);
        let space = spaces
            .get(ns.id())
            .ok_or_else(|| StoreError::UnknownNamespace(ns.id().to_string()))?;
        Ok(space.entries.get(key).cloned())
    }

    fn get_many(&self, ns: &Namespace, keys: &[Vec<u8>]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        let spaces = self.inner.spaces.read().unwrap_or_else(PoisonError::into_inner);
        let space = spaces
            .get(ns.id())
            .ok_or_else(|| StoreError::UnknownNamespace(ns.id().to_string()))?;
        Ok(keys.iter().map(|key| space.entries.get(key).cloned()).collect())
    }

    fn begin_batch(&self) -> MemoryBatch {
        MemoryBatch {
            store: Arc::clone(&self.inner),
            ops: Vec::new(),
        }
    }

    fn iterate(
        &self,
        ns: &Namespace,
        after: &[u8],
        before: &[u8],
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let spaces = self.inner.spaces.read().unwrap_or_else(PoisonError::into_inner);
        let space = spaces
            .get(ns.id())
            .ok_or_else(|| StoreError::UnknownNamespace(ns.id().to_string()))?;

        // BTreeMap::range panics on an empty exclusive range
        if after >= before {
            return Ok(Vec::new());
        }

        Ok(space
            .entries
            .range::<[u8], _>((Bound::Excluded(after), Bound::Excluded(before)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[derive(Debug)]
enum BatchOp {
    Put {
        ns: NamespaceId,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        ns: NamespaceId,
        key: Vec<u8>,
    },
}

impl BatchOp {
    fn namespace(&self) -> &NamespaceId {
        match self {
            BatchOp::Put { ns, .. } | BatchOp::Delete { ns, .. } => ns,
        }
    }
}

/// Batch staged against a `MemoryStore`
#[derive(Debug)]
pub struct MemoryBatch {
    store: Arc<MemoryInner>,
    ops: Vec<BatchOp>,
}

impl WriteBatch for MemoryBatch {
    fn put(&mut self, ns: &Namespace, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put {
            ns: ns.id().clone(),
            key,
            value,
        });
    }

    fn delete(&mut self, ns: &Namespace, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete {
            ns: ns.id().clone(),
            key,
        });
    }

    fn len(&self) -> usize {
        self.ops.len()
    }

    fn commit(self) -> StoreResult<()> {
        let injected = self
            .store
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::CommitFailed("injected failure".to_string()));
        }

        let mut spaces = self.store.spaces.write().unwrap_or_else(PoisonError::into_inner);

        // Validate first so a bad namespace cannot leave a half-applied batch
        if let Some(op) = self.ops.iter().find(|op| !spaces.contains_key(op.namespace())) {
            return Err(StoreError::UnknownNamespace(op.namespace().to_string()));
        }

        for op in self.ops {
            match op {
                BatchOp::Put { ns, key, value } => {
                    if let Some(space) = spaces.get_mut(&ns) {
                        space.entries.insert(key, value);
                    }
                }
                BatchOp::Delete { ns, key } => {
                    if let Some(space) = spaces.get_mut(&ns) {
                        space.entries.remove(&key);
                    }
                }
            }
        }

        self.store.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
