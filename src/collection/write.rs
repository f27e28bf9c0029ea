//! Write path: put and delete
//!
//! Both follow the same shape:
//!
//! 1. Take the per-key guard
//! 2. Read the previous record
//! 3. Run every getter and encode every entry key (failures abort here)
//! 4. Stage the primary write and the entry changes in one batch
//! 5. Commit
//!
//! An overwrite removes the entry derived from the previous record before
//! adding the new one, so a changed index value never leaves a stale entry.
//! Getters run on the record as decoded from its stored bytes; a value that
//! does not survive that round trip is rejected before anything is staged.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{decode_record, Collection};
use crate::encoding::IndexKey;
use crate::index::{IndexError, IndexResult, RegisteredIndex};
use crate::observability::Event;
use crate::store::{Namespace, OrderedStore, WriteBatch};

/// One staged change to an index namespace
enum EntryOp<'a> {
    Remove(&'a Namespace, Vec<u8>),
    Insert(&'a Namespace, Vec<u8>),
}

/// Index changes computed before anything is staged
#[derive(Default)]
struct EntryPlan<'a> {
    ops: Vec<EntryOp<'a>>,
    written: u64,
    removed: u64,
    skipped: u64,
}

impl<'a> EntryPlan<'a> {
    fn remove(&mut self, ns: &'a Namespace, key: Vec<u8>) {
        self.ops.push(EntryOp::Remove(ns, key));
        self.removed += 1;
    }

    fn insert(&mut self, ns: &'a Namespace, key: Vec<u8>) {
        self.ops.push(EntryOp::Insert(ns, key));
        self.written += 1;
    }

    fn stage<B: WriteBatch>(self, batch: &mut B) {
        for op in self.ops {
            match op {
                EntryOp::Remove(ns, key) => batch.delete(ns, key),
                EntryOp::Insert(ns, key) => batch.put(ns, key, Vec::new()),
            }
        }
    }
}

impl<V, S> Collection<V, S>
where
    V: Serialize + DeserializeOwned + 'static,
    S: OrderedStore,
{
    /// Upsert `value` at `key` and bring every index in line with it.
    ///
    /// Nothing is written if a getter fails or the commit is rejected.
    pub fn put(&self, key: impl Into<IndexKey>, value: &V) -> IndexResult<()> {
        let key = key.into();
        let pk = self.encode_primary(&key)?;
        let _guard = self.locks.acquire(&pk);

        let previous = self.read_record(&pk)?;
        // Derive entries from the stored form so later writes see the same values
        let payload = serde_json::to_vec(value)?;
        let stored: V = decode_record(&payload)?;
        let plan = self.plan_put(&key, previous.as_ref(), &stored)?;

        let (written, removed, skipped) = (plan.written, plan.removed, plan.skipped);
        let mut batch = self.store.begin_batch();
        batch.put(&self.primary, pk, payload);
        plan.stage(&mut batch);
        self.commit(batch, "put", &key)?;

        self.observer.metrics().record_put(written, removed, skipped);
        if self.observer.enabled(Event::PutCommitted) {
            let key_label = key.to_string();
            let written = written.to_string();
            let removed = removed.to_string();
            self.observer.emit(
                Event::PutCommitted,
                &[
                    ("entries_removed", removed.as_str()),
                    ("entries_written", written.as_str()),
                    ("key", key_label.as_str()),
                ],
            );
        }
        Ok(())
    }

    /// Remove the record at `key` and all of its index entries.
    ///
    /// Deleting an absent key succeeds and changes nothing.
    pub fn delete(&self, key: impl Into<IndexKey>) -> IndexResult<()> {
        let key = key.into();
        let pk = self.encode_primary(&key)?;
        let _guard = self.locks.acquire(&pk);

        let Some(previous) = self.read_record(&pk)? else {
            self.observer.metrics().increment_deletes_absent();
            if self.observer.enabled(Event::DeleteAbsent) {
                let key_label = key.to_string();
                self.observer.emit(Event::DeleteAbsent, &[("key", key_label.as_str())]);
            }
            return Ok(());
        };

        let mut plan = EntryPlan::default();
        for index in self.registry.iter() {
            if let Some(value) = self.derive(index, &previous)? {
                plan.remove(index.namespace(), index.entry_key(&value, &key)?);
            }
        }

        let removed = plan.removed;
        let mut batch = self.store.begin_batch();
        batch.delete(&self.primary, pk);
        plan.stage(&mut batch);
        self.commit(batch, "delete", &key)?;

        self.observer.metrics().record_delete(removed);
        if self.observer.enabled(Event::DeleteCommitted) {
            let key_label = key.to_string();
            let removed = removed.to_string();
            self.observer.emit(
                Event::DeleteCommitted,
                &[("entries_removed", removed.as_str()), ("key", key_label.as_str())],
            );
        }
        Ok(())
    }

    /// Diff the entries of `previous` against those of `value`
    fn plan_put<'a>(
        &'a self,
        key: &IndexKey,
        previous: Option<&V>,
        value: &V,
    ) -> IndexResult<EntryPlan<'a>> {
        let mut plan = EntryPlan::default();

        for index in self.registry.iter() {
            let old = match previous {
                Some(record) => self.derive(index, record)?,
                None => None,
            };
            let new = self.derive(index, value)?;

            if self.config.minimize_index_writes && old.is_some() && old == new {
                plan.skipped += 1;
                continue;
            }
            if let Some(old) = &old {
                plan.remove(index.namespace(), index.entry_key(old, key)?);
            }
            if let Some(new) = &new {
                plan.insert(index.namespace(), index.entry_key(new, key)?);
            }
        }

        Ok(plan)
    }

    fn derive(&self, index: &RegisteredIndex<V>, record: &V) -> IndexResult<Option<IndexKey>> {
        index.derive(record).map_err(|err| {
            let reason = err.to_string();
            self.observer
                .emit(Event::GetterFailed, &[("index", index.name()), ("reason", reason.as_str())]);
            err
        })
    }

    fn commit(&self, batch: S::Batch, op: &str, key: &IndexKey) -> IndexResult<()> {
        let staged = batch.len().to_string();
        batch.commit().map_err(|err| {
            self.observer.metrics().increment_commit_failures();
            let key_label = key.to_string();
            self.observer.emit(
                Event::CommitFailed,
                &[
                    ("code", err.code()),
                    ("key", key_label.as_str()),
                    ("op", op),
                    ("staged", staged.as_str()),
                ],
            );
            IndexError::from(err)
        })
    }
}
