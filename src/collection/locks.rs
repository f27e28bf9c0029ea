//! Per-key write exclusion
//!
//! `put` and `delete` read the previous record and commit later; two of
//! them on the same key must not interleave. The set of held keys is
//! guarded by one mutex that is never held across store I/O, so writers on
//! distinct keys do not wait on each other.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    held: Mutex<HashSet<Vec<u8>>>,
    released: Condvar,
}

/// Exclusive hold on one key; released on drop
#[derive(Debug)]
pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: Vec<u8>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other guard holds `key`, then take it
    pub fn acquire(&self, key: &[u8]) -> KeyGuard<'_> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while held.contains(key) {
            held = self.released.wait(held).unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(key.to_vec());
        KeyGuard {
            locks: self,
            key: key.to_vec(),
        }
    }

    /// Number of keys currently held
    #[cfg(test)]
    pub fn held_count(&self) -> usize {
        self.held.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.key);
        drop(held);
        self.locks.released.notify_all();
    }
}
