//! Per-collection counters
//!
//! - Counters only, monotonic
//! - Relaxed atomics; exactness across threads is not required

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one collection
#[derive(Debug, Default)]
pub struct CollectionMetrics {
    puts: AtomicU64,
    deletes: AtomicU64,
    deletes_absent: AtomicU64,
    queries: AtomicU64,
    index_entries_written: AtomicU64,
    index_entries_removed: AtomicU64,
    index_writes_skipped: AtomicU64,
    query_misses: AtomicU64,
    commit_failures: AtomicU64,
}

impl CollectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_put(&self, written: u64, removed: u64, skipped: u64) {
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.index_entries_written.fetch_add(written, Ordering::Relaxed);
        self.index_entries_removed.fetch_add(removed, Ordering::Relaxed);
        self.index_writes_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    pub fn record_delete(&self, removed: u64) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.index_entries_removed.fetch_add(removed, Ordering::Relaxed);
    }

    pub fn increment_deletes_absent(&self) {
        self.deletes_absent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query(&self, misses: u64) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.query_misses.fetch_add(misses, Ordering::Relaxed);
    }

    pub fn increment_commit_failures(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            puts: self.puts.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            deletes_absent: self.deletes_absent.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            index_entries_written: self.index_entries_written.load(Ordering::Relaxed),
            index_entries_removed: self.index_entries_removed.load(Ordering::Relaxed),
            index_writes_skipped: self.index_writes_skipped.load(Ordering::Relaxed),
            query_misses: self.query_misses.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub puts: u64,
    pub deletes: u64,
    pub deletes_absent: u64,
    pub queries: u64,
    pub index_entries_written: u64,
    pub index_entries_removed: u64,
    pub index_writes_skipped: u64,
    pub query_misses: u64,
    pub commit_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(CollectionMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_put_and_delete() {
        let metrics = CollectionMetrics::new();
        metrics.record_put(2, 1, 1);
        metrics.record_delete(2);
        metrics.increment_deletes_absent();
        metrics.record_query(3);

        let snap = metrics.snapshot();
        assert_eq!(snap.puts, 1);
        assert_eq!(snap.deletes, 1);
        assert_eq!(snap.deletes_absent, 1);
        assert_eq!(snap.index_entries_written, 2);
        assert_eq!(snap.index_entries_removed, 3);
        assert_eq!(snap.index_writes_skipped, 1);
        assert_eq!(snap.query_misses, 3);
    }
}
