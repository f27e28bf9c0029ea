//! Per-collection observation handle
//!
//! Pairs the injected sink with a severity floor, the collection name and
//! the collection's counters.

use std::sync::Arc;

use super::events::Event;
use super::logger::Severity;
use super::metrics::CollectionMetrics;
use super::sink::LogSink;

pub struct Observer {
    sink: Arc<dyn LogSink>,
    min_severity: Severity,
    collection: String,
    metrics: CollectionMetrics,
}

impl Observer {
    pub fn new(
        sink: Arc<dyn LogSink>,
        min_severity: Severity,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            min_severity,
            collection: collection.into(),
            metrics: CollectionMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &CollectionMetrics {
        &self.metrics
    }

    pub fn enabled(&self, event: Event) -> bool {
        event.severity() >= self.min_severity
    }

    /// Emit `event`, tagged with the collection name
    pub fn emit(&self, event: Event, fields: &[(&str, &str)]) {
        if !self.enabled(event) {
            return;
        }
        let mut all_fields = Vec::with_capacity(fields.len() + 1);
        all_fields.push(("collection", self.collection.as_str()));
        all_fields.extend_from_slice(fields);
        self.sink.log(event.severity(), event.as_str(), &all_fields);
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("min_severity", &self.min_severity)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}
