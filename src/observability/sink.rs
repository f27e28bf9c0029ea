//! Log sinks and the process-wide default
//!
//! Collections take their sink at construction. `install` sets the sink a
//! collection receives when none is passed; until then it is `NullSink`.
//! `uninstall` restores that state.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::logger::Severity;

/// Destination for structured events
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _severity: Severity, _event: &str, _fields: &[(&str, &str)]) {}
}

/// A captured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub severity: Severity,
    pub event: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// Keeps events in memory for inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Event names in arrival order
    pub fn events(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.event).collect()
    }

    pub fn count(&self, event: &str) -> usize {
        self.records().iter().filter(|r| r.event == event).count()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let record = LogRecord {
            severity,
            event: event.to_string(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        };
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record);
    }
}

static INSTALLED: RwLock<Option<Arc<dyn LogSink>>> = RwLock::new(None);

/// Install the process-wide default sink, returning the previous one
pub fn install(sink: Arc<dyn LogSink>) -> Option<Arc<dyn LogSink>> {
    INSTALLED.write().unwrap_or_else(PoisonError::into_inner).replace(sink)
}

/// Remove the process-wide default sink, returning it
pub fn uninstall() -> Option<Arc<dyn LogSink>> {
    INSTALLED.write().unwrap_or_else(PoisonError::into_inner).take()
}

/// The installed sink, or `NullSink` when none is installed
pub fn current() -> Arc<dyn LogSink> {
    INSTALLED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| Arc::new(NullSink))
}
