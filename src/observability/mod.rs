//! Observability: structured logging, events, counters
//!
//! # Principles
//!
//! 1. Observability is read-only and never fails an operation
//! 2. Sinks are injected; the process-wide default is explicit
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use indexkv::observability::{self, JsonLogger};
//!
//! observability::install(Arc::new(JsonLogger::stderr()));
//! // collections opened from here on log to stderr
//! observability::uninstall();
//! ```

mod events;
mod logger;
mod metrics;
mod observer;
mod sink;

pub use events::Event;
pub use logger::{JsonLogger, Severity};
pub use metrics::{CollectionMetrics, MetricsSnapshot};
pub use observer::Observer;
pub use sink::{current, install, uninstall, LogRecord, LogSink, MemorySink, NullSink};
