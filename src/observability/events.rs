//! Observable events
//!
//! Every event a collection emits is listed here with its severity.

use std::fmt;

use super::logger::Severity;

/// Events emitted by a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Collection constructed and all indexes registered
    CollectionOpen,
    /// One index bound to its namespace
    IndexRegistered,

    // Writes
    /// Put batch committed
    PutCommitted,
    /// Delete batch committed
    DeleteCommitted,
    /// Delete of a key that was not present
    DeleteAbsent,
    /// Batch commit rejected by the store
    CommitFailed,
    /// A getter failed; the write was abandoned
    GetterFailed,

    // Queries
    /// Query finished
    QueryComplete,
    /// An index entry pointed at a record that was gone by fetch time
    QueryMiss,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CollectionOpen => "COLLECTION_OPEN",
            Event::IndexRegistered => "INDEX_REGISTERED",
            Event::PutCommitted => "PUT_COMMITTED",
            Event::DeleteCommitted => "DELETE_COMMITTED",
            Event::DeleteAbsent => "DELETE_ABSENT",
            Event::CommitFailed => "COMMIT_FAILED",
            Event::GetterFailed => "GETTER_FAILED",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryMiss => "QUERY_MISS",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::CollectionOpen | Event::IndexRegistered => Severity::Info,
            Event::PutCommitted
            | Event::DeleteCommitted
            | Event::DeleteAbsent
            | Event::QueryComplete => Severity::Trace,
            Event::QueryMiss => Severity::Warn,
            Event::CommitFailed | Event::GetterFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
