//! Store error types
//!
//! Everything the ordered store can report. The collection propagates these
//! unmodified as `IndexError::Store`.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by an ordered store backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("namespace not found: {0}")]
    UnknownNamespace(String),

    #[error("invalid namespace name: {0:?}")]
    InvalidNamespaceName(String),

    /// A namespace was reopened under a different key ordering
    #[error("namespace {namespace} uses ordering {existing}, requested {requested}")]
    OrderingMismatch {
        namespace: String,
        existing: String,
        requested: String,
    },

    #[error("read failed: {0}")]
    ReadFailed(String),

    /// The batch was rejected; none of its operations were applied
    #[error("batch commit failed: {0}")]
    CommitFailed(String),
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownNamespace(_) => "INDEXKV_STORE_UNKNOWN_NAMESPACE",
            StoreError::InvalidNamespaceName(_) => "INDEXKV_STORE_INVALID_NAMESPACE",
            StoreError::OrderingMismatch { .. } => "INDEXKV_STORE_ORDERING_MISMATCH",
            StoreError::ReadFailed(_) => "INDEXKV_STORE_READ_FAILED",
            StoreError::CommitFailed(_) => "INDEXKV_STORE_COMMIT_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::OrderingMismatch {
            namespace: "users/index.byAge".to_string(),
            existing: "sortable".to_string(),
            requested: "utf8".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("users/index.byAge"));
        assert!(display.contains("utf8"));
        assert_eq!(err.code(), "INDEXKV_STORE_ORDERING_MISMATCH");
    }
}
