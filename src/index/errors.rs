//! Index error types
//!
//! Error codes:
//! - INDEXKV_INVALID_INDEX_DEFINITION (FATAL, construction aborts)
//! - INDEXKV_INDEX_NOT_FOUND
//! - INDEXKV_GETTER_FAILED
//! - INDEXKV_ENCODING_FAILED / INDEXKV_PRIMARY_KEY_INVALID
//! - INDEXKV_CODEC_FAILED
//! - store errors keep their own codes

use thiserror::Error;

use crate::encoding::EncodingError;
use crate::store::StoreError;

/// Result type for collection and index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Failure raised by a user-supplied getter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GetterError {
    message: String,
}

impl GetterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by a collection
#[derive(Debug, Error)]
pub enum IndexError {
    /// Malformed index definition; the collection is not constructed
    #[error("invalid definition for index {index:?}: {reason}")]
    InvalidIndexDefinition { index: String, reason: String },

    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// Store failure, propagated unmodified
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A getter failed before anything was staged
    #[error("getter for index {index:?} failed: {source}")]
    Getter {
        index: String,
        #[source]
        source: GetterError,
    },

    /// The index ordering cannot represent the derived value or primary key
    #[error("index {index:?} cannot encode key: {source}")]
    Encoding {
        index: String,
        #[source]
        source: EncodingError,
    },

    #[error("primary key cannot be encoded: {0}")]
    PrimaryKey(#[source] EncodingError),

    #[error("record codec error: {0}")]
    Codec(String),
}

impl IndexError {
    pub(crate) fn invalid_definition(index: &str, reason: impl Into<String>) -> Self {
        IndexError::InvalidIndexDefinition {
            index: index.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::InvalidIndexDefinition { .. } => "INDEXKV_INVALID_INDEX_DEFINITION",
            IndexError::IndexNotFound(_) => "INDEXKV_INDEX_NOT_FOUND",
            IndexError::Store(e) => e.code(),
            IndexError::Getter { .. } => "INDEXKV_GETTER_FAILED",
            IndexError::Encoding { .. } => "INDEXKV_ENCODING_FAILED",
            IndexError::PrimaryKey(_) => "INDEXKV_PRIMARY_KEY_INVALID",
            IndexError::Codec(_) => "INDEXKV_CODEC_FAILED",
        }
    }

    /// Only definition errors are fatal; everything else fails one call
    pub fn is_fatal(&self) -> bool {
        matches!(self, IndexError::InvalidIndexDefinition { .. })
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::Codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            IndexError::invalid_definition("byAge", "no getter").code(),
            "INDEXKV_INVALID_INDEX_DEFINITION"
        );
        assert_eq!(IndexError::IndexNotFound("x".into()).code(), "INDEXKV_INDEX_NOT_FOUND");
        assert_eq!(
            IndexError::from(StoreError::CommitFailed("disk".into())).code(),
            "INDEXKV_STORE_COMMIT_FAILED"
        );
    }

    #[test]
    fn test_only_definition_errors_are_fatal() {
        assert!(IndexError::invalid_definition("i", "r").is_fatal());
        assert!(!IndexError::IndexNotFound("i".into()).is_fatal());
        assert!(!IndexError::Codec("bad".into()).is_fatal());
    }

    #[test]
    fn test_store_error_is_transparent() {
        let store_err = StoreError::CommitFailed("disk full".into());
        let err = IndexError::from(store_err.clone());
        assert_eq!(err.to_string(), store_err.to_string());
    }

    #[test]
    fn test_getter_error_source() {
        let err = IndexError::Getter {
            index: "byAge".into(),
            source: GetterError::new("age missing"),
        };
        assert!(err.to_string().contains("byAge"));
        assert_eq!(err.source().map(|s| s.to_string()), Some("age missing".to_string()));
    }
}
