//! Key encoding errors

use thiserror::Error;

/// Result type for key encoding
pub type EncodingResult<T> = Result<T, EncodingError>;

/// Failures while encoding or decoding ordered keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The encoding has no representation for this kind of key
    #[error("{encoding} encoding cannot represent {kind} keys")]
    Unsupported {
        encoding: &'static str,
        kind: &'static str,
    },

    #[error("unexpected end of encoded key")]
    Truncated,

    #[error("unknown type tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("invalid escape sequence 0x00 0x{0:02x}")]
    InvalidEscape(u8),

    #[error("encoded string is not valid UTF-8")]
    InvalidUtf8,

    /// A composite key did not have the expected number of parts
    #[error("expected {expected} key parts, found {found}")]
    Arity { expected: usize, found: usize },
}

impl EncodingError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EncodingError::Unsupported { .. } => "INDEXKV_ENCODING_UNSUPPORTED",
            _ => "INDEXKV_ENCODING_CORRUPT",
        }
    }
}
