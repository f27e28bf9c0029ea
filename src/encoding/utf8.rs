//! String-only ordering
//!
//! Parts are raw UTF-8 with null escaping and no type tag. Only string keys
//! can be encoded, including the primary key half of a composite key.

use super::errors::{EncodingError, EncodingResult};
use super::key::IndexKey;
use super::traits::{decode_escaped, encode_escaped, KeyEncoding};

// UTF-8 never produces 0xFF, and escaped parts start with a UTF-8 byte or 0x00.
const MAX_SENTINEL: [u8; 1] = [0xFF];

/// Untagged encoding for string keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8Encoding;

impl KeyEncoding for Utf8Encoding {
    fn name(&self) -> &'static str {
        "utf8"
    }

    fn encode_into(&self, key: &IndexKey, buf: &mut Vec<u8>) -> EncodingResult<()> {
        match key {
            IndexKey::String(s) => {
                encode_escaped(s.as_bytes(), buf);
                Ok(())
            }
            other => Err(EncodingError::Unsupported {
                encoding: self.name(),
                kind: other.kind(),
            }),
        }
    }

    fn decode_from(&self, data: &[u8]) -> EncodingResult<(IndexKey, usize)> {
        let (bytes, used) = decode_escaped(data)?;
        let s = String::from_utf8(bytes).map_err(|_| EncodingError::InvalidUtf8)?;
        Ok((IndexKey::String(s), used))
    }

    fn max_sentinel(&self) -> &'static [u8] {
        &MAX_SENTINEL
    }
}
