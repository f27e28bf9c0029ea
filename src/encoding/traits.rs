//! The key ordering contract
//!
//! A `KeyEncoding` turns `IndexKey`s into byte strings whose lexicographic
//! order matches the key order. Composite keys are the concatenation of
//! their part encodings, so every part encoding must be self-delimiting.
//!
//! # Invariants
//!
//! - `a < b` implies `encode(a) < encode(b)` bytewise
//! - No part encoding is a prefix of another part encoding
//! - `max_sentinel()` sorts after the first byte of every part encoding

use std::fmt;

use super::errors::{EncodingError, EncodingResult};
use super::key::IndexKey;

/// Order-preserving byte encoding for keys.
pub trait KeyEncoding: Send + Sync + fmt::Debug {
    /// Stable name, recorded by stores to detect ordering mismatches
    fn name(&self) -> &'static str;

    /// Append the encoding of one key part to `buf`
    fn encode_into(&self, key: &IndexKey, buf: &mut Vec<u8>) -> EncodingResult<()>;

    /// Decode one key part from the front of `data`.
    ///
    /// Returns the key and the number of bytes consumed.
    fn decode_from(&self, data: &[u8]) -> EncodingResult<(IndexKey, usize)>;

    /// Bytes that sort after any encoded part under this ordering
    fn max_sentinel(&self) -> &'static [u8];

    /// Encode a single key
    fn encode(&self, key: &IndexKey) -> EncodingResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(16);
        self.encode_into(key, &mut buf)?;
        Ok(buf)
    }

    /// Decode a single key, rejecting trailing bytes
    fn decode(&self, data: &[u8]) -> EncodingResult<IndexKey> {
        let mut parts = self.decode_composite(data)?;
        if parts.len() != 1 {
            return Err(EncodingError::Arity {
                expected: 1,
                found: parts.len(),
            });
        }
        Ok(parts.remove(0))
    }

    /// Encode an ordered tuple of key parts
    fn encode_composite(&self, parts: &[&IndexKey]) -> EncodingResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(16 * parts.len());
        for part in parts {
            self.encode_into(part, &mut buf)?;
        }
        Ok(buf)
    }

    /// Decode every part of a composite key
    fn decode_composite(&self, data: &[u8]) -> EncodingResult<Vec<IndexKey>> {
        let mut parts = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let (key, used) = self.decode_from(&data[offset..])?;
            parts.push(key);
            offset += used;
        }
        Ok(parts)
    }

    /// Exclusive upper bound covering every key that starts with `prefix`
    fn prefix_upper_bound(&self, prefix: &[&IndexKey]) -> EncodingResult<Vec<u8>> {
        let mut buf = self.encode_composite(prefix)?;
        buf.extend_from_slice(self.max_sentinel());
        Ok(buf)
    }
}

/// Null-escape `data` and terminate it with `0x00 0x00`.
///
/// Keeps `"a" < "aa" < "ab" < "b"` and makes the part self-delimiting.
pub(crate) fn encode_escaped(data: &[u8], buf: &mut Vec<u8>) {
    for &byte in data {
        if byte == 0x00 {
            buf.push(0x00);
            buf.push(ESCAPE_BYTE);
        } else {
            buf.push(byte);
        }
    }
    buf.push(TERMINATOR);
    buf.push(TERMINATOR);
}

/// Inverse of `encode_escaped`; returns the bytes and the input consumed.
pub(crate) fn decode_escaped(data: &[u8]) -> EncodingResult<(Vec<u8>, usize)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        if data[i] != 0x00 {
            out.push(data[i]);
            i += 1;
            continue;
        }
        match data.get(i + 1) {
            None => return Err(EncodingError::Truncated),
            Some(&TERMINATOR) => return Ok((out, i + 2)),
            Some(&ESCAPE_BYTE) => {
                out.push(0x00);
                i += 2;
            }
            Some(&other) => return Err(EncodingError::InvalidEscape(other)),
        }
    }
    Err(EncodingError::Truncated)
}

const ESCAPE_BYTE: u8 = 0x01;
const TERMINATOR: u8 = 0x00;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_round_trip_with_nulls() {
        let mut buf = Vec::new();
        encode_escaped(b"a\0b", &mut buf);
        assert_eq!(buf, vec![b'a', 0x00, 0x01, b'b', 0x00, 0x00]);

        let (decoded, used) = decode_escaped(&buf).unwrap();
        assert_eq!(decoded, b"a\0b");
        assert_eq!(used, buf.len());
    }

    #[test]
    fn test_escaped_preserves_prefix_order() {
        let enc = |s: &[u8]| {
            let mut buf = Vec::new();
            encode_escaped(s, &mut buf);
            buf
        };
        assert!(enc(b"a") < enc(b"aa"));
        assert!(enc(b"aa") < enc(b"ab"));
        assert!(enc(b"ab") < enc(b"b"));
        assert!(enc(b"") < enc(b"\0"));
    }

    #[test]
    fn test_missing_terminator() {
        assert_eq!(decode_escaped(b"abc"), Err(EncodingError::Truncated));
        assert_eq!(decode_escaped(&[b'a', 0x00, 0x07]), Err(EncodingError::InvalidEscape(0x07)));
    }
}
