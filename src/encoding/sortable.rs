//! Default tagged ordering
//!
//! Every part starts with a type tag, so keys of different kinds never
//! interleave:
//!
//! - `Bool` (0x01) - false before true
//! - `Int` (0x02) - sign-flipped big-endian
//! - `Float` (0x03) - order-preserving bits, big-endian
//! - `String` (0x04) - null-escaped UTF-8, `0x00 0x00` terminated
//!
//! The max sentinel is `0xFF`, above every tag.

use super::errors::{EncodingError, EncodingResult};
use super::key::IndexKey;
use super::traits::{decode_escaped, encode_escaped, KeyEncoding};

/// Type tags; their numeric order is the cross-kind key order.
pub mod tags {
    pub const BOOL: u8 = 0x01;
    pub const INT: u8 = 0x02;
    pub const FLOAT: u8 = 0x03;
    pub const STRING: u8 = 0x04;
    /// Sorts after every tag
    pub const MAX: u8 = 0xFF;
}

const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;
const MAX_SENTINEL: [u8; 1] = [tags::MAX];

/// Tagged, order-preserving encoding for every `IndexKey` kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortableEncoding;

impl KeyEncoding for SortableEncoding {
    fn name(&self) -> &'static str {
        "sortable"
    }

    fn encode_into(&self, key: &IndexKey, buf: &mut Vec<u8>) -> EncodingResult<()> {
        match key {
            IndexKey::Bool(b) => {
                buf.push(tags::BOOL);
                buf.push(u8::from(*b));
            }
            IndexKey::Int(i) => {
                buf.push(tags::INT);
                buf.extend_from_slice(&((*i as u64) ^ SIGN_FLIP_I64).to_be_bytes());
            }
            IndexKey::Float(ordered) => {
                buf.push(tags::FLOAT);
                buf.extend_from_slice(&ordered.to_be_bytes());
            }
            IndexKey::String(s) => {
                buf.push(tags::STRING);
                encode_escaped(s.as_bytes(), buf);
            }
        }
        Ok(())
    }

    fn decode_from(&self, data: &[u8]) -> EncodingResult<(IndexKey, usize)> {
        let (&tag, rest) = data.split_first().ok_or(EncodingError::Truncated)?;
        match tag {
            tags::BOOL => {
                let byte = rest.first().ok_or(EncodingError::Truncated)?;
                Ok((IndexKey::Bool(*byte != 0), 2))
            }
            tags::INT => {
                let raw = read_u64(rest)?;
                Ok((IndexKey::Int((raw ^ SIGN_FLIP_I64) as i64), 9))
            }
            tags::FLOAT => Ok((IndexKey::Float(read_u64(rest)?), 9)),
            tags::STRING => {
                let (bytes, used) = decode_escaped(rest)?;
                let s = String::from_utf8(bytes).map_err(|_| EncodingError::InvalidUtf8)?;
                Ok((IndexKey::String(s), used + 1))
            }
            other => Err(EncodingError::UnknownTag(other)),
        }
    }

    fn max_sentinel(&self) -> &'static [u8] {
        &MAX_SENTINEL
    }
}

fn read_u64(data: &[u8]) -> EncodingResult<u64> {
    let bytes: [u8; 8] = data
        .get(..8)
        .ok_or(EncodingError::Truncated)?
        .try_into()
        .map_err(|_| EncodingError::Truncated)?;
    Ok(u64::from_be_bytes(bytes))
}
