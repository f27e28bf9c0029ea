//! Ordered key model and encodings
//!
//! Keys reach the store as byte strings; the store compares them bytewise.
//! An encoding is therefore the ordering of a namespace.

mod errors;
mod key;
mod sortable;
mod traits;
mod utf8;

pub use errors::{EncodingError, EncodingResult};
pub use key::IndexKey;
pub use sortable::{tags, SortableEncoding};
pub use traits::KeyEncoding;
pub use utf8::Utf8Encoding;

use std::sync::Arc;

/// The ordering used when a definition does not name one
pub fn default_encoding() -> Arc<dyn KeyEncoding> {
    Arc::new(SortableEncoding)
}
