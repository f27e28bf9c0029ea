//! indexkv - secondary indexes over an ordered key-value store
//!
//! A `Collection` keeps records in a primary namespace and, for every
//! registered index, a namespace of `(value, primary key)` entries kept in
//! step with the records by atomic batches.
//!
//! - `encoding`: index values and their order-preserving byte encodings
//! - `store`: the ordered store interface and an in-memory implementation
//! - `index`: definitions, getters and the per-collection registry
//! - `collection`: put / delete / query
//! - `observability`: structured JSON events and counters
//! - `cli`: the `indexkv` binary

pub mod cli;
pub mod collection;
pub mod encoding;
pub mod index;
pub mod observability;
pub mod store;

pub use collection::{Collection, CollectionConfig};
pub use encoding::{IndexKey, KeyEncoding, SortableEncoding, Utf8Encoding};
pub use index::{GetterError, IndexDefinition, IndexError, IndexResult, IndexSpec};
pub use store::{MemoryStore, OrderedStore};
