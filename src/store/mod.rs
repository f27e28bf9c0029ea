//! Ordered key-value store contract
//!
//! The collection never touches storage except through `OrderedStore` and
//! `WriteBatch`. `MemoryStore` is the in-process reference backend.

mod errors;
mod memory;
mod traits;

pub use errors::{StoreError, StoreResult};
pub use memory::{MemoryBatch, MemoryStore};
pub use traits::{Namespace, NamespaceId, OrderedStore, WriteBatch};
