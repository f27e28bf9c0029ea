//! Index definitions and the per-collection registry
//!
//! # Invariants
//!
//! - Definitions are resolved once, at registration
//! - Each index owns one namespace, distinct from the primary namespace
//! - Entries are composite keys `(value, primary_key)` with empty payloads

mod definition;
mod errors;
mod registry;

pub use definition::{Getter, IndexDefinition, IndexSpec};
pub use errors::{GetterError, IndexError, IndexResult};
pub use registry::{IndexRegistry, RegisteredIndex};
