//! Local-persisted backend: one JSON slot per collection on disk.
//!
//! The in-memory sequence is authoritative for the process lifetime; each
//! mutation rewrites the collection's slot atomically. A failed rewrite is
//! reported as a persistence failure but never rolls back the in-memory
//! state.

mod collection;
mod connection;

pub use collection::JsonCollection;
pub use connection::{JsonConnection, JsonStoreConfig};
