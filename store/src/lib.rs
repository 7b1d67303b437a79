//! # stockdesk-store
//!
//! Storage core for the stockdesk inventory/commerce admin console.
//!
//! Every entity collection is reached through one contract
//! ([`Collection`](storage::traits::Collection)) implemented by four
//! interchangeable backends:
//!
//! - [`storage::memory`]: shared in-memory sequences, optionally seeded with
//!   demo fixtures; always available.
//! - [`storage::jsonfile`]: local persistence, one JSON slot per collection,
//!   rewritten atomically after every mutation.
//! - [`storage::sqlite`]: embedded document database; records live as JSON
//!   bodies under a native surrogate key translated to the public id at the
//!   boundary.
//! - [`storage::postgres`]: external relational database; the public id is
//!   the primary key and queries compile to parameterized SQL.
//!
//! [`Store`](registry::Store) wires one collection per entity to a single
//! backend, adds the order/items delete cascade and the one composite read
//! (`order_with_details`), and
//! [`ConnectionManager`](storage::manager::ConnectionManager) tracks the
//! backend lifecycle. Swapping backends is a configuration change, never a
//! caller change.

pub mod error;
pub mod registry;
pub mod storage;

pub use error::{StoreError, StoreResult};
pub use registry::Store;
pub use storage::jsonfile::JsonStoreConfig;
pub use storage::manager::{BackendConfig, ConnectionManager, ConnectionState};
pub use storage::postgres::RelationalConfig;
pub use storage::query::{Filter, Patch};
pub use storage::sqlite::DocumentConfig;
pub use storage::traits::{Collection, Entity, SharedCollection};
