//! Embedded document backend on SQLite.
//!
//! Records are stored as JSON bodies under a native AUTOINCREMENT key; the
//! public id is the decimal rendering of that key, translated in one place
//! at the boundary ([`collection`]).

mod collection;
mod connection;

pub use collection::SqliteCollection;
pub use connection::{DocumentConfig, SqliteConnection};
