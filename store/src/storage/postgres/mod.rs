//! External relational backend on PostgreSQL.
//!
//! The public id is the primary key. Filters compile to parameterized
//! equality predicates ANDed together, inserts list explicit columns,
//! updates issue a single parameterized `SET`, and the composite order read
//! is one join-and-aggregate query instead of N round trips.

mod collection;
mod connection;
mod details;
mod entities;

pub use collection::PgCollection;
pub use connection::{PgConnection, RelationalConfig};
pub use entities::SqlRecord;

pub(crate) use details::order_with_details;
