//! # Storage Module
//!
//! Data persistence for the stockdesk admin console.
//!
//! One collection contract ([`traits::Collection`]) is implemented by every
//! backend so the layers above never know which one is active:
//!
//! - **Abstraction**: [`traits`] defines the contract, [`query`] the
//!   equality filters and shallow patches shared by all backends.
//! - **Backends**: [`memory`], [`jsonfile`], [`sqlite`] (document shape),
//!   [`postgres`] (relational shape).
//! - **Lifecycle**: [`manager`] tracks the connect/disconnect state of the
//!   active backend.
//!
//! None of the backends provide transactional isolation: concurrent updates
//! to the same record race and the last completed write wins. Callers cancel
//! an operation only by dropping its future; external backends bound each
//! operation with a timeout so nothing hangs indefinitely.

pub mod entities;
pub mod jsonfile;
pub mod manager;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod sqlite;
pub mod traits;

pub use manager::{BackendConfig, ConnectionManager, ConnectionState};
pub use query::{Filter, Patch};
pub use traits::{Collection, Entity, SharedCollection};
