//! The collection contract every storage backend satisfies.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::query::{Filter, Patch};
use crate::error::StoreResult;

/// A fresh collection-unique identifier. Collisions are treated as
/// negligible and not checked.
pub(crate) fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A record type stored in a named collection.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Collection (or table) name this type lives in.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Structural checks applied to a full record before it is inserted.
    fn validate_insert(&self) -> Result<(), String> {
        Ok(())
    }

    /// Checks re-applied after a patch is merged into a stored record.
    ///
    /// Narrower than the insert checks on purpose: derived fields such as an
    /// order item's subtotal are the caller's responsibility on partial
    /// updates and are not re-verified here.
    fn validate_update(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Uniform CRUD surface over one collection of `T`.
///
/// Matching is equality on the fields named by the [`Filter`]; absent fields
/// are wildcards and a field no record carries matches nothing. Returned
/// records are independent copies: mutating one never touches stored state
/// until an explicit `update_one`.
///
/// All operations are safe to call concurrently. There is no read-modify-
/// write atomicity across calls; concurrent updates to one id race and the
/// last write to complete wins.
#[async_trait]
pub trait Collection<T: Entity>: Send + Sync {
    /// Every record matching `filter`; an empty filter returns all records.
    ///
    /// Degrades to an empty sequence when the backend fails (logged, never
    /// raised). Write paths stay strict.
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<T>>;

    /// First match in this backend's iteration order. The order is
    /// backend-defined but deterministic for identical stored contents.
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>>;

    /// The record with this id, using the backend's cheapest lookup.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>>;

    /// Persist `record` under a freshly assigned id (any id already on the
    /// record is overwritten) and return the stored copy.
    async fn insert_one(&self, record: T) -> StoreResult<T>;

    /// Shallow-merge `patch` into the record with this id and return the
    /// result, or `None` if no record has the id. The id itself is never
    /// altered, even if the patch names it.
    async fn update_one(&self, id: &str, patch: &Patch) -> StoreResult<Option<T>>;

    /// Remove and return the record with this id; `None` (not an error) if
    /// it is already gone.
    async fn delete_one(&self, id: &str) -> StoreResult<Option<T>>;

    /// Number of records matching `filter`, under the same rule as `find`.
    /// Degrades to zero when the backend fails.
    async fn count(&self, filter: &Filter) -> StoreResult<u64>;
}

/// Shared handle to a backend collection.
pub type SharedCollection<T> = Arc<dyn Collection<T>>;
