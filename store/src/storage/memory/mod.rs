//! In-memory backend: a shared mutable sequence of records per collection.
//!
//! Always available, nothing persisted. `Store::demo()` seeds these
//! collections with the fixture data in [`fixtures`].

pub mod fixtures;

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use super::query::{matches, merge_patch, Filter, Patch};
use super::traits::{fresh_id, Collection, Entity};
use crate::error::{StoreError, StoreResult};

/// Collection over a shared in-memory sequence. Reads clone records out; the
/// live backing sequence is never handed to a caller.
#[derive(Clone)]
pub struct MemoryCollection<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T: Entity> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Start from existing records, keeping their ids as-is.
    pub fn seeded(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

impl<T: Entity> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Collection<T> for MemoryCollection<T> {
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|record| matches(*record, filter))
            .cloned()
            .collect())
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|record| matches(*record, filter)).cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|record| record.id() == id).cloned())
    }

    async fn insert_one(&self, mut record: T) -> StoreResult<T> {
        record
            .validate_insert()
            .map_err(|reason| StoreError::Insert(anyhow::anyhow!(reason)))?;
        record.set_id(fresh_id());
        let mut records = self.records.write().unwrap();
        records.push(record.clone());
        Ok(record)
    }

    async fn update_one(&self, id: &str, patch: &Patch) -> StoreResult<Option<T>> {
        let mut records = self.records.write().unwrap();
        let Some(position) = records.iter().position(|record| record.id() == id) else {
            return Ok(None);
        };
        let merged = merge_patch(&records[position], patch).map_err(StoreError::Update)?;
        merged
            .validate_update()
            .map_err(|reason| StoreError::Update(anyhow::anyhow!(reason)))?;
        records[position] = merged.clone();
        Ok(Some(merged))
    }

    async fn delete_one(&self, id: &str) -> StoreResult<Option<T>> {
        let mut records = self.records.write().unwrap();
        let Some(position) = records.iter().position(|record| record.id() == id) else {
            return Ok(None);
        };
        Ok(Some(records.remove(position)))
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let records = self.records.read().unwrap();
        Ok(records.iter().filter(|record| matches(*record, filter)).count() as u64)
    }
}
