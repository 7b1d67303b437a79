use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::warn;

use super::connection::JsonConnection;
use crate::error::{StoreError, StoreResult};
use crate::storage::query::{matches, merge_patch, Filter, Patch};
use crate::storage::traits::{fresh_id, Collection, Entity};

/// Local-persisted collection. The slot is deserialized once at open; after
/// that the in-memory sequence is authoritative and each mutation rewrites
/// the slot in full.
#[derive(Clone)]
pub struct JsonCollection<T> {
    connection: JsonConnection,
    records: Arc<RwLock<Vec<T>>>,
}

impl<T: Entity> JsonCollection<T> {
    /// Load the collection's slot into memory.
    pub fn open(connection: JsonConnection) -> StoreResult<Self> {
        let records = connection
            .load::<T>(T::COLLECTION)
            .map_err(StoreError::Persistence)?;
        Ok(Self {
            connection,
            records: Arc::new(RwLock::new(records)),
        })
    }

    /// Rewrite the slot. The in-memory mutation this call follows stays
    /// applied even when the rewrite fails.
    fn persist(&self, records: &[T]) -> StoreResult<()> {
        self.connection.save(T::COLLECTION, records).map_err(|error| {
            warn!(
                collection = T::COLLECTION,
                error = %error,
                "slot rewrite failed; in-memory state retained"
            );
            StoreError::Persistence(error)
        })
    }
}

#[async_trait]
impl<T: Entity> Collection<T> for JsonCollection<T> {
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

        let snapshot = {
            let mut records = self.records.write().unwrap();
            records.push(record.clone());
            records.clone()
        };
        self.persist(&snapshot)?;
        Ok(record)
    }

    async fn update_one(&self, id: &str, patch: &Patch) -> StoreResult<Option<T>> {
        let (merged, snapshot) = {
            let mut records = self.records.write().unwrap();
            let Some(position) = records.iter().position(|record| record.id() == id) else {
                return Ok(None);
            };
            let merged = merge_patch(&records[position], patch).map_err(StoreError::Update)?;
            merged
                .validate_update()
                .map_err(|reason| StoreError::Update(anyhow::anyhow!(reason)))?;
            records[position] = merged.clone();
            (merged, records.clone())
        };
        self.persist(&snapshot)?;
        Ok(Some(merged))
    }

    async fn delete_one(&self, id: &str) -> StoreResult<Option<T>> {
        let (removed, snapshot) = {
            let mut records = self.records.write().unwrap();
            let Some(position) = records.iter().position(|record| record.id() == id) else {
                return Ok(None);
            };
            let removed = records.remove(position);
            (removed, records.clone())
        };
        self.persist(&snapshot)?;
        Ok(Some(removed))
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let records = self.records.read().unwrap();
        Ok(records.iter().filter(|record| matches(*record, filter)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Product;
    use tempfile::TempDir;

    use crate::storage::jsonfile::JsonStoreConfig;

    fn widget() -> Product {
        Product {
            id: String::new(),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: 9.99,
            category: "Tools".to_string(),
            stock: 10,
        }
    }

    fn open_collection(dir: &TempDir) -> JsonCollection<Product> {
        let connection = JsonConnection::open(&JsonStoreConfig::new(dir.path())).unwrap();
        JsonCollection::open(connection).unwrap()
    }

    #[tokio::test]
    async fn records_survive_a_reopen() {
        let dir = TempDir::new().unwrap();

        let collection = open_collection(&dir);
        let stored = collection.insert_one(widget()).await.unwrap();
        drop(collection);

        let reopened = open_collection(&dir);
        let found = reopened.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn deletes_reach_the_slot() {
        let dir = TempDir::new().unwrap();

        let collection = open_collection(&dir);
        let stored = collection.insert_one(widget()).await.unwrap();
        collection.delete_one(&stored.id).await.unwrap();
        drop(collection);

        let reopened = open_collection(&dir);
        assert_eq!(reopened.count(&Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn corrupt_slot_fails_at_open() {
        let dir = TempDir::new().unwrap();
        let connection = JsonConnection::open(&JsonStoreConfig::new(dir.path())).unwrap();
        std::fs::write(connection.slot_path("products"), "[{broken").unwrap();

        assert!(matches!(
            JsonCollection::<Product>::open(connection),
            Err(StoreError::Persistence(_))
        ));
    }
}
