use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use std::marker::PhantomData;
use tracing::warn;

use super::connection::SqliteConnection;
use crate::error::{StoreError, StoreResult};
use crate::storage::query::{matches, merge_patch, Filter, Patch};
use crate::storage::traits::{Collection, Entity};

/// Render a native key as the public id.
fn public_id(key: i64) -> String {
    key.to_string()
}

/// Parse a public id back to the native key. Ids this backend never issued
/// simply do not resolve.
fn native_key(id: &str) -> Option<i64> {
    id.parse().ok()
}

/// Decode a stored row into its public record: parse the body and inject the
/// id derived from the native key.
fn to_public<T: Entity>(key: i64, body: &str) -> anyhow::Result<T> {
    let mut value: Value = serde_json::from_str(body)?;
    if let Value::Object(map) = &mut value {
        map.insert("id".to_string(), Value::String(public_id(key)));
    }
    Ok(serde_json::from_value(value)?)
}

/// Strip the public id and serialize the remaining fields as the stored body.
fn to_body<T: Entity>(record: &T) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(value.to_string())
}

/// Document collection: JSON bodies under a native surrogate key, filtered
/// in application code with the shared matcher.
#[derive(Clone)]
pub struct SqliteCollection<T> {
    connection: SqliteConnection,
    _record: PhantomData<fn() -> T>,
}

impl<T: Entity> SqliteCollection<T> {
    pub fn new(connection: SqliteConnection) -> Self {
        Self {
            connection,
            _record: PhantomData,
        }
    }

    /// Every stored row in native key order.
    async fn fetch_all(&self) -> anyhow::Result<Vec<T>> {
        let sql = format!("SELECT key, body FROM {} ORDER BY key", T::COLLECTION);
        let rows = self
            .connection
            .bounded(sqlx::query(&sql).fetch_all(self.connection.pool()))
            .await?;

        rows.iter()
            .map(|row| {
                let key: i64 = row.try_get("key")?;
                let body: String = row.try_get("body")?;
                to_public(key, &body)
            })
            .collect()
    }

    /// One stored row by native key.
    async fn fetch_by_key(&self, key: i64) -> anyhow::Result<Option<T>> {
        let sql = format!("SELECT body FROM {} WHERE key = ?", T::COLLECTION);
        let row = self
            .connection
            .bounded(sqlx::query(&sql).bind(key).fetch_optional(self.connection.pool()))
            .await?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body")?;
                Ok(Some(to_public(key, &body)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<T: Entity> Collection<T> for SqliteCollection<T> {
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        match self.fetch_all().await {
            Ok(records) => Ok(records
                .into_iter()
                .filter(|record| matches(record, filter))
                .collect()),
            Err(error) => {
                warn!(collection = T::COLLECTION, error = %error, "find degraded to empty");
                Ok(Vec::new())
            }
        }
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        let records = self.fetch_all().await.map_err(StoreError::Connection)?;
        Ok(records.into_iter().find(|record| matches(record, filter)))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        let Some(key) = native_key(id) else {
            return Ok(None);
        };
        self.fetch_by_key(key).await.map_err(StoreError::Connection)
    }

    async fn insert_one(&self, mut record: T) -> StoreResult<T> {
        record
            .validate_insert()
            .map_err(|reason| StoreError::Insert(anyhow::anyhow!(reason)))?;
        let body = to_body(&record).map_err(StoreError::Insert)?;

        let sql = format!("INSERT INTO {} (body) VALUES (?)", T::COLLECTION);
        let result = self
            .connection
            .bounded(sqlx::query(&sql).bind(body).execute(self.connection.pool()))
            .await
            .map_err(StoreError::Insert)?;

        record.set_id(public_id(result.last_insert_rowid()));
        Ok(record)
    }

    async fn update_one(&self, id: &str, patch: &Patch) -> StoreResult<Option<T>> {
        let Some(key) = native_key(id) else {
            return Ok(None);
        };
        let Some(current) = self.fetch_by_key(key).await.map_err(StoreError::Update)? else {
            return Ok(None);
        };

        let merged = merge_patch(&current, patch).map_err(StoreError::Update)?;
        merged
            .validate_update()
            .map_err(|reason| StoreError::Update(anyhow::anyhow!(reason)))?;
        let body = to_body(&merged).map_err(StoreError::Update)?;

        let sql = format!("UPDATE {} SET body = ? WHERE key = ?", T::COLLECTION);
        self.connection
            .bounded(
                sqlx::query(&sql)
                    .bind(body)
                    .bind(key)
                    .execute(self.connection.pool()),
            )
            .await
            .map_err(StoreError::Update)?;

        Ok(Some(merged))
    }

    async fn delete_one(&self, id: &str) -> StoreResult<Option<T>> {
        let Some(key) = native_key(id) else {
            return Ok(None);
        };
        // Read then delete, two statements; a concurrent delete can win in
        // between and the returned record goes stale.
        let Some(existing) = self.fetch_by_key(key).await.map_err(StoreError::Delete)? else {
            return Ok(None);
        };

        let sql = format!("DELETE FROM {} WHERE key = ?", T::COLLECTION);
        self.connection
            .bounded(sqlx::query(&sql).bind(key).execute(self.connection.pool()))
            .await
            .map_err(StoreError::Delete)?;

        Ok(Some(existing))
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        match self.fetch_all().await {
            Ok(records) => {
                Ok(records.iter().filter(|record| matches(*record, filter)).count() as u64)
            }
            Err(error) => {
                warn!(collection = T::COLLECTION, error = %error, "count degraded to zero");
                Ok(0)
            }
        }
    }
}
