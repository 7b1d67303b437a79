use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use std::marker::PhantomData;
use tracing::warn;

use super::connection::PgConnection;
use super::entities::SqlRecord;
use crate::error::{StoreError, StoreResult};
use crate::storage::query::{to_document, Filter, Patch};
use crate::storage::traits::{fresh_id, Collection};

/// Bind a JSON value to the next placeholder by its type. Nested structures
/// land in TEXT columns as serialized JSON.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) if n.is_i64() => query.bind(n.as_i64().unwrap_or_default()),
        Value::Number(n) => query.bind(n.as_f64().unwrap_or_default()),
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// Equality predicates ANDed together from the filter, `$first_placeholder`
/// onwards. `None` when a filter names a non-column: such a filter matches
/// nothing.
fn where_clause<T: SqlRecord>(
    filter: &Filter,
    first_placeholder: usize,
) -> Option<(String, Vec<Value>)> {
    if filter.is_empty() {
        return Some((String::new(), Vec::new()));
    }
    let mut predicates = Vec::with_capacity(filter.len());
    let mut values = Vec::with_capacity(filter.len());
    for (position, (field, value)) in filter.iter().enumerate() {
        if !T::COLUMNS.iter().any(|column| *column == field) {
            return None;
        }
        predicates.push(format!("{} = ${}", field, first_placeholder + position));
        values.push(value.clone());
    }
    Some((format!(" WHERE {}", predicates.join(" AND ")), values))
}

/// Relational collection: one table per entity, public id as primary key.
#[derive(Clone)]
pub struct PgCollection<T> {
    connection: PgConnection,
    _record: PhantomData<fn() -> T>,
}

impl<T: SqlRecord> PgCollection<T> {
    pub fn new(connection: PgConnection) -> Self {
        Self {
            connection,
            _record: PhantomData,
        }
    }

    async fn query_filtered(&self, filter: &Filter) -> anyhow::Result<Vec<T>> {
        let Some((where_sql, values)) = where_clause::<T>(filter, 1) else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY id",
            T::COLUMNS.join(", "),
            T::COLLECTION,
            where_sql
        );

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = bind_value(query, value);
        }
        let rows = self
            .connection
            .bounded(query.fetch_all(self.connection.pool()))
            .await?;
        rows.iter().map(T::from_row).collect()
    }

    async fn query_by_id(&self, id: &str) -> anyhow::Result<Option<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            T::COLUMNS.join(", "),
            T::COLLECTION
        );
        let row = self
            .connection
            .bounded(
                sqlx::query(&sql)
                    .bind(id.to_string())
                    .fetch_optional(self.connection.pool()),
            )
            .await?;
        row.as_ref().map(T::from_row).transpose()
    }
}

#[async_trait]
impl<T: SqlRecord> Collection<T> for PgCollection<T> {
    async fn find(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        match self.query_filtered(filter).await {
            Ok(records) => Ok(records),
            Err(error) => {
                warn!(table = T::COLLECTION, error = %error, "find degraded to empty");
                Ok(Vec::new())
            }
        }
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        self.query_filtered(filter)
            .await
            .map(|records| records.into_iter().next())
            .map_err(StoreError::Connection)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        self.query_by_id(id).await.map_err(StoreError::Connection)
    }

    async fn insert_one(&self, mut record: T) -> StoreResult<T> {
        record
            .validate_insert()
            .map_err(|reason| StoreError::Insert(anyhow::anyhow!(reason)))?;
        record.set_id(fresh_id());
        let doc = to_document(&record).map_err(StoreError::Insert)?;

        let placeholders = (1..=T::COLUMNS.len())
            .map(|position| format!("${position}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::COLLECTION,
            T::COLUMNS.join(", "),
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for column in T::COLUMNS {
            let value = doc.get(*column).cloned().unwrap_or(Value::Null);
            query = bind_value(query, &value);
        }
        self.connection
            .bounded(query.execute(self.connection.pool()))
            .await
            .map_err(StoreError::Insert)?;

        Ok(record)
    }

    async fn update_one(&self, id: &str, patch: &Patch) -> StoreResult<Option<T>> {
        // The id is never patched; fields the table doesn't have are ignored.
        let changes: Vec<(&str, Value)> = patch
            .iter()
            .filter(|(field, _)| {
                *field != "id" && T::COLUMNS.iter().any(|column| column == field)
            })
            .map(|(field, value)| (field, value.clone()))
            .collect();

        if changes.is_empty() {
            return self.query_by_id(id).await.map_err(StoreError::Update);
        }

        let assignments = changes
            .iter()
            .enumerate()
            .map(|(position, (field, _))| format!("{} = ${}", field, position + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
            T::COLLECTION,
            assignments,
            changes.len() + 1,
            T::COLUMNS.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for (_, value) in &changes {
            query = bind_value(query, value);
        }
        query = query.bind(id.to_string());

        let row = self
            .connection
            .bounded(query.fetch_optional(self.connection.pool()))
            .await
            .map_err(StoreError::Update)?;
        row.as_ref()
            .map(T::from_row)
            .transpose()
            .map_err(StoreError::Update)
    }

    async fn delete_one(&self, id: &str) -> StoreResult<Option<T>> {
        // Read then delete, two statements with no transaction; a concurrent
        // delete can win in between and the returned record goes stale.
        let Some(existing) = self.query_by_id(id).await.map_err(StoreError::Delete)? else {
            return Ok(None);
        };

        let sql = format!("DELETE FROM {} WHERE id = $1", T::COLLECTION);
        self.connection
            .bounded(
                sqlx::query(&sql)
                    .bind(id.to_string())
                    .execute(self.connection.pool()),
            )
            .await
            .map_err(StoreError::Delete)?;

        Ok(Some(existing))
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        let Some((where_sql, values)) = where_clause::<T>(filter, 1) else {
            return Ok(0);
        };
        let sql = format!("SELECT COUNT(*) AS cnt FROM {}{}", T::COLLECTION, where_sql);

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = bind_value(query, value);
        }
        match self
            .connection
            .bounded(query.fetch_one(self.connection.pool()))
            .await
            .and_then(|row| row.try_get::<i64, _>("cnt").map_err(anyhow::Error::from))
        {
            Ok(count) => Ok(count.max(0) as u64),
            Err(error) => {
                warn!(table = T::COLLECTION, error = %error, "count degraded to zero");
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Product;

    #[test]
    fn filters_compile_to_anded_predicates() {
        let filter = Filter::new().eq("category", "Tools").eq("stock", 10);
        let (sql, values) = where_clause::<Product>(&filter, 1).unwrap();
        assert_eq!(sql, " WHERE category = $1 AND stock = $2");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn non_column_filters_match_nothing() {
        let filter = Filter::new().eq("colour", "red");
        assert!(where_clause::<Product>(&filter, 1).is_none());
    }

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (sql, values) = where_clause::<Product>(&Filter::new(), 1).unwrap();
        assert!(sql.is_empty());
        assert!(values.is_empty());
    }
}
