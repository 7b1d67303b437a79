use anyhow::Result;
use sqlx::migrate::MigrateDatabase;
use sqlx::{Sqlite, SqlitePool};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Collections provisioned as document tables at connect time.
pub(crate) const COLLECTIONS: &[&str] = &[
    "products",
    "customers",
    "orders",
    "order_items",
    "payments",
    "warehouses",
    "expenses",
];

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the document backend.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// SQLite connection URI, e.g. `sqlite:stockdesk.db`.
    pub uri: String,
    /// Logical database name, used for logging only.
    pub db_name: String,
    /// Upper bound for a single operation against the backend.
    pub op_timeout: Duration,
}

impl DocumentConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: "stockdesk".to_string(),
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// A private in-memory database with a unique shared-cache name, handy
    /// for tests and demos.
    pub fn in_memory() -> Self {
        let instance = uuid::Uuid::new_v4().simple().to_string();
        Self::new(format!("file:memdb_{instance}?mode=memory&cache=shared"))
    }
}

/// SqliteConnection manages the document database pool.
#[derive(Clone)]
pub struct SqliteConnection {
    pool: Arc<SqlitePool>,
    op_timeout: Duration,
}

impl SqliteConnection {
    /// Connect, creating the database and the document tables if needed.
    pub async fn connect(config: &DocumentConfig) -> Result<Self> {
        if !Sqlite::database_exists(&config.uri).await.unwrap_or(false) {
            Sqlite::create_database(&config.uri).await?;
        }

        let pool = SqlitePool::connect(&config.uri).await?;
        Self::setup_schema(&pool).await?;
        info!(db = %config.db_name, "document store ready");

        Ok(Self {
            pool: Arc::new(pool),
            op_timeout: config.op_timeout,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a backend operation under the configured bound, so a wedged
    /// database surfaces a failure instead of hanging the caller.
    pub(crate) async fn bounded<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(anyhow::anyhow!(
                "operation timed out after {:?}",
                self.op_timeout
            )),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// One document table per collection.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for collection in COLLECTIONS {
            let ddl = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {collection} (
                    key INTEGER PRIMARY KEY AUTOINCREMENT,
                    body TEXT NOT NULL
                );
                "#
            );
            sqlx::query(&ddl).execute(pool).await?;
        }
        Ok(())
    }
}
