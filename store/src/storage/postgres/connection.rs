use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the external relational backend.
#[derive(Debug, Clone)]
pub struct RelationalConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl: bool,
    /// Upper bound for a single operation against the backend.
    pub op_timeout: Duration,
}

impl RelationalConfig {
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 5432,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            ssl: false,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub(crate) fn url(&self) -> String {
        let ssl_mode = if self.ssl { "require" } else { "prefer" };
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.database, ssl_mode
        )
    }
}

/// PgConnection manages the relational database pool.
#[derive(Clone)]
pub struct PgConnection {
    pool: Arc<PgPool>,
    op_timeout: Duration,
}

impl PgConnection {
    /// Connect and create the schema if it isn't there yet.
    pub async fn connect(config: &RelationalConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(config.op_timeout)
            .connect(&config.url())
            .await?;

        Self::setup_schema(&pool).await?;
        info!(host = %config.host, database = %config.database, "relational store ready");

        Ok(Self {
            pool: Arc::new(pool),
            op_timeout: config.op_timeout,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a backend operation under the configured bound, so an unreachable
    /// server surfaces a failure instead of hanging the caller.
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

    /// Set up the required database schema.
    ///
    /// No foreign keys: the order/items cascade is application-level by
    /// design. The CHECK constraints carry the same write-time invariants
    /// the other backends enforce in code.
    async fn setup_schema(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
                category TEXT NOT NULL,
                stock BIGINT NOT NULL CHECK (stock >= 0)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                address TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                customer_id TEXT NOT NULL,
                status TEXT NOT NULL,
                total_amount DOUBLE PRECISION NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_orders_customer_id
            ON orders(customer_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS order_items (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL,
                product_id TEXT NOT NULL,
                quantity BIGINT NOT NULL CHECK (quantity >= 1),
                price DOUBLE PRECISION NOT NULL,
                subtotal DOUBLE PRECISION NOT NULL,
                warehouse_id TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_order_items_order_id
            ON order_items(order_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS payments (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL,
                amount DOUBLE PRECISION NOT NULL,
                method TEXT NOT NULL,
                status TEXT NOT NULL,
                card_details TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_payments_order_id
            ON payments(order_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warehouses (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                amount DOUBLE PRECISION NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                warehouse_id TEXT NOT NULL,
                warehouse_name TEXT NOT NULL,
                expense_date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_expenses_warehouse_id
            ON expenses(warehouse_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
