//! The collection registry: one canonical collection per entity, wired to a
//! single backend at construction.

use async_trait::async_trait;
use std::sync::Arc;

use shared::{Customer, Expense, Order, OrderDetails, OrderItem, Payment, Product, Warehouse};

use crate::error::{StoreError, StoreResult};
use crate::storage::jsonfile::{JsonCollection, JsonConnection, JsonStoreConfig};
use crate::storage::manager::BackendConfig;
use crate::storage::memory::{fixtures, MemoryCollection};
use crate::storage::postgres::{self, PgCollection, PgConnection, RelationalConfig};
use crate::storage::query::Filter;
use crate::storage::sqlite::{DocumentConfig, SqliteCollection, SqliteConnection};
use crate::storage::traits::{Collection, SharedCollection};

/// Produces the composite order read for one backend family.
#[async_trait]
trait OrderDetailsSource: Send + Sync {
    async fn order_with_details(&self, order_id: &str) -> StoreResult<Option<OrderDetails>>;
}

/// Application-side combine: fetch the order, then its items, payment, and
/// customer concurrently.
struct CombinedDetails {
    orders: SharedCollection<Order>,
    items: SharedCollection<OrderItem>,
    payments: SharedCollection<Payment>,
    customers: SharedCollection<Customer>,
}

#[async_trait]
impl OrderDetailsSource for CombinedDetails {
    async fn order_with_details(&self, order_id: &str) -> StoreResult<Option<OrderDetails>> {
        let Some(order) = self.orders.find_by_id(order_id).await? else {
            return Ok(None);
        };

        let by_order = Filter::new().eq("order_id", order_id);
        let (items, payment, customer) = tokio::join!(
            self.items.find(&by_order),
            self.payments.find_one(&by_order),
            self.customers.find_by_id(&order.customer_id),
        );

        Ok(Some(OrderDetails {
            order,
            items: items?,
            payment: payment?,
            customer: customer?,
        }))
    }
}

/// Relational combine: a single join-and-aggregate query.
struct SqlDetails {
    connection: PgConnection,
}

#[async_trait]
impl OrderDetailsSource for SqlDetails {
    async fn order_with_details(&self, order_id: &str) -> StoreResult<Option<OrderDetails>> {
        postgres::order_with_details(&self.connection, order_id)
            .await
            .map_err(StoreError::Connection)
    }
}

/// Pools to release when the store is closed.
#[derive(Clone)]
enum BackendHandle {
    Memory,
    JsonFile,
    Document(SqliteConnection),
    Relational(PgConnection),
}

/// One collection per entity, all on the same backend. Swapping backend is a
/// construction-time choice; callers hold the same `Store` surface either
/// way.
#[derive(Clone)]
pub struct Store {
    pub products: SharedCollection<Product>,
    pub customers: SharedCollection<Customer>,
    pub orders: SharedCollection<Order>,
    pub order_items: SharedCollection<OrderItem>,
    pub payments: SharedCollection<Payment>,
    pub warehouses: SharedCollection<Warehouse>,
    pub expenses: SharedCollection<Expense>,
    details: Arc<dyn OrderDetailsSource>,
    backend: BackendHandle,
}

impl Store {
    /// Wire up whichever backend the config names.
    pub async fn open(config: &BackendConfig) -> StoreResult<Self> {
        match config {
            BackendConfig::Memory { seeded: false } => Ok(Self::in_memory()),
            BackendConfig::Memory { seeded: true } => Ok(Self::demo()),
            BackendConfig::JsonFile(config) => Self::open_json(config),
            BackendConfig::Document(config) => Self::connect_document(config).await,
            BackendConfig::Relational(config) => Self::connect_relational(config).await,
        }
    }

    /// Empty in-memory store; always available.
    pub fn in_memory() -> Self {
        Self::memory_with(
            MemoryCollection::new(),
            MemoryCollection::new(),
            MemoryCollection::new(),
            MemoryCollection::new(),
            MemoryCollection::new(),
            MemoryCollection::new(),
            MemoryCollection::new(),
        )
    }

    /// In-memory store seeded with the demo fixtures.
    pub fn demo() -> Self {
        Self::memory_with(
            MemoryCollection::seeded(fixtures::products()),
            MemoryCollection::seeded(fixtures::customers()),
            MemoryCollection::seeded(fixtures::orders()),
            MemoryCollection::seeded(fixtures::order_items()),
            MemoryCollection::seeded(fixtures::payments()),
            MemoryCollection::seeded(fixtures::warehouses()),
            MemoryCollection::seeded(fixtures::expenses()),
        )
    }

    fn memory_with(
        products: MemoryCollection<Product>,
        customers: MemoryCollection<Customer>,
        orders: MemoryCollection<Order>,
        order_items: MemoryCollection<OrderItem>,
        payments: MemoryCollection<Payment>,
        warehouses: MemoryCollection<Warehouse>,
        expenses: MemoryCollection<Expense>,
    ) -> Self {
        let products: SharedCollection<Product> = Arc::new(products);
        let customers: SharedCollection<Customer> = Arc::new(customers);
        let orders: SharedCollection<Order> = Arc::new(orders);
        let order_items: SharedCollection<OrderItem> = Arc::new(order_items);
        let payments: SharedCollection<Payment> = Arc::new(payments);
        let warehouses: SharedCollection<Warehouse> = Arc::new(warehouses);
        let expenses: SharedCollection<Expense> = Arc::new(expenses);

        let details = Arc::new(CombinedDetails {
            orders: orders.clone(),
            items: order_items.clone(),
            payments: payments.clone(),
            customers: customers.clone(),
        });

        Self {
            products,
            customers,
            orders,
            order_items,
            payments,
            warehouses,
            expenses,
            details,
            backend: BackendHandle::Memory,
        }
    }

    /// Local-persisted store: every collection loads its slot now and
    /// rewrites it after each mutation.
    pub fn open_json(config: &JsonStoreConfig) -> StoreResult<Self> {
        let connection = JsonConnection::open(config).map_err(StoreError::Persistence)?;

        let products: SharedCollection<Product> =
            Arc::new(JsonCollection::open(connection.clone())?);
        let customers: SharedCollection<Customer> =
            Arc::new(JsonCollection::open(connection.clone())?);
        let orders: SharedCollection<Order> = Arc::new(JsonCollection::open(connection.clone())?);
        let order_items: SharedCollection<OrderItem> =
            Arc::new(JsonCollection::open(connection.clone())?);
        let payments: SharedCollection<Payment> =
            Arc::new(JsonCollection::open(connection.clone())?);
        let warehouses: SharedCollection<Warehouse> =
            Arc::new(JsonCollection::open(connection.clone())?);
        let expenses: SharedCollection<Expense> = Arc::new(JsonCollection::open(connection)?);

        let details = Arc::new(CombinedDetails {
            orders: orders.clone(),
            items: order_items.clone(),
            payments: payments.clone(),
            customers: customers.clone(),
        });

        Ok(Self {
            products,
            customers,
            orders,
            order_items,
            payments,
            warehouses,
            expenses,
            details,
            backend: BackendHandle::JsonFile,
        })
    }

    /// Document store on the embedded database.
    pub async fn connect_document(config: &DocumentConfig) -> StoreResult<Self> {
        let connection = SqliteConnection::connect(config)
            .await
            .map_err(StoreError::Connection)?;

        let products: SharedCollection<Product> =
            Arc::new(SqliteCollection::new(connection.clone()));
        let customers: SharedCollection<Customer> =
            Arc::new(SqliteCollection::new(connection.clone()));
        let orders: SharedCollection<Order> = Arc::new(SqliteCollection::new(connection.clone()));
        let order_items: SharedCollection<OrderItem> =
            Arc::new(SqliteCollection::new(connection.clone()));
        let payments: SharedCollection<Payment> =
            Arc::new(SqliteCollection::new(connection.clone()));
        let warehouses: SharedCollection<Warehouse> =
            Arc::new(SqliteCollection::new(connection.clone()));
        let expenses: SharedCollection<Expense> =
            Arc::new(SqliteCollection::new(connection.clone()));

        let details = Arc::new(CombinedDetails {
            orders: orders.clone(),
            items: order_items.clone(),
            payments: payments.clone(),
            customers: customers.clone(),
        });

        Ok(Self {
            products,
            customers,
            orders,
            order_items,
            payments,
            warehouses,
            expenses,
            details,
            backend: BackendHandle::Document(connection),
        })
    }

    /// Relational store on the external database.
    pub async fn connect_relational(config: &RelationalConfig) -> StoreResult<Self> {
        let connection = PgConnection::connect(config)
            .await
            .map_err(StoreError::Connection)?;

        let products: SharedCollection<Product> = Arc::new(PgCollection::new(connection.clone()));
        let customers: SharedCollection<Customer> =
            Arc::new(PgCollection::new(connection.clone()));
        let orders: SharedCollection<Order> = Arc::new(PgCollection::new(connection.clone()));
        let order_items: SharedCollection<OrderItem> =
            Arc::new(PgCollection::new(connection.clone()));
        let payments: SharedCollection<Payment> = Arc::new(PgCollection::new(connection.clone()));
        let warehouses: SharedCollection<Warehouse> =
            Arc::new(PgCollection::new(connection.clone()));
        let expenses: SharedCollection<Expense> = Arc::new(PgCollection::new(connection.clone()));

        let details = Arc::new(SqlDetails {
            connection: connection.clone(),
        });

        Ok(Self {
            products,
            customers,
            orders,
            order_items,
            payments,
            warehouses,
            expenses,
            details,
            backend: BackendHandle::Relational(connection),
        })
    }

    /// The one cross-entity read beyond plain CRUD: an order joined with its
    /// items, payment, and customer.
    pub async fn order_with_details(&self, order_id: &str) -> StoreResult<Option<OrderDetails>> {
        self.details.order_with_details(order_id).await
    }

    /// Delete an order and cascade to its items. The cascade lives here, not
    /// in the database schema; no other entity is ever mutated implicitly.
    pub async fn delete_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let Some(order) = self.orders.delete_one(order_id).await? else {
            return Ok(None);
        };

        let by_order = Filter::new().eq("order_id", order_id);
        for item in self.order_items.find(&by_order).await? {
            self.order_items.delete_one(&item.id).await?;
        }

        Ok(Some(order))
    }

    /// Release backend resources. In-memory and file-backed stores have
    /// nothing to release.
    pub async fn close(&self) {
        match &self.backend {
            BackendHandle::Document(connection) => connection.close().await,
            BackendHandle::Relational(connection) => connection.close().await,
            BackendHandle::Memory | BackendHandle::JsonFile => {}
        }
    }
}
