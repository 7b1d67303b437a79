//! One contract suite, every backend.
//!
//! The same exercises run against the in-memory, local-persisted, and
//! document backends; the relational variant runs them too but is ignored by
//! default because it needs a live PostgreSQL server (see
//! `relational_backend::config`).
//!
//! Counts are asserted relative to a starting point and filters use
//! run-unique markers, so the suite also holds on a backend with existing
//! data.

use shared::{
    CardDetails, Customer, Order, OrderItem, OrderStatus, Payment, PaymentMethod, PaymentStatus,
    Product,
};
use stockdesk_store::{
    Collection, DocumentConfig, Filter, JsonStoreConfig, Patch, RelationalConfig, Store,
    StoreError,
};

fn marker() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

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

fn product_in(category: &str) -> Product {
    Product {
        category: category.to_string(),
        ..widget()
    }
}

fn customer() -> Customer {
    Customer {
        id: String::new(),
        name: "Maren Vos".to_string(),
        email: "maren.vos@example.com".to_string(),
        phone: "+31 10 555 0143".to_string(),
        address: "Veerhaven 12, Rotterdam".to_string(),
        created_at: shared::now_rfc3339(),
    }
}

fn order_for(customer_id: &str, total: f64) -> Order {
    Order {
        id: String::new(),
        customer_id: customer_id.to_string(),
        status: OrderStatus::Processing,
        total_amount: total,
        created_at: shared::now_rfc3339(),
    }
}

fn item_for(order_id: &str, quantity: i64, price: f64) -> OrderItem {
    OrderItem {
        id: String::new(),
        order_id: order_id.to_string(),
        product_id: "p-unused".to_string(),
        quantity,
        price,
        subtotal: price * quantity as f64,
        warehouse_id: "w-unused".to_string(),
    }
}

fn completed_card_payment(order_id: &str, amount: f64) -> Payment {
    Payment {
        id: String::new(),
        order_id: order_id.to_string(),
        amount,
        method: PaymentMethod::CreditCard,
        status: PaymentStatus::Completed,
        card_details: Some(CardDetails {
            last4: "4242".to_string(),
            expiry: "09/27".to_string(),
            brand: "visa".to_string(),
        }),
        created_at: shared::now_rfc3339(),
    }
}

async fn insert_then_lookup(store: &Store) {
    let stored = store
        .products
        .insert_one(widget())
        .await
        .expect("insert should succeed");
    assert!(!stored.id.is_empty());

    let found = store
        .products
        .find_by_id(&stored.id)
        .await
        .expect("lookup should succeed")
        .expect("record should be present");
    assert_eq!(found, stored);
}

async fn update_preserves_unpatched_fields(store: &Store) {
    let stored = store.products.insert_one(widget()).await.unwrap();

    let updated = store
        .products
        .update_one(&stored.id, &Patch::new().set("stock", 7))
        .await
        .expect("update should succeed")
        .expect("record should be present");
    assert_eq!(updated.stock, 7);
    assert_eq!(updated.name, "Widget");
    assert_eq!(updated.price, 9.99);
    assert_eq!(updated.id, stored.id);

    let refetched = store.products.find_by_id(&stored.id).await.unwrap().unwrap();
    assert_eq!(refetched, updated);
}

async fn delete_removes_and_counts_down(store: &Store) {
    let everything = Filter::new();
    let before = store.products.count(&everything).await.unwrap();

    let first = store.products.insert_one(widget()).await.unwrap();
    store.products.insert_one(widget()).await.unwrap();
    assert_eq!(store.products.count(&everything).await.unwrap(), before + 2);

    let deleted = store
        .products
        .delete_one(&first.id)
        .await
        .expect("delete should succeed")
        .expect("record should be present");
    assert_eq!(deleted, first);
    assert!(store.products.find_by_id(&first.id).await.unwrap().is_none());
    assert_eq!(store.products.count(&everything).await.unwrap(), before + 1);

    // Deleting again is an absent result, not an error.
    assert!(store.products.delete_one(&first.id).await.unwrap().is_none());
    assert_eq!(store.products.count(&everything).await.unwrap(), before + 1);
}

async fn reinserting_found_records_mints_fresh_ids(store: &Store) {
    let category = marker();
    store.products.insert_one(product_in(&category)).await.unwrap();
    store.products.insert_one(product_in(&category)).await.unwrap();

    let by_category = Filter::new().eq("category", category.as_str());
    let originals = store.products.find(&by_category).await.unwrap();
    assert_eq!(originals.len(), 2);

    for original in &originals {
        let reinserted = store
            .products
            .insert_one(original.clone())
            .await
            .expect("re-insert should succeed");
        assert!(!reinserted.id.is_empty());
        assert!(originals.iter().all(|o| o.id != reinserted.id));
    }
    assert_eq!(store.products.count(&by_category).await.unwrap(), 4);
}

async fn filters_are_equality_on_present_fields(store: &Store) {
    let tools = marker();
    let garden = marker();
    let in_tools = store.products.insert_one(product_in(&tools)).await.unwrap();
    store.products.insert_one(product_in(&garden)).await.unwrap();

    let by_tools = Filter::new().eq("category", tools.as_str());
    let found = store.products.find(&by_tools).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, in_tools.id);
    assert_eq!(store.products.count(&by_tools).await.unwrap(), 1);

    let first = store.products.find_one(&by_tools).await.unwrap().unwrap();
    assert_eq!(first.id, in_tools.id);

    // Every named field must match.
    let mismatch = Filter::new().eq("category", tools.as_str()).eq("stock", 11);
    assert!(store.products.find(&mismatch).await.unwrap().is_empty());

    // A field no record carries matches nothing.
    let unknown = Filter::new().eq("colour", "red");
    assert!(store.products.find(&unknown).await.unwrap().is_empty());
    assert_eq!(store.products.count(&unknown).await.unwrap(), 0);
}

async fn missing_ids_are_absent_not_errors(store: &Store) {
    assert!(store
        .products
        .find_by_id("nonexistent")
        .await
        .unwrap()
        .is_none());
    assert!(store
        .products
        .update_one("nonexistent", &Patch::new().set("stock", 1))
        .await
        .unwrap()
        .is_none());
    assert!(store.products.delete_one("nonexistent").await.unwrap().is_none());
}

async fn write_validation_is_enforced(store: &Store) {
    let mut negative_price = widget();
    negative_price.price = -1.0;
    assert!(matches!(
        store.products.insert_one(negative_price).await,
        Err(StoreError::Insert(_))
    ));

    let mut stale_subtotal = item_for("o-any", 3, 9.99);
    stale_subtotal.subtotal = 1.0;
    assert!(matches!(
        store.order_items.insert_one(stale_subtotal).await,
        Err(StoreError::Insert(_))
    ));

    let stored = store.products.insert_one(widget()).await.unwrap();
    assert!(matches!(
        store
            .products
            .update_one(&stored.id, &Patch::new().set("stock", -5))
            .await,
        Err(StoreError::Update(_))
    ));

    // The failed update left the record alone.
    let refetched = store.products.find_by_id(&stored.id).await.unwrap().unwrap();
    assert_eq!(refetched.stock, 10);
}

async fn deleting_an_order_cascades_to_its_items(store: &Store) {
    let buyer = store.customers.insert_one(customer()).await.unwrap();
    let order = store
        .orders
        .insert_one(order_for(&buyer.id, 49.0))
        .await
        .unwrap();
    store
        .order_items
        .insert_one(item_for(&order.id, 2, 24.5))
        .await
        .unwrap();
    store
        .order_items
        .insert_one(item_for(&order.id, 1, 74.25))
        .await
        .unwrap();

    let unrelated = store
        .orders
        .insert_one(order_for(&buyer.id, 21.6))
        .await
        .unwrap();
    let unrelated_item = store
        .order_items
        .insert_one(item_for(&unrelated.id, 1, 21.6))
        .await
        .unwrap();

    let deleted = store
        .delete_order(&order.id)
        .await
        .expect("cascade delete should succeed")
        .expect("order should be present");
    assert_eq!(deleted.id, order.id);

    let orphaned = Filter::new().eq("order_id", order.id.as_str());
    assert!(store.order_items.find(&orphaned).await.unwrap().is_empty());
    assert!(store.orders.find_by_id(&order.id).await.unwrap().is_none());

    // The other order and its item are untouched.
    assert!(store
        .order_items
        .find_by_id(&unrelated_item.id)
        .await
        .unwrap()
        .is_some());

    // Cascading an already-deleted order is an absent result.
    assert!(store.delete_order(&order.id).await.unwrap().is_none());
}

async fn composite_read_joins_order_payment_and_customer(store: &Store) {
    let buyer = store.customers.insert_one(customer()).await.unwrap();
    let order = store
        .orders
        .insert_one(order_for(&buyer.id, 49.0))
        .await
        .unwrap();
    let line = store
        .order_items
        .insert_one(item_for(&order.id, 2, 24.5))
        .await
        .unwrap();
    store
        .payments
        .insert_one(completed_card_payment(&order.id, 49.0))
        .await
        .unwrap();

    let details = store
        .order_with_details(&order.id)
        .await
        .expect("composite read should succeed")
        .expect("order should be present");

    assert_eq!(details.order, order);
    assert_eq!(details.items.len(), 1);
    assert_eq!(details.items[0].id, line.id);
    let payment = details.payment.expect("payment should be joined");
    assert_eq!(payment.status, PaymentStatus::Completed);
    let joined_customer = details.customer.expect("customer should be joined");
    assert_eq!(joined_customer.id, order.customer_id);

    assert!(store
        .order_with_details("nonexistent")
        .await
        .unwrap()
        .is_none());
}

mod memory_backend {
    use super::*;

    fn fresh() -> Store {
        Store::in_memory()
    }

    #[tokio::test]
    async fn insert_then_lookup() {
        super::insert_then_lookup(&fresh()).await;
    }

    #[tokio::test]
    async fn update_preserves_unpatched_fields() {
        super::update_preserves_unpatched_fields(&fresh()).await;
    }

    #[tokio::test]
    async fn delete_removes_and_counts_down() {
        super::delete_removes_and_counts_down(&fresh()).await;
    }

    #[tokio::test]
    async fn reinserting_found_records_mints_fresh_ids() {
        super::reinserting_found_records_mints_fresh_ids(&fresh()).await;
    }

    #[tokio::test]
    async fn filters_are_equality_on_present_fields() {
        super::filters_are_equality_on_present_fields(&fresh()).await;
    }

    #[tokio::test]
    async fn missing_ids_are_absent_not_errors() {
        super::missing_ids_are_absent_not_errors(&fresh()).await;
    }

    #[tokio::test]
    async fn write_validation_is_enforced() {
        super::write_validation_is_enforced(&fresh()).await;
    }

    #[tokio::test]
    async fn deleting_an_order_cascades_to_its_items() {
        super::deleting_an_order_cascades_to_its_items(&fresh()).await;
    }

    #[tokio::test]
    async fn composite_read_joins_order_payment_and_customer() {
        super::composite_read_joins_order_payment_and_customer(&fresh()).await;
    }
}

mod jsonfile_backend {
    use super::*;
    use tempfile::TempDir;

    fn fresh() -> (Store, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Store::open_json(&JsonStoreConfig::new(dir.path())).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn insert_then_lookup() {
        let (store, _dir) = fresh();
        super::insert_then_lookup(&store).await;
    }

    #[tokio::test]
    async fn update_preserves_unpatched_fields() {
        let (store, _dir) = fresh();
        super::update_preserves_unpatched_fields(&store).await;
    }

    #[tokio::test]
    async fn delete_removes_and_counts_down() {
        let (store, _dir) = fresh();
        super::delete_removes_and_counts_down(&store).await;
    }

    #[tokio::test]
    async fn reinserting_found_records_mints_fresh_ids() {
        let (store, _dir) = fresh();
        super::reinserting_found_records_mints_fresh_ids(&store).await;
    }

    #[tokio::test]
    async fn filters_are_equality_on_present_fields() {
        let (store, _dir) = fresh();
        super::filters_are_equality_on_present_fields(&store).await;
    }

    #[tokio::test]
    async fn missing_ids_are_absent_not_errors() {
        let (store, _dir) = fresh();
        super::missing_ids_are_absent_not_errors(&store).await;
    }

    #[tokio::test]
    async fn write_validation_is_enforced() {
        let (store, _dir) = fresh();
        super::write_validation_is_enforced(&store).await;
    }

    #[tokio::test]
    async fn deleting_an_order_cascades_to_its_items() {
        let (store, _dir) = fresh();
        super::deleting_an_order_cascades_to_its_items(&store).await;
    }

    #[tokio::test]
    async fn composite_read_joins_order_payment_and_customer() {
        let (store, _dir) = fresh();
        super::composite_read_joins_order_payment_and_customer(&store).await;
    }
}

mod document_backend {
    use super::*;

    async fn fresh() -> Store {
        Store::connect_document(&DocumentConfig::in_memory())
            .await
            .expect("in-memory document store should connect")
    }

    #[tokio::test]
    async fn insert_then_lookup() {
        super::insert_then_lookup(&fresh().await).await;
    }

    #[tokio::test]
    async fn update_preserves_unpatched_fields() {
        super::update_preserves_unpatched_fields(&fresh().await).await;
    }

    #[tokio::test]
    async fn delete_removes_and_counts_down() {
        super::delete_removes_and_counts_down(&fresh().await).await;
    }

    #[tokio::test]
    async fn reinserting_found_records_mints_fresh_ids() {
        super::reinserting_found_records_mints_fresh_ids(&fresh().await).await;
    }

    #[tokio::test]
    async fn filters_are_equality_on_present_fields() {
        super::filters_are_equality_on_present_fields(&fresh().await).await;
    }

    #[tokio::test]
    async fn missing_ids_are_absent_not_errors() {
        super::missing_ids_are_absent_not_errors(&fresh().await).await;
    }

    #[tokio::test]
    async fn write_validation_is_enforced() {
        super::write_validation_is_enforced(&fresh().await).await;
    }

    #[tokio::test]
    async fn deleting_an_order_cascades_to_its_items() {
        super::deleting_an_order_cascades_to_its_items(&fresh().await).await;
    }

    #[tokio::test]
    async fn composite_read_joins_order_payment_and_customer() {
        super::composite_read_joins_order_payment_and_customer(&fresh().await).await;
    }
}

mod relational_backend {
    use super::*;

    /// Connection settings for a disposable local server, overridable per
    /// environment. These tests are ignored by default; run them with
    /// `cargo test -- --ignored` once a server is up.
    fn config() -> RelationalConfig {
        let var = |name: &str, fallback: &str| {
            std::env::var(name).unwrap_or_else(|_| fallback.to_string())
        };
        RelationalConfig::new(
            var("STOCKDESK_PG_HOST", "localhost"),
            var("STOCKDESK_PG_DATABASE", "stockdesk_test"),
            var("STOCKDESK_PG_USER", "postgres"),
            var("STOCKDESK_PG_PASSWORD", "postgres"),
        )
    }

    async fn fresh() -> Store {
        Store::connect_relational(&config())
            .await
            .expect("relational store should connect")
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn insert_then_lookup() {
        super::insert_then_lookup(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn update_preserves_unpatched_fields() {
        super::update_preserves_unpatched_fields(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn delete_removes_and_counts_down() {
        super::delete_removes_and_counts_down(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn reinserting_found_records_mints_fresh_ids() {
        super::reinserting_found_records_mints_fresh_ids(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn filters_are_equality_on_present_fields() {
        super::filters_are_equality_on_present_fields(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn missing_ids_are_absent_not_errors() {
        super::missing_ids_are_absent_not_errors(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn write_validation_is_enforced() {
        super::write_validation_is_enforced(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn deleting_an_order_cascades_to_its_items() {
        super::deleting_an_order_cascades_to_its_items(&fresh().await).await;
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL server"]
    async fn composite_read_joins_order_payment_and_customer() {
        super::composite_read_joins_order_payment_and_customer(&fresh().await).await;
    }
}
