//! Registry-level behavior: demo seed data, persistence across reopen, and
//! the manager-driven lifecycle.

use shared::{OrderStatus, PaymentStatus};
use stockdesk_store::{
    BackendConfig, Collection, ConnectionManager, ConnectionState, Filter, JsonStoreConfig, Patch,
    Store,
};
use tempfile::TempDir;

#[tokio::test]
async fn demo_store_is_seeded_and_cross_referenced() {
    let store = Store::demo();

    let products = store.products.find(&Filter::new()).await.unwrap();
    assert!(!products.is_empty());

    // Every expense's warehouse_name is the snapshot of a real warehouse.
    for expense in store.expenses.find(&Filter::new()).await.unwrap() {
        let warehouse = store
            .warehouses
            .find_by_id(&expense.warehouse_id)
            .await
            .unwrap()
            .expect("expense should reference a seeded warehouse");
        assert_eq!(expense.warehouse_name, warehouse.name);
    }

    // Every order item belongs to a seeded order and product.
    for item in store.order_items.find(&Filter::new()).await.unwrap() {
        assert!(store
            .orders
            .find_by_id(&item.order_id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .products
            .find_by_id(&item.product_id)
            .await
            .unwrap()
            .is_some());
    }
}

#[tokio::test]
async fn demo_order_composite_read_is_complete() {
    let store = Store::demo();

    let order = store
        .orders
        .find_one(&Filter::new().eq("status", OrderStatus::Processing))
        .await
        .unwrap()
        .expect("demo data seeds a processing order");

    let details = store
        .order_with_details(&order.id)
        .await
        .unwrap()
        .expect("seeded order should resolve");
    assert_eq!(details.items.len(), 2);
    assert_eq!(
        details.payment.map(|p| p.status),
        Some(PaymentStatus::Completed)
    );
    assert_eq!(
        details.customer.map(|c| c.id),
        Some(order.customer_id.clone())
    );
}

#[tokio::test]
async fn json_store_survives_a_reopen() {
    let dir = TempDir::new().unwrap();
    let config = JsonStoreConfig::new(dir.path()).with_prefix("stockdesk_");

    let inserted = {
        let store = Store::open_json(&config).unwrap();
        let warehouse = store
            .warehouses
            .insert_one(shared::Warehouse {
                id: String::new(),
                name: "Central Depot".to_string(),
                location: "Rotterdam".to_string(),
                created_at: shared::now_rfc3339(),
            })
            .await
            .unwrap();
        store
            .warehouses
            .update_one(&warehouse.id, &Patch::new().set("location", "Delft"))
            .await
            .unwrap()
            .unwrap()
    };

    let reopened = Store::open_json(&config).unwrap();
    let found = reopened
        .warehouses
        .find_by_id(&inserted.id)
        .await
        .unwrap()
        .expect("record should survive the reopen");
    assert_eq!(found, inserted);
    assert_eq!(found.location, "Delft");
}

#[tokio::test]
async fn manager_drives_the_full_lifecycle() {
    let manager = ConnectionManager::new();
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    let store = manager
        .connect(BackendConfig::Memory { seeded: true })
        .await
        .unwrap();
    assert_eq!(manager.state(), ConnectionState::Connected);

    // The handle the manager keeps sees the same backend as the one returned.
    let held = manager.active().expect("manager should hold the store");
    let stored = store
        .products
        .insert_one(shared::Product {
            id: String::new(),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: 9.99,
            category: "Tools".to_string(),
            stock: 10,
        })
        .await
        .unwrap();
    assert!(held.products.find_by_id(&stored.id).await.unwrap().is_some());

    manager.disconnect().await;
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert!(manager.active().is_none());
}

#[tokio::test]
async fn manager_reconnects_to_a_different_backend() {
    let dir = TempDir::new().unwrap();
    let manager = ConnectionManager::new();

    manager
        .connect(BackendConfig::Memory { seeded: false })
        .await
        .unwrap();
    manager.disconnect().await;

    manager
        .connect(BackendConfig::JsonFile(JsonStoreConfig::new(dir.path())))
        .await
        .unwrap();
    assert_eq!(manager.state(), ConnectionState::Connected);
    assert_eq!(manager.config().map(|c| c.kind()), Some("jsonfile"));
}
