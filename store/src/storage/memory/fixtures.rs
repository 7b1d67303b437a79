//! Demo dataset for the in-memory backend.
//!
//! Cross-references are consistent: order items point at real products,
//! warehouses, and the demo order; the payment settles that order in full;
//! expense warehouse names are the snapshot taken when they were written.

use shared::{
    CardDetails, Customer, Expense, Order, OrderItem, OrderStatus, Payment, PaymentMethod,
    PaymentStatus, Product, Warehouse,
};

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "p-1001".to_string(),
            name: "Steel shelving unit".to_string(),
            description: "Five-tier boltless shelving, 180x90cm".to_string(),
            price: 149.5,
            category: "Storage".to_string(),
            stock: 24,
        },
        Product {
            id: "p-1002".to_string(),
            name: "Pallet jack".to_string(),
            description: "Manual pallet truck, 2500kg capacity".to_string(),
            price: 289.0,
            category: "Handling".to_string(),
            stock: 8,
        },
        Product {
            id: "p-1003".to_string(),
            name: "Label printer".to_string(),
            description: "Thermal label printer, 300dpi".to_string(),
            price: 74.25,
            category: "Office".to_string(),
            stock: 31,
        },
        Product {
            id: "p-1004".to_string(),
            name: "Packing tape".to_string(),
            description: "Brown packing tape, box of 36 rolls".to_string(),
            price: 21.6,
            category: "Consumables".to_string(),
            stock: 140,
        },
    ]
}

pub fn customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "c-501".to_string(),
            name: "Maren Vos".to_string(),
            email: "maren.vos@example.com".to_string(),
            phone: "+31 10 555 0143".to_string(),
            address: "Veerhaven 12, Rotterdam".to_string(),
            created_at: "2025-02-18T10:42:00+00:00".to_string(),
        },
        Customer {
            id: "c-502".to_string(),
            name: "Jonas Lindqvist".to_string(),
            email: "jonas.lindqvist@example.com".to_string(),
            phone: "+46 31 555 0920".to_string(),
            address: "Packhusplatsen 4, Gothenburg".to_string(),
            created_at: "2025-03-02T14:05:00+00:00".to_string(),
        },
    ]
}

pub fn warehouses() -> Vec<Warehouse> {
    vec![
        Warehouse {
            id: "w-100".to_string(),
            name: "Central Depot".to_string(),
            location: "Rotterdam".to_string(),
            created_at: "2024-11-05T09:30:00+00:00".to_string(),
        },
        Warehouse {
            id: "w-200".to_string(),
            name: "North Annex".to_string(),
            location: "Hamburg".to_string(),
            created_at: "2025-01-20T08:15:00+00:00".to_string(),
        },
    ]
}

pub fn orders() -> Vec<Order> {
    vec![Order {
        id: "o-900".to_string(),
        customer_id: "c-501".to_string(),
        status: OrderStatus::Processing,
        total_amount: 373.25,
        created_at: "2025-03-12T09:15:00+00:00".to_string(),
    }]
}

pub fn order_items() -> Vec<OrderItem> {
    vec![
        OrderItem {
            id: "i-9001".to_string(),
            order_id: "o-900".to_string(),
            product_id: "p-1001".to_string(),
            quantity: 2,
            price: 149.5,
            subtotal: 299.0,
            warehouse_id: "w-100".to_string(),
        },
        OrderItem {
            id: "i-9002".to_string(),
            order_id: "o-900".to_string(),
            product_id: "p-1003".to_string(),
            quantity: 1,
            price: 74.25,
            subtotal: 74.25,
            warehouse_id: "w-200".to_string(),
        },
    ]
}

pub fn payments() -> Vec<Payment> {
    vec![Payment {
        id: "pay-700".to_string(),
        order_id: "o-900".to_string(),
        amount: 373.25,
        method: PaymentMethod::CreditCard,
        status: PaymentStatus::Completed,
        card_details: Some(CardDetails {
            last4: "4242".to_string(),
            expiry: "09/27".to_string(),
            brand: "visa".to_string(),
        }),
        created_at: "2025-03-12T09:16:30+00:00".to_string(),
    }]
}

pub fn expenses() -> Vec<Expense> {
    vec![
        Expense {
            id: "e-300".to_string(),
            title: "Forklift maintenance".to_string(),
            amount: 420.0,
            category: "maintenance".to_string(),
            warehouse_id: "w-100".to_string(),
            warehouse_name: "Central Depot".to_string(),
            expense_date: "2025-04-03T00:00:00+00:00".to_string(),
        },
        Expense {
            id: "e-301".to_string(),
            title: "Pallet restock".to_string(),
            amount: 96.5,
            category: "supplies".to_string(),
            warehouse_id: "w-200".to_string(),
            warehouse_name: "North Annex".to_string(),
            expense_date: "2025-04-11T00:00:00+00:00".to_string(),
        },
    ]
}
