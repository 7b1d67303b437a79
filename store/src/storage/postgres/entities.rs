//! Column metadata and row decoding for the relational backend.

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;

use shared::{Customer, Expense, Order, OrderItem, Payment, Product, Warehouse};

use crate::storage::traits::Entity;

/// How an entity maps onto its table: the column list (`id` first, doubling
/// as the filter/patch whitelist) and row decoding.
pub trait SqlRecord: Entity {
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &PgRow) -> Result<Self>;
}

impl SqlRecord for Product {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "description", "price", "category", "stock"];

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            stock: row.try_get("stock")?,
        })
    }
}

impl SqlRecord for Customer {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "email", "phone", "address", "created_at"];

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl SqlRecord for Order {
    const COLUMNS: &'static [&'static str] =
        &["id", "customer_id", "status", "total_amount", "created_at"];

    fn from_row(row: &PgRow) -> Result<Self> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            status: status.parse().map_err(anyhow::Error::msg)?,
            total_amount: row.try_get("total_amount")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl SqlRecord for OrderItem {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_id",
        "product_id",
        "quantity",
        "price",
        "subtotal",
        "warehouse_id",
    ];

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
            subtotal: row.try_get("subtotal")?,
            warehouse_id: row.try_get("warehouse_id")?,
        })
    }
}

impl SqlRecord for Payment {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_id",
        "amount",
        "method",
        "status",
        "card_details",
        "created_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self> {
        let method: String = row.try_get("method")?;
        let status: String = row.try_get("status")?;
        let card_details = match row.try_get::<Option<String>, _>("card_details")? {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            amount: row.try_get("amount")?,
            method: method.parse().map_err(anyhow::Error::msg)?,
            status: status.parse().map_err(anyhow::Error::msg)?,
            card_details,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl SqlRecord for Warehouse {
    const COLUMNS: &'static [&'static str] = &["id", "name", "location", "created_at"];

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl SqlRecord for Expense {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "amount",
        "category",
        "warehouse_id",
        "warehouse_name",
        "expense_date",
    ];

    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            amount: row.try_get("amount")?,
            category: row.try_get("category")?,
            warehouse_id: row.try_get("warehouse_id")?,
            warehouse_name: row.try_get("warehouse_name")?,
            expense_date: row.try_get("expense_date")?,
        })
    }
}
