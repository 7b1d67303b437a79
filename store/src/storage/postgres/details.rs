//! Composite order read as one join-and-aggregate query.

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;

use shared::{Customer, Order, OrderDetails, OrderItem, Payment};

use super::connection::PgConnection;

/// The order with its items, payment, and customer in a single round trip:
/// orders joined against order_items (one row per line), payments (left, at
/// most one non-refunded by convention), and customers (left).
pub(crate) async fn order_with_details(
    connection: &PgConnection,
    order_id: &str,
) -> Result<Option<OrderDetails>> {
    let sql = r#"
        SELECT
            o.id, o.customer_id, o.status, o.total_amount, o.created_at,
            i.id AS item_id, i.product_id AS item_product_id,
            i.quantity AS item_quantity, i.price AS item_price,
            i.subtotal AS item_subtotal, i.warehouse_id AS item_warehouse_id,
            p.id AS payment_id, p.amount AS payment_amount,
            p.method AS payment_method, p.status AS payment_status,
            p.card_details AS payment_card_details,
            p.created_at AS payment_created_at,
            c.id AS customer_row_id, c.name AS customer_name,
            c.email AS customer_email, c.phone AS customer_phone,
            c.address AS customer_address, c.created_at AS customer_created_at
        FROM orders o
        LEFT JOIN order_items i ON i.order_id = o.id
        LEFT JOIN payments p ON p.order_id = o.id
        LEFT JOIN customers c ON c.id = o.customer_id
        WHERE o.id = $1
        ORDER BY i.id
    "#;

    let rows = connection
        .bounded(
            sqlx::query(sql)
                .bind(order_id.to_string())
                .fetch_all(connection.pool()),
        )
        .await?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let order = decode_order(first)?;
    let payment = decode_payment(first, &order.id)?;
    let customer = decode_customer(first)?;

    let mut items = Vec::new();
    for row in &rows {
        if let Some(item) = decode_item(row, &order.id)? {
            items.push(item);
        }
    }

    Ok(Some(OrderDetails {
        order,
        items,
        payment,
        customer,
    }))
}

fn decode_order(row: &PgRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        status: status.parse().map_err(anyhow::Error::msg)?,
        total_amount: row.try_get("total_amount")?,
        created_at: row.try_get("created_at")?,
    })
}

fn decode_item(row: &PgRow, order_id: &str) -> Result<Option<OrderItem>> {
    let Some(id) = row.try_get::<Option<String>, _>("item_id")? else {
        return Ok(None);
    };
    Ok(Some(OrderItem {
        id,
        order_id: order_id.to_string(),
        product_id: row.try_get("item_product_id")?,
        quantity: row.try_get("item_quantity")?,
        price: row.try_get("item_price")?,
        subtotal: row.try_get("item_subtotal")?,
        warehouse_id: row.try_get("item_warehouse_id")?,
    }))
}

fn decode_payment(row: &PgRow, order_id: &str) -> Result<Option<Payment>> {
    let Some(id) = row.try_get::<Option<String>, _>("payment_id")? else {
        return Ok(None);
    };
    let method: String = row.try_get("payment_method")?;
    let status: String = row.try_get("payment_status")?;
    let card_details = match row.try_get::<Option<String>, _>("payment_card_details")? {
        Some(raw) => Some(serde_json::from_str(&raw)?),
        None => None,
    };
    Ok(Some(Payment {
        id,
        order_id: order_id.to_string(),
        amount: row.try_get("payment_amount")?,
        method: method.parse().map_err(anyhow::Error::msg)?,
        status: status.parse().map_err(anyhow::Error::msg)?,
        card_details,
        created_at: row.try_get("payment_created_at")?,
    }))
}

fn decode_customer(row: &PgRow) -> Result<Option<Customer>> {
    let Some(id) = row.try_get::<Option<String>, _>("customer_row_id")? else {
        return Ok(None);
    };
    Ok(Some(Customer {
        id,
        name: row.try_get("customer_name")?,
        email: row.try_get("customer_email")?,
        phone: row.try_get("customer_phone")?,
        address: row.try_get("customer_address")?,
        created_at: row.try_get("customer_created_at")?,
    }))
}
