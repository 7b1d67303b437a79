//! Shared data types for the stockdesk admin console.
//!
//! Every record carries an opaque string `id`, unique within its collection,
//! assigned by the store at insert time and immutable afterwards. Date and
//! time fields are RFC 3339 strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current time as an RFC 3339 string, the format every date field uses.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unit price; never negative.
    pub price: f64,
    pub category: String,
    /// Units on hand; never negative after a store-level update.
    pub stock: i64,
}

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Uniqueness is a form-level concern, not enforced by the store.
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: String,
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    /// Sum of the item subtotals at creation time. Not recomputed when items
    /// change afterwards.
    pub total_amount: f64,
    pub created_at: String,
}

/// A single line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// At least 1.
    pub quantity: i64,
    /// Unit price captured when the line was written.
    pub price: f64,
    /// price x quantity at write time. Partial updates do not recompute it;
    /// keeping it consistent is the caller's job.
    pub subtotal: f64,
    /// Warehouse the line ships from.
    pub warehouse_id: String,
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "paypal" => Ok(PaymentMethod::Paypal),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Card summary attached to a credit card payment. Never the full PAN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardDetails {
    pub last4: String,
    pub expiry: String,
    pub brand: String,
}

/// A payment against an order. By convention at most one non-refunded payment
/// exists per order; the store does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Present only when method is `credit_card`.
    pub card_details: Option<CardDetails>,
    pub created_at: String,
}

/// A stock location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub created_at: String,
}

/// An operating expense booked against a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: String,
    pub title: String,
    /// Strictly positive.
    pub amount: f64,
    pub category: String,
    pub warehouse_id: String,
    /// Snapshot of the warehouse name when the expense was written. Renaming
    /// the warehouse later does not update it.
    pub warehouse_name: String,
    pub expense_date: String,
}

/// An order joined with its lines, payment, and customer: the one composite
/// read the store exposes beyond plain CRUD.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<Payment>,
    pub customer: Option<Customer>,
}
