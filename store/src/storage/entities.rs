//! Wires the shared record types into the storage contract.
//!
//! Write-time invariants live here rather than in the backends: full-record
//! checks run at insert, and only the non-negativity class of invariant is
//! re-checked after a patch is merged. An order item's subtotal is checked
//! against price x quantity when the line is first written, but a partial
//! update that changes quantity alone is accepted as-is; keeping the derived
//! field consistent is the caller's job.

use shared::{Customer, Expense, Order, OrderItem, Payment, PaymentMethod, Product, Warehouse};

use super::traits::Entity;

const SUBTOTAL_TOLERANCE: f64 = 1e-6;

impl Entity for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate_insert(&self) -> Result<(), String> {
        self.validate_update()
    }

    fn validate_update(&self) -> Result<(), String> {
        if self.price < 0.0 {
            return Err(format!("product price cannot be negative: {}", self.price));
        }
        if self.stock < 0 {
            return Err(format!("product stock cannot be negative: {}", self.stock));
        }
        Ok(())
    }
}

impl Entity for Customer {
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Entity for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Entity for OrderItem {
    const COLLECTION: &'static str = "order_items";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate_insert(&self) -> Result<(), String> {
        self.validate_update()?;
        let expected = self.price * self.quantity as f64;
        if (self.subtotal - expected).abs() > SUBTOTAL_TOLERANCE {
            return Err(format!(
                "order item subtotal {} does not equal price x quantity ({expected})",
                self.subtotal
            ));
        }
        Ok(())
    }

    fn validate_update(&self) -> Result<(), String> {
        if self.quantity < 1 {
            return Err(format!("order item quantity must be at least 1: {}", self.quantity));
        }
        Ok(())
    }
}

impl Entity for Payment {
    const COLLECTION: &'static str = "payments";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate_insert(&self) -> Result<(), String> {
        self.validate_update()
    }

    fn validate_update(&self) -> Result<(), String> {
        if self.card_details.is_some() && self.method != PaymentMethod::CreditCard {
            return Err(format!(
                "card details are only valid on credit card payments, not {}",
                self.method
            ));
        }
        Ok(())
    }
}

impl Entity for Warehouse {
    const COLLECTION: &'static str = "warehouses";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Entity for Expense {
    const COLLECTION: &'static str = "expenses";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate_insert(&self) -> Result<(), String> {
        self.validate_update()
    }

    fn validate_update(&self) -> Result<(), String> {
        if self.amount <= 0.0 {
            return Err(format!("expense amount must be positive: {}", self.amount));
        }
        Ok(())
    }
}
