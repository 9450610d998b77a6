//! Order domain types.
//!
//! Orders snapshot the prices observed at checkout time and are immutable
//! afterwards except for status transitions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercadito_core::{OrderId, OrderStatus, ProductId};

/// Customer details captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
}

/// A placed order (header).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line on a placed order, with the price captured at order time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_title: String,
    pub quantity: u32,
    /// Unit price at the time the order was placed.
    pub price: Decimal,
}

/// An order together with its line items, as returned by `GET /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Confirmation returned to the caller after a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    pub total: Decimal,
    pub shipping_cost: Decimal,
}
