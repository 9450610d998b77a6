//! Order repository for checkout and order history.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mercadito_core::{OrderId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderReceipt, OrderWithItems};
use crate::services::orders::OrderDraft;

/// Database row for an order header.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_name: String,
    customer_email: String,
    customer_address: String,
    subtotal: Decimal,
    shipping_cost: Decimal,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        Ok(Self {
            id: OrderId::new(row.id),
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_address: row.customer_address,
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            total: row.total,
            status,
            created_at: row.created_at,
        })
    }
}

/// Database row for an order line. The title is the snapshot captured
/// at checkout, not the live product title.
#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    product_id: i32,
    product_title: String,
    quantity: i32,
    price: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines in one transaction.
    ///
    /// The draft already carries captured prices and computed totals;
    /// this is a plain write with status `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; the
    /// transaction rolls back as a whole.
    pub async fn create(&self, draft: &OrderDraft) -> Result<OrderReceipt, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO orders
                (customer_name, customer_email, customer_address,
                 subtotal, shipping_cost, total, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&draft.customer.customer_name)
        .bind(&draft.customer.customer_email)
        .bind(&draft.customer.customer_address)
        .bind(draft.subtotal)
        .bind(draft.shipping_cost)
        .bind(draft.total)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, product_title, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(line.product_id.as_i32())
            .bind(&line.product_title)
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderReceipt {
            id: OrderId::new(order_id),
            total: draft.total,
            shipping_cost: draft.shipping_cost,
        })
    }

    /// List all orders with their line items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is invalid.
    pub async fn list(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let order_rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_name, customer_email, customer_address,
                   subtotal, shipping_cost, total, status, created_at
            FROM orders
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = order_rows.iter().map(|row| row.id).collect();

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, product_title, quantity, price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            let quantity = u32::try_from(row.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "negative order quantity in database: {}",
                    row.quantity
                ))
            })?;
            items_by_order
                .entry(row.order_id)
                .or_default()
                .push(OrderItem {
                    product_id: ProductId::new(row.product_id),
                    product_title: row.product_title,
                    quantity,
                    price: row.price,
                });
        }

        order_rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                Ok(OrderWithItems {
                    order: Order::try_from(row)?,
                    items,
                })
            })
            .collect()
    }
}
