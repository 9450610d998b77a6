//! Cart repository: the server-persisted side of cart reconciliation.
//!
//! Carts are stored as one row per owner key plus one row per line.
//! Lines reference live products; the aggregate total is recomputed on
//! load, never stored.

use rust_decimal::Decimal;
use sqlx::PgPool;

use mercadito_core::{Price, ProductId};

use super::RepositoryError;
use crate::cart::{Cart, CartItem, CartOwner, CartStore};
use crate::models::Product;

/// Database row for a cart line joined with its product.
#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: i32,
    quantity: i32,
    title: String,
    price: Decimal,
    image_url: String,
    category: String,
    on_sale: bool,
}

impl TryFrom<CartLineRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative cart quantity in database: {}",
                row.quantity
            ))
        })?;
        Ok(Self {
            product: Product {
                id: ProductId::new(row.product_id),
                title: row.title,
                price,
                image_url: row.image_url,
                category: row.category,
                on_sale: row.on_sale,
            },
            quantity,
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl CartStore for CartRepository<'_> {
    /// Load the persisted cart for an owner.
    ///
    /// Lines whose product has been deleted are dropped by the join; the
    /// total is recomputed from surviving lines.
    async fn load(&self, owner: &CartOwner) -> Result<Option<Cart>, RepositoryError> {
        let exists = sqlx::query_scalar::<_, i32>(
            r"
            SELECT 1 FROM carts WHERE owner = $1
            ",
        )
        .bind(owner.key())
        .fetch_optional(self.pool)
        .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT ci.product_id, ci.quantity,
                   p.title, p.price, p.image_url, p.category, p.on_sale
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_owner = $1
            ORDER BY ci.position ASC
            ",
        )
        .bind(owner.key())
        .fetch_all(self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let cart = Cart {
            items,
            total: Decimal::ZERO,
        };
        Ok(Some(cart.normalized()))
    }

    /// Replace the persisted cart with the given aggregate.
    ///
    /// A single transaction: upsert the cart row, delete old lines,
    /// insert the new ones in order.
    async fn save(&self, owner: &CartOwner, cart: &Cart) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO carts (owner)
            VALUES ($1)
            ON CONFLICT (owner) DO UPDATE SET updated_at = now()
            ",
        )
        .bind(owner.key())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            DELETE FROM cart_items WHERE cart_owner = $1
            ",
        )
        .bind(owner.key())
        .execute(&mut *tx)
        .await?;

        for (position, item) in cart.items.iter().enumerate() {
            let position = i32::try_from(position).unwrap_or(i32::MAX);
            sqlx::query(
                r"
                INSERT INTO cart_items (cart_owner, product_id, quantity, position)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(owner.key())
            .bind(item.product.id.as_i32())
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete the persisted cart and its lines.
    async fn clear(&self, owner: &CartOwner) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM carts WHERE owner = $1
            ",
        )
        .bind(owner.key())
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
