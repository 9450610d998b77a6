//! Cart aggregate and reconciliation.
//!
//! The cart is an ordered collection of lines, one per product, with a
//! derived total. The aggregate here is pure; [`reconciler`] layers the
//! session-local cache and the persistent store on top of it.

pub mod reconciler;

pub use reconciler::{CartReconciler, CartStore};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercadito_core::{ProductId, UserId};

use crate::models::Product;

/// One cart line: a product snapshot and a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.line_total(self.quantity)
    }
}

/// The cart aggregate for one identity.
///
/// Invariants maintained by the mutating methods (and restored by
/// [`Cart::normalized`] for untrusted input):
/// - at most one line per product id
/// - every line has quantity > 0
/// - `total` equals the sum of line totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Decimal,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line if the product is already in the cart,
    /// otherwise appends a new line with quantity 1.
    pub fn add(&mut self, product: Product) {
        match self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                // Refresh the snapshot so the line reflects the price observed now
                item.product = product;
            }
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
        self.recompute_total();
    }

    /// Set the quantity of a line; zero or negative removes it.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        {
            item.quantity = quantity;
            self.recompute_total();
        }
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product.id != product_id);
        self.recompute_total();
    }

    /// Restore the aggregate invariants on untrusted input.
    ///
    /// Drops non-positive lines, coalesces duplicate product ids (keeping
    /// the first line's snapshot and summing quantities), and recomputes
    /// the total, ignoring whatever total the input carried.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut items: Vec<CartItem> = Vec::with_capacity(self.items.len());
        for incoming in self.items {
            if incoming.quantity == 0 {
                continue;
            }
            match items
                .iter_mut()
                .find(|item| item.product.id == incoming.product.id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(incoming.quantity);
                }
                None => items.push(incoming),
            }
        }
        let mut cart = Self {
            items,
            total: Decimal::ZERO,
        };
        cart.recompute_total();
        cart
    }

    fn recompute_total(&mut self) {
        self.total = self.items.iter().map(CartItem::line_total).sum();
    }
}

/// The identity a cart belongs to.
///
/// Signed-in users own their cart by user id; anonymous visitors by a
/// random token held in their session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    User(UserId),
    Anonymous(String),
}

impl CartOwner {
    /// Storage key for the persistent cart row.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Anonymous(token) => format!("session:{token}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercadito_core::Price;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::new(Decimal::new(cents, 2)).expect("non-negative"),
            image_url: String::new(),
            category: "test".to_string(),
            on_sale: false,
        }
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[test]
    fn test_add_new_product_appends_line() {
        let mut cart = Cart::empty();
        cart.add(product(1, 1999));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, Decimal::new(1999, 2));
    }

    #[test]
    fn test_add_same_product_twice_merges_lines() {
        let mut cart = Cart::empty();
        cart.add(product(1, 1999));
        cart.add(product(1, 1999));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|i| i.quantity), Some(2));
        assert_eq!(cart.total, Decimal::new(3998, 2));
    }

    #[test]
    fn test_total_tracks_mutations() {
        let mut cart = Cart::empty();
        cart.add(product(1, 1000));
        cart.add(product(2, 250));
        cart.set_quantity(ProductId::new(1), 3);
        cart.remove(ProductId::new(2));
        cart.add(product(2, 250));

        let expected: Decimal = cart.items.iter().map(CartItem::line_total).sum();
        assert_eq!(cart.total, expected);
        assert_eq!(cart.total, Decimal::new(3250, 2));
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::empty();
        cart.add(product(1, 500));
        cart.set_quantity(ProductId::new(1), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_negative_removes_line() {
        let mut cart = Cart::empty();
        cart.add(product(1, 500));
        cart.set_quantity(ProductId::new(1), -2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_product_is_noop() {
        let mut cart = Cart::empty();
        cart.add(product(1, 500));
        cart.set_quantity(ProductId::new(99), 5);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_normalized_coalesces_duplicates_and_drops_zero() {
        let dirty = Cart {
            items: vec![
                CartItem {
                    product: product(1, 1000),
                    quantity: 1,
                },
                CartItem {
                    product: product(2, 300),
                    quantity: 0,
                },
                CartItem {
                    product: product(1, 1000),
                    quantity: 2,
                },
            ],
            // Bogus total supplied by the client; must be ignored
            total: Decimal::new(99999, 2),
        };

        let cart = dirty.normalized();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total, Decimal::new(3000, 2));
    }

    #[test]
    fn test_owner_keys_are_disjoint() {
        let user = CartOwner::User(UserId::new(7));
        let anon = CartOwner::Anonymous("7".to_string());
        assert_eq!(user.key(), "user:7");
        assert_eq!(anon.key(), "session:7");
        assert_ne!(user.key(), anon.key());
    }
}
