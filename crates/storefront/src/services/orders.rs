//! The order writer.
//!
//! Converts a cart snapshot into an immutable order draft at checkout
//! time. Prices are captured from the cart lines as they are now - a
//! later change to the live product price does not touch placed orders.

use rust_decimal::Decimal;
use thiserror::Error;

use mercadito_core::ProductId;

use crate::cart::Cart;
use crate::models::CustomerInfo;

/// Flat shipping charge added to every order.
#[must_use]
pub fn shipping_cost() -> Decimal {
    Decimal::new(1000, 2)
}

/// Errors reported to the caller when a checkout is rejected.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Orders require at least one line.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,
}

/// One line of an order draft, title and price captured at draft time.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_title: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// A validated, fully priced order ready for a single insert.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer: CustomerInfo,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

impl OrderDraft {
    /// Build a draft from the caller's current cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] if the cart has no lines.
    pub fn from_cart(cart: &Cart, customer: CustomerInfo) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let lines: Vec<OrderLine> = cart
            .items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id,
                product_title: item.product.title.clone(),
                quantity: item.quantity,
                price: item.product.price.amount(),
            })
            .collect();

        let subtotal: Decimal = lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        let shipping_cost = shipping_cost();

        Ok(Self {
            customer,
            lines,
            subtotal,
            shipping_cost,
            total: subtotal + shipping_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::models::Product;
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

    fn customer() -> CustomerInfo {
        CustomerInfo {
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
            customer_address: "Calle Falsa 123".to_string(),
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let result = OrderDraft::from_cart(&Cart::empty(), customer());
        assert!(matches!(result, Err(OrderError::EmptyCart)));
    }

    #[test]
    fn test_total_is_subtotal_plus_shipping() {
        let mut cart = Cart::empty();
        cart.add(product(1, 1999));
        cart.add(product(1, 1999));
        cart.add(product(2, 500));

        let draft = OrderDraft::from_cart(&cart, customer()).expect("non-empty cart");
        assert_eq!(draft.subtotal, Decimal::new(4498, 2));
        assert_eq!(draft.shipping_cost, Decimal::new(1000, 2));
        assert_eq!(draft.total, Decimal::new(5498, 2));
    }

    #[test]
    fn test_prices_are_captured_at_draft_time() {
        let mut cart = Cart::empty();
        cart.add(product(1, 1000));

        let draft = OrderDraft::from_cart(&cart, customer()).expect("non-empty cart");

        // Live price changes after drafting must not affect the snapshot
        let mut later_cart = Cart::empty();
        later_cart.add(product(1, 9900));

        assert_eq!(
            draft.lines.first().map(|l| l.price),
            Some(Decimal::new(1000, 2))
        );
        assert_eq!(draft.total, Decimal::new(2000, 2));
    }
}
