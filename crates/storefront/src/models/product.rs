//! Catalog product types.

use serde::{Deserialize, Serialize};

use mercadito_core::{Price, ProductId};

/// A catalog product.
///
/// Immutable from the storefront's perspective; admin CRUD is the only
/// writer. Cart lines and order items snapshot the price they observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Non-negative unit price.
    pub price: Price,
    /// Image URL for product cards.
    pub image_url: String,
    /// Category label (free-form).
    pub category: String,
    /// Whether the product is currently on sale.
    pub on_sale: bool,
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub on_sale: bool,
}
