//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use mercadito_core::ProductId;

use crate::error::{AppError, Result};
use crate::models::{Product, ProductInput};
use crate::state::AppState;

/// List the whole catalog.
///
/// # Route
///
/// `GET /products`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list().await?;
    Ok(Json(products.as_ref().clone()))
}

/// Show one product.
///
/// # Route
///
/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let id = ProductId::new(id);
    let product = state
        .catalog()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// Create a product.
///
/// # Route
///
/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product.
///
/// # Route
///
/// `PUT /products/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let product = state.catalog().update(ProductId::new(id), &input).await?;
    Ok(Json(product))
}

/// Delete a product.
///
/// # Route
///
/// `DELETE /products/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    state.catalog().delete(ProductId::new(id)).await?;
    Ok(Json(json!({ "success": true })))
}
