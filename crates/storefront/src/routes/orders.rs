//! Order route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::cart::CartReconciler;
use crate::db::{CartRepository, OrderRepository};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{CustomerInfo, OrderWithItems};
use crate::services::orders::OrderDraft;
use crate::state::AppState;

/// Order history, newest first.
///
/// # Route
///
/// `GET /orders`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<OrderWithItems>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// Place an order from the caller's current cart.
///
/// The server reads the reconciled cart itself; the body carries only
/// the customer details. The cart is emptied once the order is written.
///
/// # Route
///
/// `POST /orders`
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(customer): Json<CustomerInfo>,
) -> Result<(StatusCode, Json<Value>)> {
    let owner = super::cart::resolve_owner(&session, user.as_ref()).await;
    let repo = CartRepository::new(state.pool());
    let reconciler = CartReconciler::new(&session, &repo);

    let cart = reconciler.get(&owner).await;
    let draft = OrderDraft::from_cart(&cart, customer)?;

    let receipt = OrderRepository::new(state.pool()).create(&draft).await?;

    reconciler.clear(&owner).await;
    tracing::info!(order_id = %receipt.id, "Order placed");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": receipt })),
    ))
}
