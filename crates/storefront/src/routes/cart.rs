//! Cart route handlers.
//!
//! Every handler resolves the caller's cart owner key first: the user ID
//! for signed-in visitors, or a random session-scoped token for
//! anonymous ones.

use axum::{
    Json,
    extract::State,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use mercadito_core::ProductId;

use crate::cart::{Cart, CartOwner, CartReconciler};
use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Request body for adding a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: i32,
}

/// Request body for setting a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub product_id: i32,
    pub quantity: i64,
}

/// Resolve the cart owner key for this request.
///
/// Signed-in users own their cart by user ID; anonymous visitors get a
/// random token minted once per session.
pub(crate) async fn resolve_owner(session: &Session, user: Option<&CurrentUser>) -> CartOwner {
    if let Some(user) = user {
        return CartOwner::User(user.id);
    }

    if let Ok(Some(token)) = session.get::<String>(session_keys::CART_OWNER).await {
        return CartOwner::Anonymous(token);
    }

    let token = super::auth::generate_random_string(32);
    if let Err(e) = session.insert(session_keys::CART_OWNER, &token).await {
        tracing::warn!("Failed to store anonymous cart token: {e}");
    }
    CartOwner::Anonymous(token)
}

/// Current reconciled cart.
///
/// # Route
///
/// `GET /cart`
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Cart>> {
    let owner = resolve_owner(&session, user.as_ref()).await;
    let repo = CartRepository::new(state.pool());
    let cart = CartReconciler::new(&session, &repo).get(&owner).await;
    Ok(Json(cart))
}

/// Overwrite the whole cart with a client-supplied aggregate.
///
/// # Route
///
/// `POST /cart`
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(cart): Json<Cart>,
) -> Result<Json<Value>> {
    let owner = resolve_owner(&session, user.as_ref()).await;
    let repo = CartRepository::new(state.pool());
    let cart = CartReconciler::new(&session, &repo)
        .replace(&owner, cart)
        .await;
    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// Add one unit of a product.
///
/// # Route
///
/// `POST /cart/add`
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<AddRequest>,
) -> Result<Json<Value>> {
    let id = ProductId::new(request.product_id);
    let product = state
        .catalog()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let owner = resolve_owner(&session, user.as_ref()).await;
    let repo = CartRepository::new(state.pool());
    let cart = CartReconciler::new(&session, &repo)
        .add(&owner, product)
        .await;
    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// Set a line's quantity; zero or negative removes the line.
///
/// # Route
///
/// `POST /cart/update`
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    let owner = resolve_owner(&session, user.as_ref()).await;
    let repo = CartRepository::new(state.pool());
    let cart = CartReconciler::new(&session, &repo)
        .set_quantity(&owner, ProductId::new(request.product_id), request.quantity)
        .await;
    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// Empty the cart.
///
/// # Route
///
/// `POST /cart/clear`
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Value>> {
    let owner = resolve_owner(&session, user.as_ref()).await;
    let repo = CartRepository::new(state.pool());
    CartReconciler::new(&session, &repo).clear(&owner).await;
    Ok(Json(json!({ "success": true })))
}
