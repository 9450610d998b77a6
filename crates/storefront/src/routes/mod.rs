//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Products
//! GET    /products             - Catalog listing
//! POST   /products             - Create product
//! GET    /products/{id}        - Product detail
//! PUT    /products/{id}        - Update product
//! DELETE /products/{id}        - Delete product
//!
//! # Cart
//! GET  /cart                   - Reconciled cart
//! POST /cart                   - Full-cart save (overwrite)
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set a line's quantity
//! POST /cart/clear             - Empty the cart
//!
//! # Orders
//! GET  /orders                 - Order history (newest first)
//! POST /orders                 - Place an order from the current cart
//!
//! # Auth
//! GET  /auth/login             - Redirect to the OAuth provider
//! GET  /auth/callback          - Handle OAuth callback
//! POST /auth/logout            - Logout action
//!
//! # Gated
//! GET  /logs                   - Session log dashboard (admin)
//! GET  /dashboard              - Signed-in landing data
//! GET  /profile                - Signed-in profile data
//! GET  /denied                 - Access denied page (public)
//! ```

pub mod auth;
pub mod cart;
pub mod logs;
pub mod orders;
pub mod pages;
pub mod products;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::middleware::gate;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::save))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/clear", post(cart::clear))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", get(orders::index).post(orders::create))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    // Paths behind the access gate; the gate itself decides per path
    let gated = Router::new()
        .route("/logs", get(logs::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", get(pages::profile))
        .route_layer(from_fn(gate::enforce_access));

    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/auth", auth_routes())
        .route("/denied", get(pages::denied))
        .merge(gated)
}
