//! OAuth sign-in route handlers.
//!
//! - Login: redirects to the provider's authorization page
//! - Callback: validates state, exchanges the code, upserts the user,
//!   records a login event
//! - Logout: clears the session identity and records a logout event

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use mercadito_core::{Email, Role, SessionAction};

use crate::cart::{Cart, CartOwner, CartReconciler, CartStore};
use crate::db::{CartRepository, SessionLogRepository, UserRepository};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Generate a cryptographically secure random string.
pub(crate) fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET.get(idx).copied().map(char::from)
        })
        .collect()
}

/// Initiate OAuth login.
///
/// Generates a state parameter, stores it in the session, and redirects
/// to the provider's authorization page.
///
/// # Route
///
/// `GET /auth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    let redirect_uri = format!("{}/auth/callback", state.config().base_url);
    let auth_url = state.oauth().authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code,
/// fetches the identity, upserts the user with a freshly resolved role,
/// and records a login event.
///
/// # Route
///
/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for OAuth errors from the provider
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("OAuth error: {} - {}", error, description);
        return Redirect::to("/?error=oauth_denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("OAuth callback missing state");
        return Redirect::to("/?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("OAuth state mismatch");
        return Redirect::to("/?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    let redirect_uri = format!("{}/auth/callback", state.config().base_url);

    let token = match state.oauth().exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return Redirect::to("/?error=token_exchange").into_response();
        }
    };

    let info = match state.oauth().userinfo(&token.access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Failed to fetch OAuth userinfo: {}", e);
            return Redirect::to("/?error=userinfo").into_response();
        }
    };

    let email = match Email::parse(&info.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("OAuth provider returned invalid email: {}", e);
            return Redirect::to("/?error=invalid_email").into_response();
        }
    };

    // Role is recomputed from the admin list on every sign-in
    let role = if state.config().is_admin_email(email.as_str()) {
        Role::Admin
    } else {
        Role::User
    };

    let user = match UserRepository::new(state.pool())
        .upsert_oauth_user(&email, info.name.as_deref(), role)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to upsert user on sign-in: {}", e);
            return Redirect::to("/?error=signin").into_response();
        }
    };

    adopt_anonymous_cart(&state, &session, CartOwner::User(user.id)).await;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    };

    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to store user in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    if let Err(e) = SessionLogRepository::new(state.pool())
        .record(user.id, SessionAction::Login, state.oauth().provider())
        .await
    {
        tracing::warn!("Failed to record login event: {}", e);
    }

    tracing::info!(user_id = %user.id, "User authenticated");

    Redirect::to("/dashboard").into_response()
}

/// Logout.
///
/// Clears the session identity, records a logout event, and redirects home.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let user: Option<CurrentUser> = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();

    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!("Failed to clear user from session: {}", e);
    }
    // The cached cart belongs to the signed-in identity
    let _ = session.remove::<Cart>(session_keys::CART_CACHE).await;

    clear_sentry_user();

    if let Some(user) = user {
        if let Err(e) = SessionLogRepository::new(state.pool())
            .record(user.id, SessionAction::Logout, state.oauth().provider())
            .await
        {
            tracing::warn!("Failed to record logout event: {}", e);
        }
        tracing::info!(user_id = %user.id, "User logged out");
    }

    Redirect::to("/").into_response()
}

/// Fold the visitor's anonymous cart into their user cart on sign-in.
///
/// Line quantities are merged; the anonymous rows and token are dropped
/// afterwards. Persistence failures are logged and otherwise ignored,
/// same as any other cart write.
async fn adopt_anonymous_cart(state: &AppState, session: &Session, user_owner: CartOwner) {
    let Ok(Some(token)) = session.get::<String>(session_keys::CART_OWNER).await else {
        return;
    };
    let anon_owner = CartOwner::Anonymous(token);

    let repo = CartRepository::new(state.pool());
    let reconciler = CartReconciler::new(session, &repo);

    let anon_cart = reconciler.get(&anon_owner).await;
    if !anon_cart.is_empty() {
        let mut merged = reconciler.get(&user_owner).await;
        merged.items.extend(anon_cart.items);
        reconciler.replace(&user_owner, merged).await;
    }

    // Drop the anonymous rows directly so the freshly merged cache survives
    if let Err(e) = CartStore::clear(&repo, &anon_owner).await {
        tracing::warn!("Failed to drop anonymous cart rows: {}", e);
    }
    let _ = session.remove::<String>(session_keys::CART_OWNER).await;
}
