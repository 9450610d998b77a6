//! Session-related types.
//!
//! Types stored in the session for authentication state and the
//! cart's local cache.

use serde::{Deserialize, Serialize};

use mercadito_core::{Email, Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name from the OAuth provider, if any.
    pub name: Option<String>,
    /// Access role resolved at sign-in.
    pub role: Role,
}

/// Session keys for authentication and cart data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the locally cached cart aggregate.
    pub const CART_CACHE: &str = "cart_cache";

    /// Key for the anonymous cart owner token.
    pub const CART_OWNER: &str = "cart_owner";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";
}
