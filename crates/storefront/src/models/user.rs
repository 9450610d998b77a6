//! User domain types.
//!
//! Users are created or refreshed on every OAuth sign-in; the role is
//! recomputed from the configured admin email list at that point.

use chrono::{DateTime, Utc};

use mercadito_core::{Email, Role, UserId};

/// A storefront user.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (identity key).
    pub email: Email,
    /// Display name from the OAuth provider, if any.
    pub name: Option<String>,
    /// Access role resolved at sign-in.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
