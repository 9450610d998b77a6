//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Session
//! cookies are signed with a key derived from the configured secret so
//! session ids cannot be forged client-side.

use cookie::Key;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mercadito_session";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store and signed cookies.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (session secret, cookie security)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Create the PostgreSQL session store
    // Note: The sessions table must be created via migration
    let store = PostgresStore::new(pool.clone());

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    // Key::derive_from needs at least 32 bytes; config enforces that
    // minimum when loading MERCADITO_SESSION_SECRET
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::OAuthConfig;

    fn test_config(secret: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().expect("addr"),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(secret),
            oauth: OAuthConfig {
                provider: "google".to_string(),
                client_id: "client_id".to_string(),
                client_secret: SecretString::from("client_secret"),
            },
            admin_emails: Vec::new(),
            sentry_dsn: None,
        }
    }

    #[tokio::test]
    async fn test_session_layer_derives_key_from_secret() {
        // connect_lazy opens no connection, so no database is needed
        let pool = PgPool::connect_lazy("postgres://localhost/unused").expect("lazy pool");
        let config = test_config(&"x".repeat(32));

        // Key derivation must accept any secret the config accepts
        let _layer = create_session_layer(&pool, &config);
    }
}
