//! OAuth 2.0 sign-in client.
//!
//! Talks to Google's OAuth endpoints by default; the provider name is
//! configurable and recorded in the session log with each event.
//!
//! # Flow
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Redirect the visitor to the provider's consent page
//! 3. The provider redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Fetch the signed-in identity with `userinfo()`

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::OAuthConfig;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the OAuth sign-in flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("oauth error: {0}")]
    Provider(String),

    /// The callback state did not match the session.
    #[error("state mismatch in oauth callback")]
    StateMismatch,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Access token obtained from a code exchange.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub obtained_at: i64,
}

/// Identity claims returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Client for the OAuth provider.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    client: reqwest::Client,
    provider: String,
    client_id: String,
    client_secret: String,
}

impl OAuthClient {
    /// Create a new OAuth client.
    #[must_use]
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                client: reqwest::Client::new(),
                provider: config.provider.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
            }),
        }
    }

    /// The provider name recorded in the session log.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.inner.provider
    }

    /// Generate the authorization URL for sign-in.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after consent
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTHORIZE_ENDPOINT}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider(format!(
                "Token exchange failed: {text}"
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(AccessToken {
            access_token: token_response.access_token,
            expires_in: token_response.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Fetch the signed-in identity for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the userinfo request fails.
    pub async fn userinfo(&self, access_token: &str) -> Result<UserInfo, OAuthError> {
        let response = self
            .inner
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider(format!(
                "Userinfo request failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client() -> OAuthClient {
        OAuthClient::new(&OAuthConfig {
            provider: "google".to_string(),
            client_id: "client-123".to_string(),
            client_secret: SecretString::from("secret"),
        })
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let url = client().authorization_url("https://shop.test/auth/callback", "st&ate");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fshop.test%2Fauth%2Fcallback"));
        assert!(url.contains("state=st%26ate"));
        assert!(url.contains("scope=openid%20email%20profile"));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(client().provider(), "google");
    }
}
