//! Signed-in landing pages and the access denied page.

use axum::{Json, extract::Query, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::middleware::RequireAuth;
use crate::models::CurrentUser;

/// Query parameters for the denied page.
#[derive(Debug, Deserialize)]
pub struct DeniedQuery {
    /// Denial reason set by the access gate redirect.
    #[serde(rename = "type")]
    pub reason: Option<String>,
}

/// Access denied page.
///
/// # Route
///
/// `GET /denied`
pub async fn denied(Query(query): Query<DeniedQuery>) -> (StatusCode, Json<Value>) {
    let reason = query
        .reason
        .unwrap_or_else(|| "access_denied".to_string());
    let message = if reason == "insufficient_permissions" {
        "You do not have permission to view this page"
    } else {
        "Access denied"
    };

    (
        StatusCode::FORBIDDEN,
        Json(json!({ "success": false, "type": reason, "message": message })),
    )
}

/// Signed-in landing data.
///
/// # Route
///
/// `GET /dashboard`
pub async fn dashboard(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

/// Signed-in profile data.
///
/// # Route
///
/// `GET /profile`
pub async fn profile(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
