//! Admin session log dashboard.

use axum::{Json, extract::State};

use crate::db::SessionLogRepository;
use crate::error::Result;
use crate::models::SessionLogEntry;
use crate::state::AppState;

/// Recent login/logout events, newest first, capped at 200.
///
/// The access gate already restricts this path to admins.
///
/// # Route
///
/// `GET /logs`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<SessionLogEntry>>> {
    let entries = SessionLogRepository::new(state.pool()).list_recent().await?;
    Ok(Json(entries))
}
