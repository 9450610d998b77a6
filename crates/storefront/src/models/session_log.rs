//! Session log types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercadito_core::{Role, SessionAction, SessionLogId, UserId};

/// One row of the append-only login/logout log, joined with the user
/// it belongs to, as shown on the admin log dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct SessionLogEntry {
    pub id: SessionLogId,
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub action: SessionAction,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}
