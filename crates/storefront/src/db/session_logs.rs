//! Session log repository: the append-only login/logout trail.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mercadito_core::{Role, SessionAction, SessionLogId, UserId};

use super::RepositoryError;
use crate::models::SessionLogEntry;

/// How many entries the admin dashboard shows at most.
const RECENT_LIMIT: i64 = 200;

/// Database row for a session log entry joined with its user.
#[derive(sqlx::FromRow)]
struct SessionLogRow {
    id: i32,
    user_id: i32,
    email: String,
    name: Option<String>,
    role: String,
    action: String,
    provider: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<SessionLogRow> for SessionLogEntry {
    type Error = RepositoryError;

    fn try_from(row: SessionLogRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;
        let action = SessionAction::from_str(&row.action).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid session action in database: {e}"))
        })?;
        Ok(Self {
            id: SessionLogId::new(row.id),
            user_id: UserId::new(row.user_id),
            email: row.email,
            name: row.name,
            role,
            action,
            provider: row.provider,
            timestamp: row.timestamp,
        })
    }
}

/// Repository for session log database operations.
pub struct SessionLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionLogRepository<'a> {
    /// Create a new session log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one login or logout event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(
        &self,
        user_id: UserId,
        action: SessionAction,
        provider: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO session_logs (user_id, action, provider)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.as_i32())
        .bind(action.as_str())
        .bind(provider)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// The most recent entries, newest first, joined with their users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored role or
    /// action is invalid.
    pub async fn list_recent(&self) -> Result<Vec<SessionLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionLogRow>(
            r"
            SELECT sl.id, sl.user_id, sl.action, sl.provider, sl.timestamp,
                   u.email, u.name, u.role
            FROM session_logs sl
            JOIN users u ON u.id = sl.user_id
            ORDER BY sl.timestamp DESC
            LIMIT $1
            ",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SessionLogEntry::try_from).collect()
    }
}
