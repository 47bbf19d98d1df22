//! Session repository backing issued auth tokens.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mercantia_core::UserId;

use super::RepositoryError;
use crate::models::user::SessionRecord;

/// Repository for server-side session rows.
///
/// A session row must exist for a token to be accepted, so deleting the
/// row revokes the token even before its signature expires.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a newly issued token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<SessionRecord, RepositoryError> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "INSERT INTO sessions (user_id, token, expires_at, user_agent, ip_address) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, token, expires_at, user_agent, ip_address, created_at",
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .bind(user_agent)
        .bind(ip_address)
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }

    /// Look up a session by its token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<SessionRecord>, RepositoryError> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, token, expires_at, user_agent, ip_address, created_at \
             FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(session)
    }

    /// Delete a session by token. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_token(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove sessions past their expiry. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
