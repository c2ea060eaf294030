//! Server-side login sessions
//!
//! The cookie carries only an opaque token; the user is resolved here on
//! every request so revoked or expired sessions stop working immediately.

use chrono::Utc;
use sqlx::SqlitePool;

use super::{DbError, User};

/// A freshly created session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: i64,
}

pub struct SessionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store `token` for `user_id`, valid for `ttl_secs`.
    pub async fn create(&self, token: &str, user_id: i64, ttl_secs: i64) -> Result<Session, DbError> {
        let now = Utc::now().timestamp();
        let expires_at = now.saturating_add(ttl_secs);

        sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(now)
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(Session {
            token: token.to_owned(),
            user_id,
            expires_at,
        })
    }

    /// User owning a live session, if any.
    pub async fn find_user(&self, token: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.is_admin, u.email
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ? AND s.expires_at > ?
            "#,
        )
        .bind(token)
        .bind(Utc::now().timestamp())
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    pub async fn delete(&self, token: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Drop expired sessions, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().timestamp())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
