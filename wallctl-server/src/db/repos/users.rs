//! User accounts

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use wallctl_core::models::{Email, Username};

use super::DbError;

/// User as seen by handlers (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub email: Option<String>,
}

/// Row for the admin dashboard
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub email: Option<String>,
    pub wallpaper_count: i64,
    pub collection_count: i64,
}

#[derive(FromRow)]
struct CredentialRow {
    id: i64,
    username: String,
    is_admin: bool,
    email: Option<String>,
    password_hash: String,
}

pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken username yields `DbError::Conflict`.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        is_admin: bool,
        email: Option<&Email>,
    ) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, is_admin, email)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, is_admin, email
            "#,
        )
        .bind(username.as_str())
        .bind(password_hash)
        .bind(is_admin)
        .bind(email.map(Email::as_str))
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::unique(e, "username"))?;

        tracing::info!(user_id = user.id, username = %user.username, is_admin, "user created");
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        sqlx::query_as::<_, User>("SELECT id, username, is_admin, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// User plus stored password hash, for login.
    pub async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>, DbError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, is_admin, email, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    username: r.username,
                    is_admin: r.is_admin,
                    email: r.email,
                },
                r.password_hash,
            )
        }))
    }

    pub async fn exists(&self, username: &str) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// All users with ownership counts, in id order.
    pub async fn list_with_counts(&self) -> Result<Vec<UserSummary>, DbError> {
        let rows = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT
                u.id,
                u.username,
                u.is_admin,
                u.email,
                (SELECT COUNT(*) FROM wallpapers w WHERE w.user_id = u.id) AS wallpaper_count,
                (SELECT COUNT(*) FROM collections c WHERE c.user_id = u.id) AS collection_count
            FROM users u
            ORDER BY u.id
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Replace a user's password hash.
    pub async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        Ok(())
    }
}
