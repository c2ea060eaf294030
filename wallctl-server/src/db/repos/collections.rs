//! Personal collections and their wallpaper membership

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use wallctl_core::models::CollectionName;

use super::DbError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// Collection with its member count, for dashboards
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CollectionSummary {
    pub id: i64,
    pub name: String,
    pub wallpaper_count: i64,
}

pub struct CollectionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CollectionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: i64, name: &CollectionName) -> Result<Collection, DbError> {
        let collection = sqlx::query_as::<_, Collection>(
            "INSERT INTO collections (name, user_id) VALUES (?, ?) RETURNING id, name, user_id",
        )
        .bind(name.as_str())
        .bind(owner_id)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(collection_id = collection.id, owner_id, "collection created");
        Ok(collection)
    }

    pub async fn get(&self, id: i64) -> Result<Collection, DbError> {
        sqlx::query_as::<_, Collection>("SELECT id, name, user_id FROM collections WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("collection", id))
    }

    /// The user's collections, by name.
    pub async fn list_for_user(&self, owner_id: i64) -> Result<Vec<CollectionSummary>, DbError> {
        let rows = sqlx::query_as::<_, CollectionSummary>(
            r#"
            SELECT c.id, c.name, COUNT(wc.wallpaper_id) AS wallpaper_count
            FROM collections c
            LEFT JOIN wallpaper_collection wc ON wc.collection_id = c.id
            WHERE c.user_id = ?
            GROUP BY c.id, c.name
            ORDER BY c.name, c.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete the collection and its membership links. Wallpapers stay.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM wallpaper_collection WHERE collection_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM collections WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("collection", id));
        }

        tx.commit().await?;
        tracing::info!(collection_id = id, "collection deleted");
        Ok(())
    }

    /// Link a wallpaper. Returns false if it was already a member.
    pub async fn add_wallpaper(&self, collection_id: i64, wallpaper_id: i64) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM wallpapers WHERE id = ?)")
            .bind(wallpaper_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(DbError::not_found("wallpaper", wallpaper_id));
        }

        let inserted = sqlx::query(
            "INSERT INTO wallpaper_collection (wallpaper_id, collection_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(wallpaper_id)
        .bind(collection_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        tx.commit().await?;
        tracing::debug!(collection_id, wallpaper_id, inserted, "wallpaper linked");
        Ok(inserted)
    }

    /// Unlink a wallpaper; a non-member is `NotFound`.
    pub async fn remove_wallpaper(&self, collection_id: i64, wallpaper_id: i64) -> Result<(), DbError> {
        let result =
            sqlx::query("DELETE FROM wallpaper_collection WHERE collection_id = ? AND wallpaper_id = ?")
                .bind(collection_id)
                .bind(wallpaper_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("collection membership", wallpaper_id));
        }
        tracing::debug!(collection_id, wallpaper_id, "wallpaper unlinked");
        Ok(())
    }
}
