//! Tag and color labels
//!
//! Tags and colors share one implementation; `LabelKind` selects the
//! label table and its join table. Table names come from a fixed match,
//! never from input.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use wallctl_core::models::{fold_case, LabelKind, LabelList};

use super::DbError;

struct LabelTables {
    table: &'static str,
    join: &'static str,
    fk: &'static str,
}

fn tables(kind: LabelKind) -> LabelTables {
    match kind {
        LabelKind::Tag => LabelTables {
            table: "tags",
            join: "wallpaper_tag",
            fk: "tag_id",
        },
        LabelKind::Color => LabelTables {
            table: "colors",
            join: "wallpaper_color",
            fk: "color_id",
        },
    }
}

/// Replace every `kind` label on a wallpaper with `labels`.
///
/// Existing associations are cleared first, so the result is exactly the
/// given set regardless of what was there. Unknown names are created;
/// known names (exact, case-sensitive match) are reused.
pub(crate) async fn replace_labels(
    conn: &mut SqliteConnection,
    wallpaper_id: i64,
    labels: &LabelList,
) -> Result<(), DbError> {
    let t = tables(labels.kind());

    sqlx::query(&format!("DELETE FROM {} WHERE wallpaper_id = ?", t.join))
        .bind(wallpaper_id)
        .execute(&mut *conn)
        .await?;

    for name in labels.names() {
        let label_id: i64 = sqlx::query_scalar(&format!(
            "INSERT INTO {} (name, name_folded) VALUES (?, ?) \
             ON CONFLICT (name) DO UPDATE SET name = excluded.name \
             RETURNING id",
            t.table
        ))
        .bind(name)
        .bind(fold_case(name))
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO {} (wallpaper_id, {}) VALUES (?, ?) ON CONFLICT DO NOTHING",
            t.join, t.fk
        ))
        .bind(wallpaper_id)
        .bind(label_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Remove all label links of both kinds from a wallpaper.
pub(crate) async fn clear_labels(conn: &mut SqliteConnection, wallpaper_id: i64) -> Result<(), DbError> {
    for kind in [LabelKind::Tag, LabelKind::Color] {
        sqlx::query(&format!("DELETE FROM {} WHERE wallpaper_id = ?", tables(kind).join))
            .bind(wallpaper_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub struct LabelRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LabelRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Label names for many wallpapers in one query, sorted by name.
    pub async fn for_wallpapers(
        &self,
        kind: LabelKind,
        wallpaper_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>, DbError> {
        let mut by_wallpaper: HashMap<i64, Vec<String>> = HashMap::new();
        if wallpaper_ids.is_empty() {
            return Ok(by_wallpaper);
        }

        let t = tables(kind);
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT j.wallpaper_id, l.name FROM {} j JOIN {} l ON l.id = j.{} WHERE j.wallpaper_id IN (",
            t.join, t.table, t.fk
        ));
        let mut ids = qb.separated(", ");
        for id in wallpaper_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY l.name");

        let rows: Vec<(i64, String)> = qb.build_query_as().fetch_all(self.pool).await?;
        for (wallpaper_id, name) in rows {
            by_wallpaper.entry(wallpaper_id).or_default().push(name);
        }
        Ok(by_wallpaper)
    }

    /// Distinct tag, color and wallpaper names containing `term`
    /// (case-insensitive), alphabetically, at most `limit`.
    pub async fn suggest(&self, term: &str, limit: i64) -> Result<Vec<String>, DbError> {
        let term = fold_case(term.trim());
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name FROM (
                SELECT name FROM tags WHERE instr(name_folded, ?1) > 0
                UNION
                SELECT name FROM colors WHERE instr(name_folded, ?1) > 0
                UNION
                SELECT name FROM wallpapers WHERE instr(name_folded, ?1) > 0
            )
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(&term)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(names)
    }
}
