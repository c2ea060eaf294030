//! Wallpaper repository
//!
//! - create/update: row + label associations in one transaction
//! - search: filtered, paginated listing with labels eager-loaded
//! - delete_for_owner: hard delete or unlink, depending on who else uses it

use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use wallctl_core::models::{
    fold_case, Device, DeviceFilter, LabelKind, LabelList, Paginated, Pagination, Resolution,
    SearchTerms, WallpaperName,
};

use super::devices::device_id;
use super::labels::{clear_labels, replace_labels};
use super::{DbError, LabelRepo};

/// Input for [`WallpaperRepo::create`]
#[derive(Debug, Clone)]
pub struct NewWallpaper {
    pub name: WallpaperName,
    pub resolution: Resolution,
    /// Path relative to the upload root
    pub path: String,
    pub owner_id: i64,
    pub device: Device,
    pub tags: LabelList,
    pub colors: LabelList,
}

/// Wallpaper row joined with device and owner names
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct WallpaperRecord {
    pub id: i64,
    pub name: String,
    pub resolution: String,
    pub path: String,
    pub user_id: i64,
    pub owner: String,
    pub device: String,
}

/// Wallpaper with its labels, as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WallpaperView {
    pub id: i64,
    pub name: String,
    pub resolution: String,
    pub path: String,
    pub user_id: i64,
    pub owner: String,
    pub device: String,
    pub tags: Vec<String>,
    pub colors: Vec<String>,
}

/// Listing filter shared by the global list and collection pages
#[derive(Debug, Clone, Default)]
pub struct WallpaperFilter {
    pub terms: SearchTerms,
    pub device: DeviceFilter,
    /// Restrict to members of this collection
    pub collection_id: Option<i64>,
}

/// What [`WallpaperRepo::delete_for_owner`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row and links removed; the caller must remove the file at `path`.
    Deleted { path: String },
    /// Another user's collection still holds it; only the owner's own
    /// collection links were removed.
    Unlinked { removed_links: u64 },
}

const SELECT_RECORD: &str = r#"
    SELECT w.id, w.name, w.resolution, w.path, w.user_id, u.username AS owner, d.name AS device
    FROM wallpapers w
    JOIN devices d ON d.id = w.device_id
    JOIN users u ON u.id = w.user_id
"#;

/// Append WHERE clauses for `filter`.
///
/// Every search term is tried against the wallpaper name and all of its tag
/// and color names; a row matches if any term matches any of them. Terms are
/// already folded, so they are compared against the `name_folded` columns.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &WallpaperFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(collection_id) = filter.collection_id {
        qb.push(" AND w.id IN (SELECT wallpaper_id FROM wallpaper_collection WHERE collection_id = ")
            .push_bind(collection_id)
            .push(")");
    }

    if let Some(device) = filter.device.device() {
        qb.push(" AND d.name = ").push_bind(device.as_str());
    }

    if !filter.terms.is_empty() {
        qb.push(" AND (");
        for (i, term) in filter.terms.terms().iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push("instr(w.name_folded, ")
                .push_bind(term.clone())
                .push(") > 0");
            qb.push(
                " OR EXISTS (SELECT 1 FROM wallpaper_tag wt JOIN tags t ON t.id = wt.tag_id \
                 WHERE wt.wallpaper_id = w.id AND instr(t.name_folded, ",
            )
            .push_bind(term.clone())
            .push(") > 0)");
            qb.push(
                " OR EXISTS (SELECT 1 FROM wallpaper_color wc JOIN colors c ON c.id = wc.color_id \
                 WHERE wc.wallpaper_id = w.id AND instr(c.name_folded, ",
            )
            .push_bind(term.clone())
            .push(") > 0)");
        }
        qb.push(")");
    }
}

pub struct WallpaperRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WallpaperRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a wallpaper and its labels atomically, returning the new id.
    pub async fn create(&self, new: &NewWallpaper) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;

        let device_id = device_id(&mut tx, new.device).await?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO wallpapers (name, name_folded, resolution, path, user_id, device_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(new.name.as_str())
        .bind(fold_case(new.name.as_str()))
        .bind(new.resolution.to_string())
        .bind(&new.path)
        .bind(new.owner_id)
        .bind(device_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_labels(&mut tx, id, &new.tags).await?;
        replace_labels(&mut tx, id, &new.colors).await?;

        tx.commit().await?;
        tracing::info!(wallpaper_id = id, owner_id = new.owner_id, path = %new.path, "wallpaper created");
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<WallpaperRecord, DbError> {
        sqlx::query_as::<_, WallpaperRecord>(&format!("{SELECT_RECORD} WHERE w.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("wallpaper", id))
    }

    /// Single wallpaper with labels.
    pub async fn view(&self, id: i64) -> Result<WallpaperView, DbError> {
        let record = self.get(id).await?;
        let mut views = self.attach_labels(vec![record]).await?;
        views
            .pop()
            .ok_or_else(|| DbError::not_found("wallpaper", id))
    }

    /// Update name/device and fully replace tags and colors.
    pub async fn update(
        &self,
        id: i64,
        name: &WallpaperName,
        device: Device,
        tags: &LabelList,
        colors: &LabelList,
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let device_id = device_id(&mut tx, device).await?;
        let result = sqlx::query("UPDATE wallpapers SET name = ?, name_folded = ?, device_id = ? WHERE id = ?")
            .bind(name.as_str())
            .bind(fold_case(name.as_str()))
            .bind(device_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("wallpaper", id));
        }

        replace_labels(&mut tx, id, tags).await?;
        replace_labels(&mut tx, id, colors).await?;

        tx.commit().await?;
        tracing::info!(wallpaper_id = id, "wallpaper updated");
        Ok(())
    }

    /// Filtered page, newest first, plus the total number of matches.
    pub async fn search(
        &self,
        filter: &WallpaperFilter,
        page: Pagination,
    ) -> Result<Paginated<WallpaperView>, DbError> {
        let mut count_qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT COUNT(*) FROM wallpapers w JOIN devices d ON d.id = w.device_id",
        );
        push_filter(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_RECORD);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY w.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let records: Vec<WallpaperRecord> = qb.build_query_as().fetch_all(self.pool).await?;

        let items = self.attach_labels(records).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Load tags and colors for all records with one query per label kind.
    async fn attach_labels(&self, records: Vec<WallpaperRecord>) -> Result<Vec<WallpaperView>, DbError> {
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let labels = LabelRepo::new(self.pool);
        let mut tags = labels.for_wallpapers(LabelKind::Tag, &ids).await?;
        let mut colors = labels.for_wallpapers(LabelKind::Color, &ids).await?;

        Ok(records
            .into_iter()
            .map(|r| WallpaperView {
                tags: tags.remove(&r.id).unwrap_or_default(),
                colors: colors.remove(&r.id).unwrap_or_default(),
                id: r.id,
                name: r.name,
                resolution: r.resolution,
                path: r.path,
                user_id: r.user_id,
                owner: r.owner,
                device: r.device,
            })
            .collect())
    }

    pub async fn in_collection(&self, wallpaper_id: i64, collection_id: i64) -> Result<bool, DbError> {
        let member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM wallpaper_collection WHERE wallpaper_id = ? AND collection_id = ?)",
        )
        .bind(wallpaper_id)
        .bind(collection_id)
        .fetch_one(self.pool)
        .await?;
        Ok(member)
    }

    /// Delete on behalf of `requester_id` (the owner).
    ///
    /// If any collection owned by someone else references the wallpaper,
    /// only the requester's own collection links are removed. Otherwise the
    /// links, label associations and row are deleted and the stored path is
    /// returned so the caller can remove the file after commit.
    ///
    /// Any database error rolls the whole operation back.
    pub async fn delete_for_owner(&self, id: i64, requester_id: i64) -> Result<DeleteOutcome, DbError> {
        let mut tx = self.pool.begin().await?;

        let path: String = sqlx::query_scalar("SELECT path FROM wallpapers WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("wallpaper", id))?;

        let foreign_refs: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM wallpaper_collection wc
            JOIN collections c ON c.id = wc.collection_id
            WHERE wc.wallpaper_id = ? AND c.user_id != ?
            "#,
        )
        .bind(id)
        .bind(requester_id)
        .fetch_one(&mut *tx)
        .await?;

        if foreign_refs > 0 {
            let removed = sqlx::query(
                r#"
                DELETE FROM wallpaper_collection
                WHERE wallpaper_id = ?
                  AND collection_id IN (SELECT id FROM collections WHERE user_id = ?)
                "#,
            )
            .bind(id)
            .bind(requester_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            tx.commit().await?;
            tracing::info!(
                wallpaper_id = id,
                foreign_refs,
                removed_links = removed,
                "wallpaper still referenced by other users, unlinked only"
            );
            return Ok(DeleteOutcome::Unlinked {
                removed_links: removed,
            });
        }

        sqlx::query("DELETE FROM wallpaper_collection WHERE wallpaper_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        clear_labels(&mut tx, id).await?;
        sqlx::query("DELETE FROM wallpapers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(wallpaper_id = id, path = %path, "wallpaper deleted");
        Ok(DeleteOutcome::Deleted { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{testing, CollectionRepo};
    use wallctl_core::models::CollectionName;

    fn filter(search: &str) -> WallpaperFilter {
        WallpaperFilter {
            terms: SearchTerms::parse(Some(search)),
            ..Default::default()
        }
    }

    async fn names(repo: &WallpaperRepo<'_>, f: &WallpaperFilter) -> Vec<String> {
        repo.search(f, Pagination::wallpapers(None))
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|w| w.name)
            .collect()
    }

    #[tokio::test]
    async fn view_includes_labels_device_and_owner() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        let id = testing::wallpaper(&pool, owner, "Sunset", "warm, nature", "orange").await;

        let view = WallpaperRepo::new(&pool).view(id).await.unwrap();
        assert_eq!(view.owner, "ala");
        assert_eq!(view.device, "desktop");
        assert_eq!(view.resolution, "1920x1080");
        assert_eq!(view.tags, ["nature", "warm"]);
        assert_eq!(view.colors, ["orange"]);
    }

    #[tokio::test]
    async fn search_matches_name_tag_or_color_case_insensitively() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        testing::wallpaper(&pool, owner, "Sunset", "nature, warm", "orange").await;
        testing::wallpaper(&pool, owner, "Ocean", "water", "Deep Blue").await;
        testing::wallpaper(&pool, owner, "City", "night", "grey").await;
        let repo = WallpaperRepo::new(&pool);

        assert_eq!(names(&repo, &filter("WARM")).await, ["Sunset"]);
        assert_eq!(names(&repo, &filter("blue")).await, ["Ocean"]);
        assert_eq!(names(&repo, &filter("cit")).await, ["City"]);
        // OR across terms, newest first
        assert_eq!(names(&repo, &filter("night, sun")).await, ["City", "Sunset"]);
        assert!(names(&repo, &filter("forest")).await.is_empty());
        assert_eq!(names(&repo, &filter(" , ")).await.len(), 3);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        testing::wallpaper(&pool, owner, "Église", "Été", "Żółty").await;
        testing::wallpaper(&pool, owner, "Zachód", "wieczór", "Czerwień").await;
        let repo = WallpaperRepo::new(&pool);

        for term in ["Église", "église", "ÉGLISE", "Été", "été", "Żółty", "ŻÓŁ"] {
            assert_eq!(names(&repo, &filter(term)).await, ["Église"], "term {term}");
        }
        assert_eq!(names(&repo, &filter("ZACHÓD")).await, ["Zachód"]);
        assert_eq!(names(&repo, &filter("czerwień")).await, ["Zachód"]);
    }

    #[tokio::test]
    async fn update_refreshes_folded_name() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        let id = testing::wallpaper(&pool, owner, "Plain", "t", "c").await;
        let repo = WallpaperRepo::new(&pool);

        repo.update(
            id,
            &WallpaperName::new("Łąka").unwrap(),
            Device::Desktop,
            &LabelList::parse(LabelKind::Tag, "t").unwrap(),
            &LabelList::parse(LabelKind::Color, "c").unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(names(&repo, &filter("łąka")).await, ["Łąka"]);
        assert!(names(&repo, &filter("plain")).await.is_empty());
    }

    #[tokio::test]
    async fn search_filters_by_device() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        let id = testing::wallpaper(&pool, owner, "Phone", "x", "y").await;
        testing::wallpaper(&pool, owner, "Screen", "x", "y").await;
        let repo = WallpaperRepo::new(&pool);
        repo.update(
            id,
            &WallpaperName::new("Phone").unwrap(),
            Device::Mobile,
            &LabelList::parse(LabelKind::Tag, "x").unwrap(),
            &LabelList::parse(LabelKind::Color, "y").unwrap(),
        )
        .await
        .unwrap();

        let mobile = WallpaperFilter {
            device: DeviceFilter::from(Device::Mobile),
            ..Default::default()
        };
        assert_eq!(names(&repo, &mobile).await, ["Phone"]);
    }

    #[tokio::test]
    async fn search_paginates_twelve_per_page() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        for i in 0..14 {
            testing::wallpaper(&pool, owner, &format!("W{i}"), "t", "c").await;
        }
        let repo = WallpaperRepo::new(&pool);

        let first = repo
            .search(&WallpaperFilter::default(), Pagination::wallpapers(Some(1)))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 12);
        assert_eq!(first.total, 14);
        assert_eq!(first.items[0].name, "W13");
        assert_eq!(first.total_pages(), 2);

        let second = repo
            .search(&WallpaperFilter::default(), Pagination::wallpapers(Some(2)))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[1].name, "W0");
    }

    #[tokio::test]
    async fn search_scoped_to_collection() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        let a = testing::wallpaper(&pool, owner, "A", "t", "c").await;
        testing::wallpaper(&pool, owner, "B", "t", "c").await;
        let collections = CollectionRepo::new(&pool);
        let c = collections
            .create(owner, &CollectionName::new("Faves").unwrap())
            .await
            .unwrap();
        collections.add_wallpaper(c.id, a).await.unwrap();

        let scoped = WallpaperFilter {
            collection_id: Some(c.id),
            ..Default::default()
        };
        let repo = WallpaperRepo::new(&pool);
        assert_eq!(names(&repo, &scoped).await, ["A"]);
        assert!(repo.in_collection(a, c.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_replaces_labels() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        let id = testing::wallpaper(&pool, owner, "Sunset", "nature, warm", "orange").await;
        let repo = WallpaperRepo::new(&pool);

        let tags = LabelList::parse(LabelKind::Tag, "beach").unwrap();
        let colors = LabelList::parse(LabelKind::Color, "pink, orange").unwrap();
        for _ in 0..2 {
            repo.update(id, &WallpaperName::new("Dusk").unwrap(), Device::Desktop, &tags, &colors)
                .await
                .unwrap();
        }

        let view = repo.view(id).await.unwrap();
        assert_eq!(view.name, "Dusk");
        assert_eq!(view.tags, ["beach"]);
        assert_eq!(view.colors, ["orange", "pink"]);
    }

    #[tokio::test]
    async fn delete_without_foreign_refs_is_hard() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        let id = testing::wallpaper(&pool, owner, "Sunset", "warm", "orange").await;
        let collections = CollectionRepo::new(&pool);
        let own = collections
            .create(owner, &CollectionName::new("Mine").unwrap())
            .await
            .unwrap();
        collections.add_wallpaper(own.id, id).await.unwrap();

        let repo = WallpaperRepo::new(&pool);
        let outcome = repo.delete_for_owner(id, owner).await.unwrap();
        assert_eq!(
            outcome,
            DeleteOutcome::Deleted {
                path: "permanent/sunset.png".into()
            }
        );
        assert!(matches!(repo.get(id).await, Err(DbError::NotFound { .. })));
        // collection itself survives
        assert!(collections.get(own.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_with_foreign_refs_only_unlinks_own() {
        let pool = testing::pool().await;
        let a = testing::user(&pool, "ala").await;
        let b = testing::user(&pool, "bob").await;
        let id = testing::wallpaper(&pool, a, "Sunset", "warm", "orange").await;
        let collections = CollectionRepo::new(&pool);
        let a_col = collections.create(a, &CollectionName::new("A").unwrap()).await.unwrap();
        let b_col = collections.create(b, &CollectionName::new("B").unwrap()).await.unwrap();
        collections.add_wallpaper(a_col.id, id).await.unwrap();
        collections.add_wallpaper(b_col.id, id).await.unwrap();

        let repo = WallpaperRepo::new(&pool);
        let outcome = repo.delete_for_owner(id, a).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Unlinked { removed_links: 1 });
        assert!(repo.get(id).await.is_ok());
        assert!(!repo.in_collection(id, a_col.id).await.unwrap());
        assert!(repo.in_collection(id, b_col.id).await.unwrap());

        collections.remove_wallpaper(b_col.id, id).await.unwrap();
        assert!(matches!(
            repo.delete_for_owner(id, a).await.unwrap(),
            DeleteOutcome::Deleted { .. }
        ));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let pool = testing::pool().await;
        let owner = testing::user(&pool, "ala").await;
        assert!(matches!(
            WallpaperRepo::new(&pool).delete_for_owner(42, owner).await,
            Err(DbError::NotFound { resource: "wallpaper", .. })
        ));
    }
}
