//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool; one repository value per request
//! - Handles conflicts via UNIQUE constraints and ON CONFLICT (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod users;
pub mod sessions;
pub mod devices;
pub mod labels;
pub mod wallpapers;
pub mod collections;

pub use users::{User, UserRepo, UserSummary};
pub use sessions::{Session, SessionRepo};
pub use devices::{DeviceRepo, DeviceRow};
pub use labels::LabelRepo;
pub use wallpapers::{DeleteOutcome, NewWallpaper, WallpaperFilter, WallpaperRecord, WallpaperRepo, WallpaperView};
pub use collections::{Collection, CollectionRepo, CollectionSummary};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {field} already exists")]
    Conflict { field: &'static str },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Map a UNIQUE violation to `Conflict`, anything else to `Sqlx`.
    pub(crate) fn unique(err: sqlx::Error, field: &'static str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict { field },
            _ => Self::Sqlx(err),
        }
    }
}
