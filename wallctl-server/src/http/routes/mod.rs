//! Route handlers organized by resource

pub mod health;
pub mod auth;
pub mod dashboard;
pub mod wallpapers;
pub mod collections;
pub mod suggestions;
pub mod admin;

use serde::{Deserialize, Serialize};
use wallctl_core::models::{DeviceFilter, Paginated, Pagination, SearchTerms};

use crate::db::{WallpaperFilter, WallpaperView};
use crate::http::error::ApiError;

/// `?search=&device=&page=` shared by wallpaper listings
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub device: Option<String>,
    /// Lenient: anything that is not a positive number means page 1
    pub page: Option<String>,
}

impl ListParams {
    pub fn filter(&self, collection_id: Option<i64>) -> Result<WallpaperFilter, ApiError> {
        Ok(WallpaperFilter {
            terms: SearchTerms::parse(self.search.as_deref()),
            device: DeviceFilter::parse(self.device.as_deref())?,
            collection_id,
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::wallpapers(self.page.as_deref().and_then(|p| p.trim().parse().ok()))
    }
}

/// A page of wallpapers plus navigation hints
#[derive(Debug, Serialize)]
pub struct WallpaperPage {
    #[serde(flatten)]
    pub page: Paginated<WallpaperView>,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<Paginated<WallpaperView>> for WallpaperPage {
    fn from(page: Paginated<WallpaperView>) -> Self {
        Self {
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
            page,
        }
    }
}
