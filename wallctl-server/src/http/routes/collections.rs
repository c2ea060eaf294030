//! Collection endpoints - all mutations and views are owner only

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wallctl_core::models::CollectionName;

use super::{ListParams, WallpaperPage};
use crate::db::{Collection, CollectionRepo, User, WallpaperRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ensure_owner, ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::http::server::AppState;

#[derive(Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct AddToCollectionRequest {
    pub collection_id: i64,
}

#[derive(Serialize)]
pub struct CollectionPage {
    pub collection: Collection,
    pub wallpapers: WallpaperPage,
}

#[derive(Serialize)]
pub struct MembershipResponse {
    pub collection_id: i64,
    pub wallpaper_id: i64,
    /// False when the request changed nothing
    pub changed: bool,
}

/// Load a collection and check the requester owns it.
async fn owned_collection(state: &AppState, user: &User, id: i64) -> Result<Collection, ApiError> {
    let collection = CollectionRepo::new(&state.pool).get(id).await?;
    ensure_owner(user, collection.user_id, "collection", id)?;
    Ok(collection)
}

/// GET /collection/{id}?search=&device=&page=
async fn view_collection(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<CollectionPage>, ApiError> {
    let collection = owned_collection(&state, &user, id).await?;
    let filter = params.filter(Some(collection.id))?;
    let page = WallpaperRepo::new(&state.pool)
        .search(&filter, params.pagination())
        .await?;

    Ok(Json(CollectionPage {
        collection,
        wallpapers: WallpaperPage::from(page),
    }))
}

/// POST /create_collection
async fn create_collection(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<Collection>), ApiError> {
    let name = CollectionName::new(&req.name)?;
    let collection = CollectionRepo::new(&state.pool).create(user.id, &name).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// POST /delete_collection/{id} - wallpapers are kept
async fn delete_collection(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    owned_collection(&state, &user, id).await?;
    CollectionRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /add_to_collection/{wallpaper_id}
async fn add_to_collection(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(wallpaper_id): ApiPath<i64>,
    ApiJson(req): ApiJson<AddToCollectionRequest>,
) -> Result<Json<MembershipResponse>, ApiError> {
    let collection = owned_collection(&state, &user, req.collection_id).await?;
    let changed = CollectionRepo::new(&state.pool)
        .add_wallpaper(collection.id, wallpaper_id)
        .await?;

    Ok(Json(MembershipResponse {
        collection_id: collection.id,
        wallpaper_id,
        changed,
    }))
}

/// POST /remove_wallpaper_from_collection/{collection_id}/{wallpaper_id}
async fn remove_from_collection(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath((collection_id, wallpaper_id)): ApiPath<(i64, i64)>,
) -> Result<Json<MembershipResponse>, ApiError> {
    owned_collection(&state, &user, collection_id).await?;
    CollectionRepo::new(&state.pool)
        .remove_wallpaper(collection_id, wallpaper_id)
        .await?;

    Ok(Json(MembershipResponse {
        collection_id,
        wallpaper_id,
        changed: true,
    }))
}

/// Collection routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/collection/{id}", get(view_collection))
        .route("/create_collection", post(create_collection))
        .route("/delete_collection/{id}", post(delete_collection))
        .route("/add_to_collection/{wallpaper_id}", post(add_to_collection))
        .route(
            "/remove_wallpaper_from_collection/{collection_id}/{wallpaper_id}",
            post(remove_from_collection),
        )
}
