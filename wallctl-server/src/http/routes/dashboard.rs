//! User landing page

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::{CollectionRepo, CollectionSummary, DeviceRepo, DeviceRow, User};
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub user: User,
    pub collections: Vec<CollectionSummary>,
    pub devices: Vec<DeviceRow>,
}

/// GET /dashboard - admins are sent to the admin dashboard
async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    if user.is_admin {
        return Ok(Redirect::to("/admin/dashboard").into_response());
    }

    let collections = CollectionRepo::new(&state.pool).list_for_user(user.id).await?;
    let devices = DeviceRepo::new(&state.pool).list().await?;

    Ok(Json(DashboardResponse {
        user,
        collections,
        devices,
    })
    .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}
