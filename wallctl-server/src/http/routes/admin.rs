//! Administrator endpoints: user list, account creation, password reset

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wallctl_core::models::{Email, Password, Username};

use crate::auth::hash_password;
use crate::db::{User, UserRepo, UserSummary};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ApiJson, ApiPath};
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct AdminDashboard {
    pub users: Vec<UserSummary>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// GET /admin/dashboard
async fn dashboard(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminDashboard>, ApiError> {
    let users = UserRepo::new(&state.pool).list_with_counts().await?;
    Ok(Json(AdminDashboard { users }))
}

/// POST /admin/create_user
async fn create_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let username = Username::new(&req.username)?;
    let password = Password::new(&req.password)?;
    let email = Email::parse_optional(req.email.as_deref())?;

    let hash = hash_password(&password)?;
    let user = UserRepo::new(&state.pool)
        .create(&username, &hash, req.is_admin, email.as_ref())
        .await?;

    tracing::info!(admin_id = admin.id, user_id = user.id, "admin created user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /admin/reset_password/{id}
async fn reset_password(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let password = Password::new(&req.password)?;
    let hash = hash_password(&password)?;
    UserRepo::new(&state.pool).set_password_hash(id, &hash).await?;

    tracing::info!(admin_id = admin.id, user_id = id, "admin reset password");
    Ok(StatusCode::NO_CONTENT)
}

/// Admin routes (`/admin/logout` lives with the other auth routes)
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/create_user", post(create_user))
        .route("/admin/reset_password/{id}", post(reset_password))
}
