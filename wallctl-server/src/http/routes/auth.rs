//! Login and logout

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use wallctl_core::models::Password;

use crate::auth;
use crate::db::SessionRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{
    clear_session_cookie, session_cookie, session_token, ApiJson, CurrentUser, MaybeUser,
};
use crate::http::server::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// GET /, GET /login
async fn login_page(MaybeUser(user): MaybeUser) -> Response {
    match user {
        Some(_) => Redirect::to("/dashboard").into_response(),
        None => Json(json!({ "authenticated": false })).into_response(),
    }
}

/// POST /login - verify credentials and start a session
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let password = Password::new(&req.password)?;
    let (_, session) = auth::login(&state.pool, &req.username, &password, state.session_ttl_secs).await?;

    Ok((
        [(header::SET_COOKIE, session_cookie(&session.token, state.session_ttl_secs))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// GET /logout, GET /admin/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = session_token(&headers) {
        SessionRepo::new(&state.pool).delete(&token).await?;
    }
    tracing::info!(user_id = user.id, "user logged out");

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response())
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(login_page))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/admin/logout", get(logout))
}
