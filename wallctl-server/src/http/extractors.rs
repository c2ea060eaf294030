//! Custom Axum extractors and session cookie helpers

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use super::error::ApiError;
use super::server::AppState;
use crate::db::{SessionRepo, User};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "wallctl_session";

/// Session token from the `Cookie` header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };
    Ok(SessionRepo::new(&state.pool).find_user(&token).await?)
}

/// Logged-in user; rejects with a redirect to `/login` otherwise
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(Self(user.clone()));
        }

        let user = resolve_user(parts, state)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        parts.extensions.insert(user.clone());
        Ok(Self(user))
    }
}

/// Logged-in administrator; non-admins are sent back to `/dashboard`
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = user.id, "non-admin tried an admin route");
            return Err(ApiError::forbidden("administrator access required"));
        }
        Ok(Self(user))
    }
}

/// User if logged in, for pages that serve both states
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(parts, state).await?))
    }
}

/// JSON body; parse failures answer with a 400 `validation_error`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string; parse failures answer with a 400 `validation_error`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters; parse failures answer with a 400 `validation_error`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Reject unless `user` owns the resource.
pub fn ensure_owner(user: &User, owner_id: i64, resource: &'static str, id: i64) -> Result<(), ApiError> {
    if user.id == owner_id {
        return Ok(());
    }
    tracing::warn!(user_id = user.id, owner_id, resource, id, "access denied to non-owner");
    Err(ApiError::forbidden(format!("you do not own this {resource}")))
}
