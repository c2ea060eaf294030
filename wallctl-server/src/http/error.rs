//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses. Authentication and authorization
//! failures answer with a 303 redirect (to `/login` and `/dashboard`) that
//! still carries a JSON body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use wallctl_core::models::ValidationError;

use crate::auth::AuthError;
use crate::db::repos::DbError;
use crate::storage::StorageError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Upload rejected: bad extension, empty or undecodable file (400)
    Upload { message: String },

    /// Body, query string or path segment could not be parsed (400)
    Malformed { message: String },

    /// No live session (303 to /login)
    Unauthenticated,

    /// Wrong username or password (401)
    InvalidCredentials,

    /// Not the owner / not an admin (303 to /dashboard)
    Forbidden { reason: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

fn redirect_with_body(location: &'static str, body: serde_json::Value) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::Upload { message } | Self::Malformed { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": message
                }),
            ),
            Self::Unauthenticated => {
                return redirect_with_body(
                    "/login",
                    json!({
                        "error": "unauthenticated",
                        "message": "login required"
                    }),
                );
            }
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "invalid_credentials",
                    "message": "invalid username or password"
                }),
            ),
            Self::Forbidden { reason } => {
                return redirect_with_body(
                    "/dashboard",
                    json!({
                        "error": "forbidden",
                        "message": reason
                    }),
                );
            }
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed {
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed {
            message: rejection.body_text(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { field } => Self::Validation(ValidationError::Taken { field }),
            _ => Self::Database(e),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnsupportedExtension(_) | StorageError::Empty | StorageError::InvalidImage(_) => {
                Self::Upload {
                    message: e.to_string(),
                }
            }
            StorageError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => Self::NotFound {
                resource: "file",
                id: "wallpaper".into(),
            },
            StorageError::InvalidPath(_) | StorageError::Io(_) => Self::internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Validation(v) => Self::Validation(v),
            AuthError::Db(db) => db.into(),
            AuthError::Hash(message) => Self::Internal { message },
        }
    }
}
