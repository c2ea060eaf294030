//! HTTP server layer
//!
//! Axum server with:
//! - Session-cookie authentication via extractors
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;

pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use error::ApiError;
pub use extractors::{AdminUser, CurrentUser, MaybeUser, SESSION_COOKIE};
