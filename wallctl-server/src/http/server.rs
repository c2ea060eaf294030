//! Axum server setup
//!
//! Server skeleton with:
//! - Tracing middleware
//! - Request timeout and upload-sized body limit
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use wallctl_core::WallctlConfig;

use super::routes;
use crate::storage::UploadStore;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Largest accepted request body, i.e. the upload cap
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&WallctlConfig::default())
    }
}

impl From<&WallctlConfig> for ServerConfig {
    fn from(config: &WallctlConfig) -> Self {
        Self {
            bind_addr: config.bind,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub uploads: UploadStore,
    /// Lifetime of new sessions
    pub session_ttl_secs: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &WallctlConfig) -> Self {
        Self {
            pool,
            uploads: UploadStore::new(&config.upload_dir),
            session_ttl_secs: config.session_ttl_secs(),
        }
    }
}

/// Requests running longer than `timeout` are answered with 408.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::dashboard::router())
        .merge(routes::wallpapers::router())
        .merge(routes::collections::router())
        .merge(routes::suggestions::router())
        .merge(routes::admin::router())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(timeout_layer(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database_path).await?;
/// bootstrap(&pool).await?;
/// let state = AppState { pool, uploads, session_ttl_secs };
/// run_server(state, ServerConfig::from(&config)).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    state.uploads.ensure_dirs().await.map_err(|e| {
        ServerError::Io(std::io::Error::other(format!(
            "cannot create upload directory {}: {e}",
            state.uploads.root().display()
        )))
    })?;
    tracing::info!(upload_dir = %state.uploads.root().display(), "Upload storage ready");

    let app = build_router(state, &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_request_times_out_with_408() {
        use axum::body::Body;
        use axum::http::Request;
        use axum::routing::get;
        use tower::ServiceExt;

        let app: Router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_secs(1)));

        let response = app
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
