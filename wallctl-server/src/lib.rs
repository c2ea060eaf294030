//! wallctl-server: multi-user wallpaper catalog over HTTP
//!
//! Users log in with a session cookie, upload wallpapers tagged by color,
//! tag and device, search the shared library and gather wallpapers into
//! personal collections. Administrators manage accounts.

pub mod auth;
pub mod db;
pub mod http;
pub mod storage;

pub use db::{bootstrap, create_memory_pool, create_pool, DbError};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use storage::{StorageError, UploadStore};
