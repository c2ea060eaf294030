//! wallctl-core: shared building blocks for the wallctl wallpaper catalog
//!
//! - `config`: file + environment configuration
//! - `models`: validated domain values (names, devices, labels, search terms, pagination)
//! - `error`: structured error type for configuration loading

pub mod config;
pub mod error;
pub mod models;

pub use config::WallctlConfig;
pub use error::{CoreError, Result};
