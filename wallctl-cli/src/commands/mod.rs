//! Command implementations for wallctl CLI

pub mod config;
pub mod serve;
pub mod user;

// Re-export main dispatcher functions for flat access from main.rs
pub use config::run_config;
pub use serve::run_serve;
pub use user::run_user;
