//! Database layer - SQLite pool, schema bootstrap and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections)
//! - Listings eager-load labels in batched queries - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Join tables are mutated explicitly, inside a transaction

pub mod pool;
pub mod repos;

pub use pool::{bootstrap, create_memory_pool, create_pool};
pub use repos::*;
pub use sqlx::SqlitePool;
