//! Device lookup table

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use wallctl_core::models::Device;

use super::DbError;

/// Device row as stored
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceRow {
    pub id: i64,
    pub name: String,
}

pub struct DeviceRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DeviceRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the fixed device set, leaving existing rows alone.
    pub async fn seed(&self) -> Result<(), DbError> {
        for (id, device) in (1_i64..).zip(Device::ALL) {
            sqlx::query("INSERT INTO devices (id, name) VALUES (?, ?) ON CONFLICT DO NOTHING")
                .bind(id)
                .bind(device.as_str())
                .execute(self.pool)
                .await?;
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<DeviceRow>, DbError> {
        let rows = sqlx::query_as::<_, DeviceRow>("SELECT id, name FROM devices ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }
}

/// Resolve a device to its row id inside an open connection/transaction.
pub(crate) async fn device_id(
    conn: &mut sqlx::SqliteConnection,
    device: Device,
) -> Result<i64, DbError> {
    sqlx::query_scalar("SELECT id FROM devices WHERE name = ?")
        .bind(device.as_str())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DbError::not_found("device", device))
}
