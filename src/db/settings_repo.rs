use sqlx::SqlitePool;

use crate::models::{Settings, SETTINGS_ID};
use crate::store::{SettingsStore, StoreError};

/// Stores the settings record whole, as JSON, under [`SETTINGS_ID`].
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SettingsStore for SettingsRepository {
    async fn get(&self) -> Result<Option<Settings>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT payload FROM settings WHERE id = ?")
            .bind(SETTINGS_ID)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((payload,)) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let payload = serde_json::to_string(settings)?;
        sqlx::query(
            "INSERT INTO settings (id, payload) VALUES (?, ?) \
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
        )
        .bind(SETTINGS_ID)
        .bind(&payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
