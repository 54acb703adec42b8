//! Local store interfaces consumed by the sync engine.
//!
//! The engine only talks to local storage through these traits. The SQLite
//! repositories in [`crate::db`] implement them for the application; tests
//! substitute an in-memory store.

use crate::models::{Bill, MenuItem, Settings};

/// Errors from local store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Local bill storage.
#[async_trait::async_trait]
pub trait BillStore: Send + Sync {
    /// All bills, in the order they were first stored locally.
    async fn get_all(&self) -> Result<Vec<Bill>, StoreError>;

    /// Bills whose `synced_to_cloud` flag is false.
    async fn get_unsynced(&self) -> Result<Vec<Bill>, StoreError>;

    /// Inserts a new bill. Fails with [`StoreError::AlreadyExists`] if the id is taken.
    async fn create(&self, bill: &Bill) -> Result<(), StoreError>;

    /// Replaces an existing bill. Fails with [`StoreError::NotFound`] if absent.
    async fn update(&self, bill: &Bill) -> Result<(), StoreError>;

    /// Inserts the bill, or replaces it if the id already exists.
    async fn upsert(&self, bill: &Bill) -> Result<(), StoreError>;

    /// Removes a bill. Fails with [`StoreError::NotFound`] if absent.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Local menu storage.
#[async_trait::async_trait]
pub trait MenuStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<MenuItem>, StoreError>;

    async fn create(&self, item: &MenuItem) -> Result<(), StoreError>;

    async fn update(&self, item: &MenuItem) -> Result<(), StoreError>;

    async fn upsert(&self, item: &MenuItem) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// The single local settings slot.
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self) -> Result<Option<Settings>, StoreError>;

    /// Writes the settings, replacing whatever was stored before.
    async fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}
