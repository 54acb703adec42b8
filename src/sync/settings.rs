//! Settings reconciliation. Settings are a singleton moved wholesale in
//! either direction; there is no per-field merge.

use std::sync::Arc;

use serde_json::Value;

use super::{json_kind, SyncError};
use crate::models::{Settings, SETTINGS_ID};
use crate::remote::RemoteApi;
use crate::store::SettingsStore;

pub struct SettingsSync {
    remote: Arc<dyn RemoteApi>,
    store: Arc<dyn SettingsStore>,
}

impl SettingsSync {
    pub fn new(remote: Arc<dyn RemoteApi>, store: Arc<dyn SettingsStore>) -> Self {
        Self { remote, store }
    }

    /// Overwrites the local settings with the remote ones.
    ///
    /// Whatever id the remote payload carries, the record is stored under
    /// [`SETTINGS_ID`].
    pub async fn pull_and_overwrite(&self) -> Result<(), SyncError> {
        let payload = self.remote.load_settings().await?;

        let mut settings: Settings = match payload {
            Value::Null => return Err(SyncError::NotFound("remote settings")),
            Value::Object(map) if map.is_empty() => {
                return Err(SyncError::NotFound("remote settings"))
            }
            Value::Object(map) => serde_json::from_value(Value::Object(map))
                .map_err(|e| SyncError::invalid_shape("settings", e.to_string()))?,
            other => {
                return Err(SyncError::invalid_shape(
                    "settings",
                    format!("expected an object, got {}", json_kind(&other)),
                ))
            }
        };
        settings.id = SETTINGS_ID.to_string();

        self.store.save(&settings).await?;
        tracing::info!("Pulled settings");
        Ok(())
    }

    /// Sends the local settings to the remote.
    pub async fn push_local(&self) -> Result<(), SyncError> {
        let settings = self
            .store
            .get()
            .await?
            .ok_or(SyncError::NotFound("local settings"))?;

        self.remote.push_settings(&settings).await?;
        tracing::debug!("Pushed settings");
        Ok(())
    }
}
