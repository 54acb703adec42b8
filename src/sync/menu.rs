//! Menu reconciliation. Menu items carry no sync flag, so a pull is always a
//! full replace.

use std::collections::HashSet;
use std::sync::Arc;

use super::{decode_records, PullSummary, SyncError};
use crate::models::MenuItem;
use crate::remote::RemoteApi;
use crate::store::MenuStore;

pub struct MenuSync {
    remote: Arc<dyn RemoteApi>,
    store: Arc<dyn MenuStore>,
}

impl MenuSync {
    pub fn new(remote: Arc<dyn RemoteApi>, store: Arc<dyn MenuStore>) -> Self {
        Self { remote, store }
    }

    /// Sends a single item to the remote. Nothing changes locally.
    pub async fn push_one(&self, item: &MenuItem) -> Result<(), SyncError> {
        self.remote.push_menu_item(item).await?;
        tracing::debug!("Pushed menu item {}", item.id);
        Ok(())
    }

    /// Replaces the local menu with the remote one: upsert every remote
    /// item, then delete local items the remote does not list.
    pub async fn pull_and_overwrite(&self) -> Result<PullSummary, SyncError> {
        let payload = self.remote.load_menu().await?;
        // `is_available` is coerced to a bool while decoding.
        let remote_items: Vec<MenuItem> = decode_records("menu", payload)?;
        let local_items = self.store.get_all().await?;

        let remote_ids: HashSet<&str> = remote_items.iter().map(|i| i.id.as_str()).collect();
        let mut summary = PullSummary::default();

        for item in &remote_items {
            self.store.upsert(item).await?;
            summary.upserted += 1;
        }

        for item in local_items
            .iter()
            .filter(|i| !remote_ids.contains(i.id.as_str()))
        {
            match self.store.delete(&item.id).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => tracing::debug!("Ignoring failed delete of menu item {}: {}", item.id, e),
            }
        }

        tracing::info!(
            "Pulled menu: {} upserted, {} deleted",
            summary.upserted,
            summary.deleted
        );
        Ok(summary)
    }
}
