//! Sync orchestration across bills, menu and settings.

use std::sync::Arc;

use sqlx::SqlitePool;

use super::{BillPushResult, BillSync, MenuSync, PullSummary, SettingsSync, SyncError};
use crate::db::{BillRepository, MenuRepository, SettingsRepository};
use crate::remote::RemoteApi;
use crate::store::{BillStore, MenuStore, SettingsStore};

/// Per-entity results of [`SyncEngine::pull_everything_and_overwrite`].
#[derive(Debug)]
pub struct PullReport {
    pub bills: Result<PullSummary, SyncError>,
    pub menu: Result<PullSummary, SyncError>,
    pub settings: Result<(), SyncError>,
}

impl PullReport {
    /// True only if all three entity classes pulled cleanly.
    pub fn is_success(&self) -> bool {
        self.bills.is_ok() && self.menu.is_ok() && self.settings.is_ok()
    }

    /// The entity classes that failed, with their errors.
    pub fn failures(&self) -> Vec<(&'static str, &SyncError)> {
        let mut failures = Vec::new();
        if let Err(e) = &self.bills {
            failures.push(("bills", e));
        }
        if let Err(e) = &self.menu {
            failures.push(("menu", e));
        }
        if let Err(e) = &self.settings {
            failures.push(("settings", e));
        }
        failures
    }
}

/// Runs sync passes over all three entity classes.
pub struct SyncEngine {
    remote: Arc<dyn RemoteApi>,
    bill_store: Arc<dyn BillStore>,
    menu_store: Arc<dyn MenuStore>,
    settings_store: Arc<dyn SettingsStore>,
    bills: BillSync,
    menu: MenuSync,
    settings: SettingsSync,
}

impl SyncEngine {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        bill_store: Arc<dyn BillStore>,
        menu_store: Arc<dyn MenuStore>,
        settings_store: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            bills: BillSync::new(remote.clone(), bill_store.clone()),
            menu: MenuSync::new(remote.clone(), menu_store.clone()),
            settings: SettingsSync::new(remote.clone(), settings_store.clone()),
            remote,
            bill_store,
            menu_store,
            settings_store,
        }
    }

    /// Creates an engine over the SQLite repositories sharing `pool`.
    pub fn with_sqlite(remote: Arc<dyn RemoteApi>, pool: SqlitePool) -> Self {
        Self::new(
            remote,
            Arc::new(BillRepository::new(pool.clone())),
            Arc::new(MenuRepository::new(pool.clone())),
            Arc::new(SettingsRepository::new(pool)),
        )
    }

    pub fn bills(&self) -> &BillSync {
        &self.bills
    }

    pub fn menu(&self) -> &MenuSync {
        &self.menu
    }

    pub fn settings(&self) -> &SettingsSync {
        &self.settings
    }

    /// Pushes every bill not yet synced. See [`BillSync::push_all_unsynced`].
    pub async fn sync_unsynced_bills(&self) -> Result<Vec<BillPushResult>, SyncError> {
        self.bills.push_all_unsynced().await
    }

    /// Pushes the local settings. See [`SettingsSync::push_local`].
    pub async fn push_settings(&self) -> Result<(), SyncError> {
        self.settings.push_local().await
    }

    /// Sends all local bills, menu items and settings in one `syncAll` call.
    ///
    /// All or nothing: any local read or network failure fails the call.
    /// Bills are not marked synced by a snapshot push.
    pub async fn push_all_local_state(&self) -> Result<(), SyncError> {
        let bills = self.bill_store.get_all().await?;
        let menu = self.menu_store.get_all().await?;
        let settings = self.settings_store.get().await?;

        self.remote
            .push_full_snapshot(&bills, &menu, settings.as_ref())
            .await?;

        tracing::info!(
            "Pushed snapshot: {} bill(s), {} menu item(s), settings {}",
            bills.len(),
            menu.len(),
            if settings.is_some() { "included" } else { "absent" }
        );
        Ok(())
    }

    /// Pulls bills, then menu, then settings, overwriting local state.
    ///
    /// Each entity class is attempted even if an earlier one failed; the
    /// report says which ones succeeded.
    pub async fn pull_everything_and_overwrite(&self) -> PullReport {
        let report = PullReport {
            bills: self.bills.pull_and_overwrite().await,
            menu: self.menu.pull_and_overwrite().await,
            settings: self.settings.pull_and_overwrite().await,
        };

        for (entity, e) in report.failures() {
            tracing::warn!("Pull of {} failed: {}", entity, e);
        }
        report
    }

    /// One background pass: push unsynced bills, then push settings.
    ///
    /// Errors are logged and swallowed so that a bad pass never stops the
    /// next one.
    pub async fn tick(&self) {
        match self.sync_unsynced_bills().await {
            Ok(results) if results.is_empty() => {}
            Ok(results) => {
                let failed = results.iter().filter(|r| !r.is_ok()).count();
                tracing::info!(
                    "Auto-sync pushed {} bill(s), {} failed",
                    results.len() - failed,
                    failed
                );
            }
            Err(e) => tracing::warn!("Auto-sync bill push failed: {}", e),
        }

        match self.push_settings().await {
            Ok(()) => {}
            Err(SyncError::NotFound(what)) => {
                tracing::debug!("Auto-sync skipped settings: no {}", what)
            }
            Err(e) => tracing::warn!("Auto-sync settings push failed: {}", e),
        }
    }
}
