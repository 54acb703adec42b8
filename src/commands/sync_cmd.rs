//! Sync CLI commands for exchanging data with the remote endpoint.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use sqlx::SqlitePool;

use possync::config::Config;
use possync::db::{BillRepository, MenuRepository, SettingsRepository};
use possync::remote::{ReadAction, RemoteApi, RemoteClient, RemoteFailure};
use possync::store::{BillStore, SettingsStore, StoreError};
use possync::sync::{PullReport, Scheduler, SyncEngine, SyncError};

fn engine(pool: &SqlitePool, config: &Config) -> Result<SyncEngine, SyncCommandError> {
    let client = RemoteClient::from_config(&config.sync)?;
    Ok(SyncEngine::with_sqlite(Arc::new(client), pool.clone()))
}

/// Push local changes to the remote
#[derive(Debug, Args)]
pub struct PushCommand {
    /// Push only this bill, whether or not it is already synced
    #[arg(long, value_name = "ID")]
    bill: Option<String>,

    /// Push only this menu item
    #[arg(long, value_name = "ID")]
    menu_item: Option<String>,

    /// Push the shop settings
    #[arg(long)]
    settings: bool,
}

impl PushCommand {
    pub async fn run(&self, pool: &SqlitePool, config: &Config) -> Result<(), SyncCommandError> {
        let engine = engine(pool, config)?;

        if self.bill.is_none() && self.menu_item.is_none() && !self.settings {
            return push_unsynced(&engine).await;
        }

        if let Some(id) = &self.bill {
            let bill = BillRepository::new(pool.clone())
                .get_by_id(id)
                .await?
                .ok_or_else(|| SyncCommandError::BillNotFound(id.clone()))?;
            engine.bills().push_one(&bill).await?;
            println!("✓ bill {}", bill);
        }

        if let Some(id) = &self.menu_item {
            let item = MenuRepository::new(pool.clone())
                .get_by_id(id)
                .await?
                .ok_or_else(|| SyncCommandError::MenuItemNotFound(id.clone()))?;
            engine.menu().push_one(&item).await?;
            println!("✓ menu item {}", id);
        }

        if self.settings {
            engine.push_settings().await?;
            println!("✓ settings");
        }

        Ok(())
    }
}

async fn push_unsynced(engine: &SyncEngine) -> Result<(), SyncCommandError> {
    let results = engine.sync_unsynced_bills().await?;
    if results.is_empty() {
        println!("No unsynced bills.");
        return Ok(());
    }

    let mut failed = 0;
    for result in &results {
        match &result.outcome {
            Ok(()) => println!("  ✓ {}", result.id),
            Err(e) => {
                failed += 1;
                println!("  ✗ {}: {}", result.id, e);
            }
        }
    }

    println!();
    println!(
        "Pushed {} of {} bill{}.",
        results.len() - failed,
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    );

    if failed > 0 {
        return Err(SyncCommandError::PushFailed(failed));
    }
    Ok(())
}

/// Send every local bill, menu item and the settings in one request
#[derive(Debug, Args)]
pub struct PushAllCommand {}

impl PushAllCommand {
    pub async fn run(&self, pool: &SqlitePool, config: &Config) -> Result<(), SyncCommandError> {
        let engine = engine(pool, config)?;

        println!("Uploading full snapshot...");
        engine.push_all_local_state().await?;
        println!("Snapshot uploaded.");
        Ok(())
    }
}

/// Overwrite local data with the remote copy
#[derive(Debug, Args)]
pub struct PullCommand {}

impl PullCommand {
    pub async fn run(&self, pool: &SqlitePool, config: &Config) -> Result<(), SyncCommandError> {
        let engine = engine(pool, config)?;

        println!("Pulling from remote...");
        println!();

        let report = engine.pull_everything_and_overwrite().await;
        print_report(&report);

        let failed: Vec<&'static str> = report
            .failures()
            .iter()
            .map(|(entity, _)| *entity)
            .collect();
        if !failed.is_empty() {
            return Err(SyncCommandError::PullFailed(failed));
        }

        println!();
        println!("Local data now matches the remote.");
        Ok(())
    }
}

fn print_report(report: &PullReport) {
    for (entity, result) in [("bills", &report.bills), ("menu", &report.menu)] {
        match result {
            Ok(summary) => println!(
                "  ✓ {:<8} {} upserted, {} deleted",
                entity, summary.upserted, summary.deleted
            ),
            Err(e) => println!("  ✗ {:<8} {}", entity, e),
        }
    }
    match &report.settings {
        Ok(()) => println!("  ✓ {:<8} replaced", "settings"),
        Err(e) => println!("  ✗ {:<8} {}", "settings", e),
    }
}

/// Show sync configuration, local counts and remote reachability
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Skip the connectivity check
    #[arg(long)]
    offline: bool,
}

impl StatusCommand {
    pub async fn run(&self, pool: &SqlitePool, config: &Config) -> Result<(), SyncCommandError> {
        let bills = BillRepository::new(pool.clone());
        let menu = MenuRepository::new(pool.clone());
        let settings = SettingsRepository::new(pool.clone());

        println!("Local data");
        println!("==========");
        println!();
        println!("Database:      {}", config.database_path.value.display());
        println!("Bills:         {}", bills.count().await?);
        println!("  unsynced:    {}", bills.get_unsynced().await?.len());
        println!("Menu items:    {}", menu.count().await?);
        println!(
            "Settings:      {}",
            match settings.get().await? {
                Some(s) => s.shop_name,
                None => "(none)".to_string(),
            }
        );
        println!();

        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  sync:");
            println!("    endpoint: \"https://script.google.com/macros/s/<id>/exec\"");
            println!("    auto_sync: true");
            println!("    interval_ms: 600000");
            println!();
            println!("Or set environment variables:");
            println!("  POSSYNC_ENDPOINT");
            println!("  POSSYNC_AUTO_SYNC");
            println!("  POSSYNC_SYNC_INTERVAL_MS");
            return Ok(());
        }

        let client = RemoteClient::from_config(&config.sync)?;
        println!("Endpoint:  {}", client.endpoint());
        println!(
            "Auto-sync: {}",
            if config.sync.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!("Interval:  {:?}", config.sync.interval());
        println!();

        if self.offline {
            return Ok(());
        }

        let status = match client.read(ReadAction::GetSettings).await {
            Ok(_) => "✓ connected".to_string(),
            Err(e) if matches!(e.cause, RemoteFailure::Network(_)) => "✗ unreachable".to_string(),
            Err(e) => format!("✗ error: {}", e),
        };
        println!("Remote status: {}", status);

        Ok(())
    }
}

/// Run the background sync pass on a timer until interrupted
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Override the configured interval (milliseconds)
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Watch even when auto_sync is off in the config
    #[arg(long)]
    force: bool,
}

impl WatchCommand {
    pub async fn run(&self, pool: &SqlitePool, config: &Config) -> Result<(), SyncCommandError> {
        let engine = Arc::new(engine(pool, config)?);
        let interval = self
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.sync.interval());

        let mut scheduler = Scheduler::new(engine);
        scheduler.apply(self.force || config.sync.auto_sync, interval);

        let Some(interval) = scheduler.interval() else {
            println!("Auto-sync is disabled. Set sync.auto_sync: true or pass --force.");
            return Ok(());
        };
        println!("Watching every {:?}. Press Ctrl-C to stop.", interval);

        tokio::signal::ctrl_c().await?;
        scheduler.stop();
        Ok(())
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    Sync(SyncError),
    Store(StoreError),
    Signal(std::io::Error),
    BillNotFound(String),
    MenuItemNotFound(String),
    PushFailed(usize),
    PullFailed(Vec<&'static str>),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::Sync(e) => write!(f, "{}", e),
            SyncCommandError::Store(e) => write!(f, "{}", e),
            SyncCommandError::Signal(e) => write!(f, "Failed to listen for Ctrl-C: {}", e),
            SyncCommandError::BillNotFound(id) => write!(f, "Bill not found: {}", id),
            SyncCommandError::MenuItemNotFound(id) => write!(f, "Menu item not found: {}", id),
            SyncCommandError::PushFailed(n) => {
                write!(f, "{} bill{} failed to push", n, if *n == 1 { "" } else { "s" })
            }
            SyncCommandError::PullFailed(entities) => {
                write!(f, "Pull failed for: {}", entities.join(", "))
            }
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::Sync(e) => Some(e),
            SyncCommandError::Store(e) => Some(e),
            SyncCommandError::Signal(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SyncError> for SyncCommandError {
    fn from(e: SyncError) -> Self {
        SyncCommandError::Sync(e)
    }
}

impl From<StoreError> for SyncCommandError {
    fn from(e: StoreError) -> Self {
        SyncCommandError::Store(e)
    }
}

impl From<std::io::Error> for SyncCommandError {
    fn from(e: std::io::Error) -> Self {
        SyncCommandError::Signal(e)
    }
}
