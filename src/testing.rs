//! In-process stand-ins for the remote endpoint and the local store.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::db::{init_db, BillRepository, MenuRepository, SettingsRepository};
use crate::models::{Bill, MenuItem, Settings};
use crate::remote::{ReadAction, RemoteApi, RemoteError, RemoteFailure, WriteAction};
use crate::store::{BillStore, MenuStore, SettingsStore, StoreError};

#[derive(Default)]
struct FakeState {
    bills: Value,
    menu: Value,
    settings: Value,
    failing_reads: HashSet<ReadAction>,
    failing_writes: HashSet<WriteAction>,
    failing_bills: HashSet<String>,
    writes: Vec<(WriteAction, Map<String, Value>)>,
}

/// Remote endpoint held in memory. Reads return whatever was configured,
/// writes are recorded.
pub struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                bills: json!([]),
                menu: json!([]),
                settings: Value::Null,
                ..FakeState::default()
            }),
        }
    }

    pub fn set_bills(&self, bills: Value) {
        self.state.lock().unwrap().bills = bills;
    }

    pub fn set_menu(&self, menu: Value) {
        self.state.lock().unwrap().menu = menu;
    }

    pub fn set_settings(&self, settings: Value) {
        self.state.lock().unwrap().settings = settings;
    }

    /// Makes every call to `action` answer with HTTP 500.
    pub fn fail_read(&self, action: ReadAction) {
        self.state.lock().unwrap().failing_reads.insert(action);
    }

    pub fn fail_write(&self, action: WriteAction) {
        self.state.lock().unwrap().failing_writes.insert(action);
    }

    /// Makes `addBill` fail for this bill id only.
    pub fn fail_bill(&self, id: &str) {
        self.state.lock().unwrap().failing_bills.insert(id.to_string());
    }

    /// Payloads of every write attempted for `action`, failed ones included.
    pub fn writes(&self, action: WriteAction) -> Vec<Map<String, Value>> {
        self.state
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(a, _)| *a == action)
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl RemoteApi for FakeRemote {
    async fn read(&self, action: ReadAction) -> Result<Value, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.failing_reads.contains(&action) {
            return Err(RemoteError::new(action.as_str(), RemoteFailure::Status(500)));
        }
        Ok(match action {
            ReadAction::ListBills => state.bills.clone(),
            ReadAction::ListMenu => state.menu.clone(),
            ReadAction::GetSettings => state.settings.clone(),
        })
    }

    async fn write(
        &self,
        action: WriteAction,
        payload: Map<String, Value>,
    ) -> Result<Value, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let bill_id = payload
            .get("bill")
            .and_then(|b| b.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        state.writes.push((action, payload));

        let bill_rejected = bill_id.is_some_and(|id| state.failing_bills.contains(&id));
        if state.failing_writes.contains(&action) || bill_rejected {
            return Err(RemoteError::new(action.as_str(), RemoteFailure::Status(500)));
        }
        Ok(json!({ "ok": true }))
    }
}

/// Local store held in memory, for tests that run on paused tokio time.
#[derive(Default)]
pub struct MemoryStore {
    bills: Mutex<BTreeMap<String, Bill>>,
    menu: Mutex<BTreeMap<String, MenuItem>>,
    settings: Mutex<Option<Settings>>,
    failing_upserts: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn bill(&self, id: &str) -> Option<Bill> {
        self.bills.lock().unwrap().get(id).cloned()
    }

    /// Makes `upsert` of this id fail, for bills and menu items alike.
    pub fn fail_upsert(&self, id: &str) {
        self.failing_upserts.lock().unwrap().insert(id.to_string());
    }

    fn check_upsert(&self, id: &str) -> Result<(), StoreError> {
        if self.failing_upserts.lock().unwrap().contains(id) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BillStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self.bills.lock().unwrap().values().cloned().collect())
    }

    async fn get_unsynced(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self
            .bills
            .lock()
            .unwrap()
            .values()
            .filter(|b| !b.synced_to_cloud)
            .cloned()
            .collect())
    }

    async fn create(&self, bill: &Bill) -> Result<(), StoreError> {
        let mut bills = self.bills.lock().unwrap();
        if bills.contains_key(&bill.id) {
            return Err(StoreError::AlreadyExists(bill.id.clone()));
        }
        bills.insert(bill.id.clone(), bill.clone());
        Ok(())
    }

    async fn update(&self, bill: &Bill) -> Result<(), StoreError> {
        match self.bills.lock().unwrap().get_mut(&bill.id) {
            Some(existing) => {
                *existing = bill.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(bill.id.clone())),
        }
    }

    async fn upsert(&self, bill: &Bill) -> Result<(), StoreError> {
        self.check_upsert(&bill.id)?;
        self.bills
            .lock()
            .unwrap()
            .insert(bill.id.clone(), bill.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.bills
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait::async_trait]
impl MenuStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<MenuItem>, StoreError> {
        Ok(self.menu.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, item: &MenuItem) -> Result<(), StoreError> {
        let mut menu = self.menu.lock().unwrap();
        if menu.contains_key(&item.id) {
            return Err(StoreError::AlreadyExists(item.id.clone()));
        }
        menu.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn update(&self, item: &MenuItem) -> Result<(), StoreError> {
        match self.menu.lock().unwrap().get_mut(&item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(item.id.clone())),
        }
    }

    async fn upsert(&self, item: &MenuItem) -> Result<(), StoreError> {
        self.check_upsert(&item.id)?;
        self.menu
            .lock()
            .unwrap()
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.menu
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self) -> Result<Option<Settings>, StoreError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        *self.settings.lock().unwrap() = Some(settings.clone());
        Ok(())
    }
}

/// SQLite-backed repositories over a throwaway database.
pub struct SqliteFixture {
    pub pool: SqlitePool,
    pub bills: Arc<BillRepository>,
    pub menu: Arc<MenuRepository>,
    pub settings: Arc<SettingsRepository>,
    _temp_dir: TempDir, // Keep alive for duration of test
}

impl SqliteFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        Self {
            bills: Arc::new(BillRepository::new(pool.clone())),
            menu: Arc::new(MenuRepository::new(pool.clone())),
            settings: Arc::new(SettingsRepository::new(pool.clone())),
            pool,
            _temp_dir: temp_dir,
        }
    }
}

/// Sorted ids, for comparing record sets.
pub fn ids<T>(records: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
    let mut ids: Vec<String> = records.iter().map(|r| id(r).to_string()).collect();
    ids.sort();
    ids
}
