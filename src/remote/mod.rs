//! Client side of the remote action API.
//!
//! The remote copy of the data sits behind a single HTTP endpoint that
//! understands a handful of named actions:
//!
//! - reads: `GET <endpoint>?action=<name>` for `listBills`, `listMenu`,
//!   `getSettings`
//! - writes: `POST <endpoint>` with a JSON body `{ "action": <name>, ...payload }`
//!   for `addBill`, `addMenu`, `saveSettings`, `syncAll`
//!
//! [`RemoteApi`] captures the two primitives plus the typed per-entity calls
//! built on top of them. [`RemoteClient`] is the HTTP implementation.

mod client;
mod error;

pub use client::RemoteClient;
pub use error::{RemoteError, RemoteFailure};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Bill, MenuItem, Settings};

/// Actions served by `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadAction {
    ListBills,
    ListMenu,
    GetSettings,
}

impl ReadAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadAction::ListBills => "listBills",
            ReadAction::ListMenu => "listMenu",
            ReadAction::GetSettings => "getSettings",
        }
    }
}

/// Actions served by `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteAction {
    AddBill,
    AddMenu,
    SaveSettings,
    SyncAll,
}

impl WriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteAction::AddBill => "addBill",
            WriteAction::AddMenu => "addMenu",
            WriteAction::SaveSettings => "saveSettings",
            WriteAction::SyncAll => "syncAll",
        }
    }
}

/// The remote action API.
///
/// Implementors provide [`read`](RemoteApi::read) and
/// [`write`](RemoteApi::write); the typed calls map onto them with fixed
/// action names. Nothing here retries or times out.
#[async_trait::async_trait]
pub trait RemoteApi: Send + Sync {
    /// Performs a read action and returns the parsed JSON body.
    async fn read(&self, action: ReadAction) -> Result<Value, RemoteError>;

    /// Performs a write action. `payload` fields are sent next to `action`
    /// in the request body.
    async fn write(
        &self,
        action: WriteAction,
        payload: Map<String, Value>,
    ) -> Result<Value, RemoteError>;

    async fn load_bills(&self) -> Result<Value, RemoteError> {
        self.read(ReadAction::ListBills).await
    }

    async fn load_menu(&self) -> Result<Value, RemoteError> {
        self.read(ReadAction::ListMenu).await
    }

    async fn load_settings(&self) -> Result<Value, RemoteError> {
        self.read(ReadAction::GetSettings).await
    }

    async fn push_bill(&self, bill: &Bill) -> Result<Value, RemoteError> {
        let action = WriteAction::AddBill;
        let payload = payload([("bill", encode(action, bill)?)]);
        self.write(action, payload).await
    }

    async fn push_menu_item(&self, item: &MenuItem) -> Result<Value, RemoteError> {
        let action = WriteAction::AddMenu;
        let payload = payload([("item", encode(action, item)?)]);
        self.write(action, payload).await
    }

    async fn push_settings(&self, settings: &Settings) -> Result<Value, RemoteError> {
        let action = WriteAction::SaveSettings;
        let payload = payload([("settings", encode(action, settings)?)]);
        self.write(action, payload).await
    }

    /// Sends every local record in one `syncAll` call. `settings` goes out
    /// as `null` when there is none.
    async fn push_full_snapshot(
        &self,
        bills: &[Bill],
        menu: &[MenuItem],
        settings: Option<&Settings>,
    ) -> Result<Value, RemoteError> {
        let action = WriteAction::SyncAll;
        let payload = payload([
            ("bills", encode(action, bills)?),
            ("menu", encode(action, menu)?),
            ("settings", encode(action, &settings)?),
        ]);
        self.write(action, payload).await
    }
}

fn encode<T: Serialize + ?Sized>(action: WriteAction, value: &T) -> Result<Value, RemoteError> {
    serde_json::to_value(value)
        .map_err(|e| RemoteError::new(action.as_str(), RemoteFailure::Encode(e.to_string())))
}

fn payload<const N: usize>(fields: [(&str, Value); N]) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
