//! Reconciliation between the local store and the remote copy.
//!
//! Each entity class has its own reconciler:
//! - [`BillSync`]: push single bills or every unsynced bill, and pull the
//!   remote bill set over the local one
//! - [`MenuSync`]: pull the remote menu over the local one, push single items
//! - [`SettingsSync`]: pull or push the settings singleton
//!
//! [`SyncEngine`] sequences them, and [`Scheduler`] drives the engine's
//! background pass on a timer.
//!
//! A pull always upserts every remote record before deleting any local record
//! that the remote set no longer contains, and nothing is deleted unless the
//! remote set was fetched and decoded successfully.

mod bills;
mod engine;
mod error;
mod menu;
mod scheduler;
mod settings;

pub use bills::{BillPushResult, BillSync};
pub use engine::{PullReport, SyncEngine};
pub use error::SyncError;
pub use menu::MenuSync;
pub use scheduler::Scheduler;
pub use settings::SettingsSync;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Counts from one pull-and-overwrite pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullSummary {
    /// Remote records written locally
    pub upserted: usize,
    /// Local records removed because the remote no longer has them
    pub deleted: usize,
}

/// Decodes a remote list payload into records.
///
/// Anything other than a JSON array of decodable records is rejected as a
/// whole, so a malformed response never reaches the delete step.
fn decode_records<T: DeserializeOwned>(
    entity: &'static str,
    payload: Value,
) -> Result<Vec<T>, SyncError> {
    let records = match payload {
        Value::Array(records) => records,
        other => {
            return Err(SyncError::invalid_shape(
                entity,
                format!("expected an array, got {}", json_kind(&other)),
            ))
        }
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record)
                .map_err(|e| SyncError::invalid_shape(entity, format!("record {}: {}", index, e)))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
