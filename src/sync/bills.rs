//! Bill reconciliation.

use std::collections::HashSet;
use std::sync::Arc;

use super::{decode_records, PullSummary, SyncError};
use crate::models::Bill;
use crate::remote::RemoteApi;
use crate::store::BillStore;

/// Outcome of pushing one bill as part of a batch.
#[derive(Debug)]
pub struct BillPushResult {
    pub id: String,
    pub outcome: Result<(), SyncError>,
}

impl BillPushResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Pushes local bills to the remote and pulls the remote bill set back.
pub struct BillSync {
    remote: Arc<dyn RemoteApi>,
    store: Arc<dyn BillStore>,
}

impl BillSync {
    pub fn new(remote: Arc<dyn RemoteApi>, store: Arc<dyn BillStore>) -> Self {
        Self { remote, store }
    }

    /// Sends one bill to the remote, then marks the local copy as synced.
    ///
    /// The local store is only touched after the remote accepted the bill.
    pub async fn push_one(&self, bill: &Bill) -> Result<(), SyncError> {
        self.remote.push_bill(bill).await?;

        let synced = Bill {
            synced_to_cloud: true,
            ..bill.clone()
        };
        self.store.update(&synced).await?;

        tracing::debug!("Pushed bill {}", bill.id);
        Ok(())
    }

    /// Pushes every unsynced bill, one result per bill.
    ///
    /// A failing bill does not stop the rest of the batch. Only a failure to
    /// list the unsynced bills fails the call as a whole.
    pub async fn push_all_unsynced(&self) -> Result<Vec<BillPushResult>, SyncError> {
        let unsynced = self.store.get_unsynced().await?;
        let mut results = Vec::with_capacity(unsynced.len());

        for bill in &unsynced {
            let outcome = self.push_one(bill).await;
            if let Err(e) = &outcome {
                tracing::warn!("Failed to push bill {}: {}", bill.id, e);
            }
            results.push(BillPushResult {
                id: bill.id.clone(),
                outcome,
            });
        }

        Ok(results)
    }

    /// Replaces the local bill set with the remote one.
    ///
    /// Every remote bill is upserted and marked synced; afterwards, local
    /// bills the remote does not have are deleted. Deletes that fail are
    /// ignored. A transport error or malformed payload leaves local state
    /// untouched.
    pub async fn pull_and_overwrite(&self) -> Result<PullSummary, SyncError> {
        let payload = self.remote.load_bills().await?;
        let remote_bills: Vec<Bill> = decode_records("bills", payload)?;
        let local_bills = self.store.get_all().await?;

        let remote_ids: HashSet<&str> = remote_bills.iter().map(|b| b.id.as_str()).collect();
        let mut summary = PullSummary::default();

        for bill in &remote_bills {
            let synced = Bill {
                synced_to_cloud: true,
                ..bill.clone()
            };
            self.store.upsert(&synced).await?;
            summary.upserted += 1;
        }

        for bill in local_bills
            .iter()
            .filter(|b| !remote_ids.contains(b.id.as_str()))
        {
            match self.store.delete(&bill.id).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => tracing::debug!("Ignoring failed delete of bill {}: {}", bill.id, e),
            }
        }

        tracing::info!(
            "Pulled bills: {} upserted, {} deleted",
            summary.upserted,
            summary.deleted
        );
        Ok(summary)
    }
}
