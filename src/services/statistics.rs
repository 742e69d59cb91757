use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{RequestStore, StoreError};
use crate::state_machine::{RequestStatus, WorkflowKind};

/// Per-status counts for dashboarding.
///
/// Every status the workflow declares is present even at zero, so consumers
/// never special-case missing keys. Serializes flat:
/// `{"total": 3, "submitted": 2, "approved": 1, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusStatistics {
    pub total: u64,
    #[serde(flatten)]
    pub by_status: BTreeMap<RequestStatus, u64>,
}

impl StatusStatistics {
    pub fn count(&self, status: RequestStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// One grouped aggregate over the store, zero-filled across the kind's
/// declared status set.
pub async fn collect<S: RequestStore>(
    kind: WorkflowKind,
    store: &S,
) -> Result<StatusStatistics, StoreError> {
    let counts = store.count_by_status().await?;

    let mut by_status = BTreeMap::new();
    for status in kind.statuses() {
        by_status.insert(*status, counts.get(status).copied().unwrap_or(0));
    }
    let total = by_status.values().sum();

    Ok(StatusStatistics { total, by_status })
}
