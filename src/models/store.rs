use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::query_builder::{PageRequest, RequestFilter, SortSpec};
use crate::state_machine::RequestStatus;

use super::request::{NewReviewRequest, ReviewRequest};

/// Errors surfaced by a request store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record {id}: {detail}")]
    Corrupt { id: Uuid, detail: String },
}

/// Outcome of a compare-and-set write.
///
/// A conditional update that touches zero rows is ambiguous on its own; the
/// store re-checks existence so callers can distinguish a missing record
/// from one another writer changed between read and write.
#[derive(Debug)]
pub enum CasOutcome {
    Updated(ReviewRequest),
    Missing,
    StatusChanged,
}

/// Field set written by a status transition
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub target: RequestStatus,
    pub reviewed_by: String,
    pub comments: Option<String>,
    /// Present iff the target status is decision-bearing
    pub decision_date: Option<DateTime<Utc>>,
}

/// Persistence seam for reviewable requests.
///
/// Backed by Postgres in production ([`super::request::PgRequestStore`]) and
/// by an in-memory map for tests and embedded use
/// ([`crate::test_helpers::InMemoryRequestStore`]).
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Persist a new request, assigning id and audit timestamps
    async fn create(&self, new_request: NewReviewRequest) -> Result<ReviewRequest, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewRequest>, StoreError>;

    /// Filtered, sorted page of requests plus the total match count
    async fn list(
        &self,
        filter: &RequestFilter,
        page: &PageRequest,
        sort: &SortSpec,
    ) -> Result<(Vec<ReviewRequest>, u64), StoreError>;

    /// Compare-and-set status write conditioned on the status observed at
    /// read time. Never touches rows whose status moved in the meantime.
    async fn update_status(
        &self,
        id: Uuid,
        expected: RequestStatus,
        change: &StatusChange,
    ) -> Result<CasOutcome, StoreError>;

    /// Append-only document write, guarded so it only lands while the record
    /// is still in one of `allowed_statuses`. Never touches `status`.
    async fn append_documents(
        &self,
        id: Uuid,
        allowed_statuses: &[RequestStatus],
        documents: &[String],
    ) -> Result<CasOutcome, StoreError>;

    /// Grouped count per status; statuses with no rows are simply absent
    async fn count_by_status(&self) -> Result<HashMap<RequestStatus, u64>, StoreError>;

    /// All requests concerning one domain object, newest first
    async fn for_subject(
        &self,
        subject_type: &str,
        subject_id: &str,
    ) -> Result<Vec<ReviewRequest>, StoreError>;

    /// All requests in one status; oldest first suits review queues
    async fn with_status(
        &self,
        status: RequestStatus,
        oldest_first: bool,
    ) -> Result<Vec<ReviewRequest>, StoreError>;

    /// All requests submitted by one user, newest first
    async fn by_requester(&self, requested_by: &str) -> Result<Vec<ReviewRequest>, StoreError>;

    /// All requests decided by one reviewer, most recent decision first
    async fn by_reviewer(&self, reviewed_by: &str) -> Result<Vec<ReviewRequest>, StoreError>;
}
