use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    CasOutcome, NewReviewRequest, RequestStore, ReviewRequest, StatusChange, StoreError,
};
use crate::query_builder::{PageRequest, RequestFilter, SortField, SortOrder, SortSpec};
use crate::state_machine::RequestStatus;

/// Mutex-guarded in-memory request store with the same compare-and-set
/// semantics as the Postgres store: conditional writes check the expected
/// status under the lock, so racing writers observe exactly one winner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRequestStore {
    rows: Arc<Mutex<HashMap<Uuid, ReviewRequest>>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    fn matches(filter: &RequestFilter, request: &ReviewRequest) -> bool {
        let eq = |expected: &Option<String>, actual: &str| {
            expected
                .as_deref()
                .filter(|e| !e.is_empty())
                .map_or(true, |e| e == actual)
        };

        if let Some(status) = filter.status {
            if request.status != status {
                return false;
            }
        }
        if !eq(&filter.subject_type, &request.subject_type) {
            return false;
        }
        if !eq(&filter.subject_id, &request.subject_id) {
            return false;
        }
        if !eq(&filter.requested_by, &request.requested_by) {
            return false;
        }
        if !eq(
            &filter.reviewed_by,
            request.reviewed_by.as_deref().unwrap_or(""),
        ) {
            return false;
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let comments = request.comments.as_deref().unwrap_or("").to_lowercase();
            let payload = request.payload.to_string().to_lowercase();
            if !comments.contains(&needle) && !payload.contains(&needle) {
                return false;
            }
        }
        true
    }

    fn compare(sort: &SortSpec, a: &ReviewRequest, b: &ReviewRequest) -> Ordering {
        let ordering = match sort.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::DecisionDate => a.decision_date.cmp(&b.decision_date),
            SortField::Status => a.status.to_string().cmp(&b.status.to_string()),
        };
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    fn sorted(&self, mut rows: Vec<ReviewRequest>, sort: &SortSpec) -> Vec<ReviewRequest> {
        rows.sort_by(|a, b| Self::compare(sort, a, b));
        rows
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn create(&self, new_request: NewReviewRequest) -> Result<ReviewRequest, StoreError> {
        let now = Utc::now();
        let request = ReviewRequest {
            id: Uuid::new_v4(),
            subject_type: new_request.subject_type,
            subject_id: new_request.subject_id,
            requested_by: new_request.requested_by,
            reviewed_by: None,
            status: new_request.status,
            decision_date: None,
            comments: None,
            payload: new_request.payload,
            supporting_docs: new_request.supporting_docs,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewRequest>, StoreError> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &RequestFilter,
        page: &PageRequest,
        sort: &SortSpec,
    ) -> Result<(Vec<ReviewRequest>, u64), StoreError> {
        let matching: Vec<ReviewRequest> = self
            .rows
            .lock()
            .values()
            .filter(|request| Self::matches(filter, request))
            .cloned()
            .collect();
        let total = matching.len() as u64;

        let sorted = self.sorted(matching, sort);
        let data = sorted
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((data, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: RequestStatus,
        change: &StatusChange,
    ) -> Result<CasOutcome, StoreError> {
        let mut rows = self.rows.lock();
        let Some(request) = rows.get_mut(&id) else {
            return Ok(CasOutcome::Missing);
        };
        if request.status != expected {
            return Ok(CasOutcome::StatusChanged);
        }

        request.status = change.target;
        request.reviewed_by = Some(change.reviewed_by.clone());
        if let Some(comments) = &change.comments {
            request.comments = Some(comments.clone());
        }
        if let Some(decision_date) = change.decision_date {
            request.decision_date = Some(decision_date);
        }
        request.updated_at = Utc::now();
        Ok(CasOutcome::Updated(request.clone()))
    }

    async fn append_documents(
        &self,
        id: Uuid,
        allowed_statuses: &[RequestStatus],
        documents: &[String],
    ) -> Result<CasOutcome, StoreError> {
        let mut rows = self.rows.lock();
        let Some(request) = rows.get_mut(&id) else {
            return Ok(CasOutcome::Missing);
        };
        if !allowed_statuses.contains(&request.status) {
            return Ok(CasOutcome::StatusChanged);
        }

        request.supporting_docs.extend_from_slice(documents);
        request.updated_at = Utc::now();
        Ok(CasOutcome::Updated(request.clone()))
    }

    async fn count_by_status(&self) -> Result<HashMap<RequestStatus, u64>, StoreError> {
        let mut counts = HashMap::new();
        for request in self.rows.lock().values() {
            *counts.entry(request.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn for_subject(
        &self,
        subject_type: &str,
        subject_id: &str,
    ) -> Result<Vec<ReviewRequest>, StoreError> {
        let matching: Vec<ReviewRequest> = self
            .rows
            .lock()
            .values()
            .filter(|r| r.subject_type == subject_type && r.subject_id == subject_id)
            .cloned()
            .collect();
        Ok(self.sorted(matching, &SortSpec::default()))
    }

    async fn with_status(
        &self,
        status: RequestStatus,
        oldest_first: bool,
    ) -> Result<Vec<ReviewRequest>, StoreError> {
        let matching: Vec<ReviewRequest> = self
            .rows
            .lock()
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        let order = if oldest_first {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        };
        Ok(self.sorted(matching, &SortSpec::new(SortField::CreatedAt, order)))
    }

    async fn by_requester(&self, requested_by: &str) -> Result<Vec<ReviewRequest>, StoreError> {
        let matching: Vec<ReviewRequest> = self
            .rows
            .lock()
            .values()
            .filter(|r| r.requested_by == requested_by)
            .cloned()
            .collect();
        Ok(self.sorted(matching, &SortSpec::default()))
    }

    async fn by_reviewer(&self, reviewed_by: &str) -> Result<Vec<ReviewRequest>, StoreError> {
        let matching: Vec<ReviewRequest> = self
            .rows
            .lock()
            .values()
            .filter(|r| r.reviewed_by.as_deref() == Some(reviewed_by))
            .cloned()
            .collect();
        Ok(self.sorted(
            matching,
            &SortSpec::new(SortField::DecisionDate, SortOrder::Desc),
        ))
    }
}
