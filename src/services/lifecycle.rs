use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::events::{NotificationRequest, NotificationSink};
use crate::logging;
use crate::models::{
    CasOutcome, NewReviewRequest, RequestStore, ReviewRequest, StatusChange, StoreError,
};
use crate::query_builder::{
    Page, PageRequest, QueryError, RequestFilter, SortField, SortOrder, SortSpec,
    DEFAULT_PAGE_SIZE,
};
use crate::state_machine::{RequestStatus, TransitionError, WorkflowKind};

use super::statistics::{self, StatusStatistics};

/// Errors surfaced by lifecycle operations, mapped to HTTP statuses by the
/// web layer (404 / 400 / 409 / 500).
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("request {id} not found")]
    NotFound { id: Uuid },

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("request {id} was modified concurrently; re-fetch and retry")]
    ConcurrentModification { id: Uuid },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

/// Input for request creation; the engine assigns id, status and timestamps
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub subject_type: String,
    pub subject_id: String,
    pub requested_by: String,
    pub payload: serde_json::Value,
    pub supporting_docs: Vec<String>,
}

/// Unvalidated list specification as it arrives from the caller; defaults
/// and bounds are applied here, not in the web layer.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: RequestFilter,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    fn page_request(&self) -> Result<PageRequest, QueryError> {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    fn sort_spec(&self) -> Result<SortSpec, QueryError> {
        let field = match &self.sort_by {
            Some(raw) => SortField::parse(raw)?,
            None => SortField::default(),
        };
        let order = match &self.sort_order {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::default(),
        };
        Ok(SortSpec::new(field, order))
    }
}

/// Orchestrates create / get / list / transition / cancel operations for one
/// workflow kind. Transition legality is delegated to the kind's table and
/// persistence to the store; the service owns the compare-and-set discipline
/// and the post-commit notification hook.
pub struct LifecycleService<S: RequestStore> {
    kind: WorkflowKind,
    store: S,
    notifier: Arc<dyn NotificationSink>,
}

impl<S: RequestStore> LifecycleService<S> {
    pub fn new(kind: WorkflowKind, store: S, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            kind,
            store,
            notifier,
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    /// Create a new request in the workflow's initial state
    pub async fn create(&self, input: CreateRequest) -> LifecycleResult<ReviewRequest> {
        if input.subject_type.is_empty() {
            return Err(LifecycleError::Validation(
                "subject_type cannot be empty".to_string(),
            ));
        }
        if input.subject_id.is_empty() {
            return Err(LifecycleError::Validation(
                "subject_id cannot be empty".to_string(),
            ));
        }
        if input.requested_by.is_empty() {
            return Err(LifecycleError::Validation(
                "requested_by cannot be empty".to_string(),
            ));
        }

        let request = self
            .store
            .create(NewReviewRequest {
                subject_type: input.subject_type,
                subject_id: input.subject_id,
                requested_by: input.requested_by,
                status: self.kind.initial_status(),
                payload: input.payload,
                supporting_docs: input.supporting_docs,
            })
            .await?;

        logging::log_request_operation(
            "create",
            self.kind,
            Some(request.id),
            &request.status.to_string(),
            None,
        );
        Ok(request)
    }

    pub async fn get(&self, id: Uuid) -> LifecycleResult<ReviewRequest> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound { id })
    }

    /// Filtered, paginated, sorted listing. Never mutates.
    pub async fn list(&self, query: ListQuery) -> LifecycleResult<Page<ReviewRequest>> {
        let page_request = query.page_request()?;
        let sort = query.sort_spec()?;
        let (data, total) = self.store.list(&query.filter, &page_request, &sort).await?;
        Ok(Page::new(data, total, &page_request))
    }

    /// Transition a request to `target`, recording the reviewer and optional
    /// comments. The write is conditioned on the status observed here; a
    /// concurrent writer surfaces as [`LifecycleError::ConcurrentModification`].
    pub async fn update_status(
        &self,
        id: Uuid,
        target: RequestStatus,
        reviewed_by: &str,
        comments: Option<String>,
    ) -> LifecycleResult<ReviewRequest> {
        if reviewed_by.is_empty() {
            return Err(LifecycleError::Validation(
                "reviewed_by cannot be empty".to_string(),
            ));
        }

        let current = self.get(id).await?;
        let table = self.kind.transition_table();

        // Terminal records are read-only; fail before consulting edge sets so
        // the error names the real problem rather than a missing edge.
        if table.is_terminal(current.status) {
            return Err(TransitionError::InvalidTransition {
                current: current.status,
                target,
                allowed: vec![],
            }
            .into());
        }
        table.validate(current.status, target)?;

        let change = StatusChange {
            target,
            reviewed_by: reviewed_by.to_string(),
            comments,
            decision_date: target.is_decision_bearing().then(Utc::now),
        };

        match self.store.update_status(id, current.status, &change).await? {
            CasOutcome::Updated(updated) => {
                logging::log_request_operation(
                    "update_status",
                    self.kind,
                    Some(updated.id),
                    &updated.status.to_string(),
                    Some(&format!("from {}", current.status)),
                );
                self.notify_transition(&updated, current.status, target).await;
                Ok(updated)
            }
            CasOutcome::Missing => Err(LifecycleError::NotFound { id }),
            CasOutcome::StatusChanged => Err(LifecycleError::ConcurrentModification { id }),
        }
    }

    /// Soft-cancel: sugar over the general transition to `Cancelled`
    pub async fn cancel(&self, id: Uuid, cancelled_by: &str) -> LifecycleResult<ReviewRequest> {
        self.update_status(
            id,
            RequestStatus::Cancelled,
            cancelled_by,
            Some("Request cancelled by user".to_string()),
        )
        .await
    }

    /// Append supporting documents. Payload-only: never touches `status`,
    /// allowed in any non-terminal state.
    pub async fn add_documents(
        &self,
        id: Uuid,
        documents: Vec<String>,
    ) -> LifecycleResult<ReviewRequest> {
        if documents.is_empty() {
            return Err(LifecycleError::Validation(
                "documents cannot be empty".to_string(),
            ));
        }

        let current = self.get(id).await?;
        let table = self.kind.transition_table();
        if table.is_terminal(current.status) {
            return Err(LifecycleError::Validation(format!(
                "cannot append documents to a request in terminal status {}",
                current.status
            )));
        }

        let non_terminal: Vec<RequestStatus> = self
            .kind
            .statuses()
            .iter()
            .copied()
            .filter(|status| !table.is_terminal(*status))
            .collect();

        match self
            .store
            .append_documents(id, &non_terminal, &documents)
            .await?
        {
            CasOutcome::Updated(updated) => Ok(updated),
            CasOutcome::Missing => Err(LifecycleError::NotFound { id }),
            CasOutcome::StatusChanged => Err(LifecycleError::ConcurrentModification { id }),
        }
    }

    /// All requests concerning one domain object, newest first
    pub async fn for_subject(
        &self,
        subject_type: &str,
        subject_id: &str,
    ) -> LifecycleResult<Vec<ReviewRequest>> {
        Ok(self.store.for_subject(subject_type, subject_id).await?)
    }

    /// Requests still awaiting their first transition, oldest first
    pub async fn pending(&self) -> LifecycleResult<Vec<ReviewRequest>> {
        Ok(self
            .store
            .with_status(self.kind.initial_status(), true)
            .await?)
    }

    pub async fn by_requester(&self, requested_by: &str) -> LifecycleResult<Vec<ReviewRequest>> {
        Ok(self.store.by_requester(requested_by).await?)
    }

    pub async fn by_reviewer(&self, reviewed_by: &str) -> LifecycleResult<Vec<ReviewRequest>> {
        Ok(self.store.by_reviewer(reviewed_by).await?)
    }

    /// Counts per status for dashboarding; every declared status is present
    pub async fn statistics(&self) -> LifecycleResult<StatusStatistics> {
        Ok(statistics::collect(self.kind, &self.store).await?)
    }

    /// Fire-and-forget: invoked after the write has committed, and any sink
    /// failure is logged, never propagated to the caller.
    async fn notify_transition(
        &self,
        request: &ReviewRequest,
        from: RequestStatus,
        to: RequestStatus,
    ) {
        let notification = NotificationRequest::for_transition(
            self.kind,
            request.id,
            &request.requested_by,
            from,
            to,
        );
        if let Err(error) = self.notifier.send(notification).await {
            warn!(
                request_id = %request.id,
                workflow = %self.kind,
                error = %error,
                "notification emission failed; transition already committed"
            );
        }
    }
}
