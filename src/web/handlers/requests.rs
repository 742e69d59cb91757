//! # Request Lifecycle Handlers
//!
//! HTTP handlers for creating, listing, reviewing and cancelling reviewable
//! requests. One router instance per workflow kind; the handlers are generic
//! over the store backend.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::models::{RequestStore, ReviewRequest};
use crate::query_builder::{Page, RequestFilter};
use crate::services::{CreateRequest, ListQuery, StatusStatistics};
use crate::state_machine::RequestStatus;
use crate::web::response_types::{ApiError, ApiResult};
use crate::web::state::WorkflowState;

/// Request body for creation
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub subject_type: String,
    pub subject_id: String,
    pub requested_by: String,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default)]
    pub supporting_docs: Vec<String>,
}

/// Query parameters for request listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<RequestStatus>,
    pub subject_type: Option<String>,
    pub subject_id: Option<String>,
    pub requested_by: Option<String>,
    pub reviewed_by: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        ListQuery {
            filter: RequestFilter {
                status: params.status,
                subject_type: params.subject_type,
                subject_id: params.subject_id,
                requested_by: params.requested_by,
                reviewed_by: params.reviewed_by,
                search: params.search,
            },
            page: params.page,
            limit: params.limit,
            sort_by: params.sort_by,
            sort_order: params.sort_order,
        }
    }
}

/// Request body for a review transition
#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: RequestStatus,
    pub reviewed_by: String,
    pub comments: Option<String>,
}

/// Query parameters for cancellation
#[derive(Debug, Deserialize)]
pub struct CancelParams {
    pub cancelled_by: String,
}

/// Request body for appending supporting documents
#[derive(Debug, Deserialize)]
pub struct DocumentsBody {
    pub documents: Vec<String>,
}

fn parse_request_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_uuid(raw))
}

/// Create a new request: POST /
pub async fn create<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<(StatusCode, Json<ReviewRequest>)> {
    let request = service
        .create(CreateRequest {
            subject_type: body.subject_type,
            subject_id: body.subject_id,
            requested_by: body.requested_by,
            payload: body.payload.unwrap_or_else(|| serde_json::json!({})),
            supporting_docs: body.supporting_docs,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Filtered, paginated listing: GET /
pub async fn list<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<ReviewRequest>>> {
    let page = service.list(params.into()).await?;
    Ok(Json(page))
}

/// Fetch one request: GET /{id}
pub async fn get_request<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReviewRequest>> {
    let id = parse_request_id(&id)?;
    debug!(request_id = %id, workflow = %service.kind(), "Retrieving request");
    Ok(Json(service.get(id).await?))
}

/// Review transition: PUT /{id}
pub async fn update_status<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> ApiResult<Json<ReviewRequest>> {
    let id = parse_request_id(&id)?;
    let updated = service
        .update_status(id, body.status, &body.reviewed_by, body.comments)
        .await?;
    Ok(Json(updated))
}

/// Soft cancel: DELETE /{id}?cancelled_by=
pub async fn cancel<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
    Path(id): Path<String>,
    Query(params): Query<CancelParams>,
) -> ApiResult<Json<ReviewRequest>> {
    let id = parse_request_id(&id)?;
    Ok(Json(service.cancel(id, &params.cancelled_by).await?))
}

/// Append supporting documents: POST /{id}/documents
pub async fn add_documents<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
    Path(id): Path<String>,
    Json(body): Json<DocumentsBody>,
) -> ApiResult<Json<ReviewRequest>> {
    let id = parse_request_id(&id)?;
    Ok(Json(service.add_documents(id, body.documents).await?))
}

/// All requests for one domain object: GET /resource/{subject_type}/{subject_id}
pub async fn for_subject<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
    Path((subject_type, subject_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<ReviewRequest>>> {
    Ok(Json(service.for_subject(&subject_type, &subject_id).await?))
}

/// Requests awaiting their first transition, oldest first: GET /pending
pub async fn pending<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
) -> ApiResult<Json<Vec<ReviewRequest>>> {
    Ok(Json(service.pending().await?))
}

/// Per-status counts: GET /stats
pub async fn statistics<S: RequestStore + 'static>(
    State(service): State<WorkflowState<S>>,
) -> ApiResult<Json<StatusStatistics>> {
    Ok(Json(service.statistics().await?))
}
