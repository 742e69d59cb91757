//! # Web API Error Types
//!
//! Error types specific to the web API and their HTTP response conversions.
//! Leverages thiserror for structured error handling and Axum's IntoResponse
//! for HTTP conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::services::LifecycleError;
use crate::state_machine::RequestStatus;

/// Web API specific errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Invalid request: {message}")]
    BadRequest {
        message: String,
        /// Legal targets when the failure was an illegal status transition
        allowed_transitions: Option<Vec<RequestStatus>>,
    },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid UUID format: {uuid}")]
    InvalidUuid { uuid: String },

    #[error("Database operation failed: {message}")]
    DatabaseError { message: String },
}

impl ApiError {
    pub fn invalid_uuid(uuid: impl Into<String>) -> Self {
        Self::InvalidUuid { uuid: uuid.into() }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::NotFound { .. } => Self::NotFound {
                message: error.to_string(),
            },
            LifecycleError::Transition(ref transition) => Self::BadRequest {
                message: error.to_string(),
                allowed_transitions: Some(transition.allowed_targets().to_vec()),
            },
            LifecycleError::Validation(_) | LifecycleError::Query(_) => Self::BadRequest {
                message: error.to_string(),
                allowed_transitions: None,
            },
            LifecycleError::ConcurrentModification { .. } => Self::Conflict {
                message: error.to_string(),
            },
            LifecycleError::Store(_) => Self::DatabaseError {
                message: error.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code) = match &self {
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::InvalidUuid { .. } => (StatusCode::BAD_REQUEST, "INVALID_UUID"),
            ApiError::DatabaseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
        };

        let mut body = json!({
            "error": error_code,
            "message": self.to_string(),
        });
        if let ApiError::BadRequest {
            allowed_transitions: Some(allowed),
            ..
        } = &self
        {
            body["allowed_transitions"] = json!(allowed);
        }

        (status_code, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::TransitionError;
    use uuid::Uuid;

    #[test]
    fn test_not_found_maps_to_404() {
        let api_error: ApiError = LifecycleError::NotFound { id: Uuid::new_v4() }.into();
        assert!(matches!(api_error, ApiError::NotFound { .. }));
    }

    #[test]
    fn test_transition_error_carries_allowed_targets() {
        let api_error: ApiError = LifecycleError::Transition(TransitionError::InvalidTransition {
            current: RequestStatus::Approved,
            target: RequestStatus::Rejected,
            allowed: vec![RequestStatus::Resolved, RequestStatus::Cancelled],
        })
        .into();

        match api_error {
            ApiError::BadRequest {
                allowed_transitions: Some(allowed),
                ..
            } => assert_eq!(
                allowed,
                vec![RequestStatus::Resolved, RequestStatus::Cancelled]
            ),
            other => panic!("expected BadRequest with allowed set, got {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_modification_maps_to_conflict() {
        let api_error: ApiError =
            LifecycleError::ConcurrentModification { id: Uuid::new_v4() }.into();
        assert!(matches!(api_error, ApiError::Conflict { .. }));
    }
}
