// HTTP surface: one nested sub-router per workflow instance, sharing the
// same generic handlers.

pub mod handlers;
pub mod response_types;
pub mod state;

pub use response_types::{ApiError, ApiResult};
pub use state::{EngineState, WorkflowState};

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::models::RequestStore;

/// Routes for one workflow instance, rooted at the caller's chosen base path
pub fn workflow_routes<S: RequestStore + 'static>(service: WorkflowState<S>) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::requests::create::<S>).get(handlers::requests::list::<S>),
        )
        .route("/pending", get(handlers::requests::pending::<S>))
        .route("/stats", get(handlers::requests::statistics::<S>))
        .route(
            "/resource/:subject_type/:subject_id",
            get(handlers::requests::for_subject::<S>),
        )
        .route(
            "/:id",
            get(handlers::requests::get_request::<S>)
                .put(handlers::requests::update_status::<S>)
                .delete(handlers::requests::cancel::<S>),
        )
        .route(
            "/:id/documents",
            post(handlers::requests::add_documents::<S>),
        )
        .with_state(service)
}

/// Full application router for the server binary
pub fn app_router(state: &EngineState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/v1/approvals", workflow_routes(state.approvals.clone()))
        .nest("/v1/claims", workflow_routes(state.claims.clone()))
        .layer(TraceLayer::new_for_http())
}
