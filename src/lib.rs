//! # Review Lifecycle Engine
//!
//! A parameterized lifecycle engine for reviewable requests. Two workflow
//! instances — approval requests and warranty claims — share one lifecycle
//! service, differing only in their transition tables and backing tables.
//!
//! Core pieces:
//! - [`state_machine`]: status set and per-kind transition tables (the only
//!   authority on legal state changes)
//! - [`models`]: the request entity and the persistence seam, with a
//!   Postgres implementation using compare-and-set status writes
//! - [`query_builder`]: filter/pagination/sort translation and the page
//!   envelope
//! - [`services`]: lifecycle orchestration and statistics aggregation
//! - [`events`]: best-effort notification emission on committed transitions
//! - [`web`]: axum HTTP surface

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod query_builder;
pub mod services;
pub mod state_machine;
pub mod test_helpers;
pub mod web;

// Re-export main types for convenient access
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use models::{NewReviewRequest, PgRequestStore, RequestStore, ReviewRequest};
pub use query_builder::{Page, PageRequest, RequestFilter, SortSpec};
pub use services::{CreateRequest, LifecycleError, LifecycleService, ListQuery, StatusStatistics};
pub use state_machine::{RequestStatus, TransitionError, TransitionTable, WorkflowKind};
