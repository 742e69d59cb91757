//! # Web API Application State
//!
//! Shared state for the web API: one lifecycle service per workflow kind,
//! all backed by the same pool and notification channel.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::events::{ChannelNotificationSink, NotificationPublisher};
use crate::models::PgRequestStore;
use crate::services::LifecycleService;
use crate::state_machine::WorkflowKind;

/// Per-workflow handler state: the lifecycle service for one kind
pub type WorkflowState<S> = Arc<LifecycleService<S>>;

/// Fully wired engine state for the server binary
pub struct EngineState {
    pub approvals: WorkflowState<PgRequestStore>,
    pub claims: WorkflowState<PgRequestStore>,
    pub publisher: NotificationPublisher,
    pub pool: PgPool,
}

impl EngineState {
    pub fn from_pool(pool: PgPool, config: &EngineConfig) -> Self {
        let publisher = NotificationPublisher::new(config.notification_capacity);
        let sink = Arc::new(ChannelNotificationSink::new(publisher.clone()));

        let approvals = Arc::new(LifecycleService::new(
            WorkflowKind::Approval,
            PgRequestStore::for_kind(pool.clone(), WorkflowKind::Approval),
            sink.clone(),
        ));
        let claims = Arc::new(LifecycleService::new(
            WorkflowKind::WarrantyClaim,
            PgRequestStore::for_kind(pool.clone(), WorkflowKind::WarrantyClaim),
            sink,
        ));

        Self {
            approvals,
            claims,
            publisher,
            pool,
        }
    }

    pub async fn connect(config: &EngineConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_pool_size)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&config.database_url)
            .await?;
        Ok(Self::from_pool(pool, config))
    }
}
