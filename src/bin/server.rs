//! Review lifecycle engine server.
//!
//! Serves the approval-request and warranty-claim workflows over HTTP and
//! logs emitted notification requests in place of an external delivery
//! service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use review_lifecycle::logging::init_structured_logging;
use review_lifecycle::web::{app_router, EngineState};
use review_lifecycle::EngineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let config = EngineConfig::from_env().context("failed to load engine configuration")?;
    let state = EngineState::connect(&config)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&state.pool)
        .await
        .context("failed to run migrations")?;

    spawn_notification_logger(&state);

    let router = app_router(&state);
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;

    info!(bind_address = %config.bind_address, "review lifecycle engine listening");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Stand-in for the external notification delivery service: subscribe to the
/// broadcast channel and log every request handed off.
fn spawn_notification_logger(state: &EngineState) {
    let mut receiver = state.publisher.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(notification) => info!(
                    recipient = %notification.recipient,
                    message = %notification.message,
                    "notification request emitted"
                ),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification logger lagged behind the channel");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
