use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::state_machine::{RequestStatus, WorkflowKind};

use super::publisher::NotificationPublisher;

/// A request for the external notification service: who to tell, what to
/// say, and machine-readable context about the transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub requested_at: DateTime<Utc>,
}

impl NotificationRequest {
    /// Build the notification request for a committed status transition.
    /// The submitter is the recipient.
    pub fn for_transition(
        kind: WorkflowKind,
        request_id: Uuid,
        recipient: &str,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Self {
        Self {
            recipient: recipient.to_string(),
            message: format!("{kind} request {request_id} moved from {from} to {to}"),
            metadata: serde_json::json!({
                "workflow": kind,
                "request_id": request_id,
                "from": from,
                "to": to,
            }),
            requested_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification sink failure: {0}")]
    Sink(String),
}

/// Best-effort notification hook.
///
/// The lifecycle service invokes this after the state-changing write has
/// committed. Errors are logged by the caller and never surfaced, so a
/// flaky channel cannot block or roll back a legitimate transition.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, request: NotificationRequest) -> Result<(), NotifyError>;
}

/// Sink that hands requests to the broadcast publisher
#[derive(Debug, Clone, Default)]
pub struct ChannelNotificationSink {
    publisher: NotificationPublisher,
}

impl ChannelNotificationSink {
    pub fn new(publisher: NotificationPublisher) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &NotificationPublisher {
        &self.publisher
    }
}

#[async_trait]
impl NotificationSink for ChannelNotificationSink {
    async fn send(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        self.publisher.publish(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_notification_content() {
        let id = Uuid::new_v4();
        let request = NotificationRequest::for_transition(
            WorkflowKind::WarrantyClaim,
            id,
            "bob",
            RequestStatus::InReview,
            RequestStatus::Approved,
        );
        assert_eq!(request.recipient, "bob");
        assert!(request.message.contains("from in_review to approved"));
        assert_eq!(request.metadata["request_id"], serde_json::json!(id));
        assert_eq!(request.metadata["workflow"], serde_json::json!("warranty_claim"));
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_to_subscriber() {
        let sink = ChannelNotificationSink::default();
        let mut receiver = sink.publisher().subscribe();

        sink.send(NotificationRequest::for_transition(
            WorkflowKind::Approval,
            Uuid::new_v4(),
            "alice",
            RequestStatus::Submitted,
            RequestStatus::Approved,
        ))
        .await
        .unwrap();

        assert_eq!(receiver.recv().await.unwrap().recipient, "alice");
    }
}
