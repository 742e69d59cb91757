use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::events::{NotificationRequest, NotificationSink, NotifyError};

/// Sink that records every notification request it is handed
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationSink {
    sent: Arc<Mutex<Vec<NotificationRequest>>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn send(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        self.sent.lock().push(request);
        Ok(())
    }
}

/// Sink that always fails, for exercising the log-and-continue contract
#[derive(Debug, Default)]
pub struct FailingNotificationSink {
    attempts: AtomicUsize,
}

impl FailingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for FailingNotificationSink {
    async fn send(&self, _request: NotificationRequest) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::Sink("delivery channel is down".to_string()))
    }
}
