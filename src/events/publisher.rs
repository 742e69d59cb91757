use tokio::sync::broadcast;

use super::notifications::NotificationRequest;

/// Broadcast publisher for notification requests.
///
/// Delivery, templating, and read/unread tracking belong to whatever
/// subscribes; the engine only hands off notification requests.
#[derive(Debug, Clone)]
pub struct NotificationPublisher {
    sender: broadcast::Sender<NotificationRequest>,
}

impl NotificationPublisher {
    /// Create a new publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Hand a notification request to the channel, returning how many
    /// subscribers received it. A broadcast send only errors when there are
    /// no subscribers, and publishing into the void is acceptable here, so
    /// this is infallible.
    pub fn publish(&self, request: NotificationRequest) -> usize {
        match self.sender.send(request) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(_)) => 0,
        }
    }

    /// Subscribe to notification requests
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationRequest> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
