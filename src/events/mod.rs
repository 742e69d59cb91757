// Notification side-effect hook: fire-and-forget emission of notification
// requests on committed transitions. Delivery is a separate service's job.

pub mod notifications;
pub mod publisher;

pub use notifications::{
    ChannelNotificationSink, NotificationRequest, NotificationSink, NotifyError,
};
pub use publisher::NotificationPublisher;
