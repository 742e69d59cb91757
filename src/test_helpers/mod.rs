// In-memory doubles for the persistence and notification seams. Used by the
// integration tests and handy for embedding the engine without Postgres.

pub mod memory;
pub mod sinks;

pub use memory::InMemoryRequestStore;
pub use sinks::{FailingNotificationSink, RecordingNotificationSink};
