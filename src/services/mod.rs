// Business services: lifecycle orchestration and statistics aggregation.

pub mod lifecycle;
pub mod statistics;

pub use lifecycle::{CreateRequest, LifecycleError, LifecycleResult, LifecycleService, ListQuery};
pub use statistics::StatusStatistics;
