use thiserror::Error;

/// Crate-level errors for setup and wiring; operation-level errors live in
/// [`crate::services::LifecycleError`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
