use crate::error::{EngineError, Result};

/// Engine configuration, environment-driven with sensible defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub bind_address: String,
    pub db_pool_size: u32,
    pub notification_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/review_lifecycle_development".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            db_pool_size: 10,
            notification_capacity: 1000,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(bind_address) = std::env::var("REVIEW_ENGINE_BIND_ADDRESS") {
            config.bind_address = bind_address;
        }

        if let Ok(pool_size) = std::env::var("REVIEW_ENGINE_DB_POOL_SIZE") {
            config.db_pool_size = pool_size.parse().map_err(|e| {
                EngineError::Configuration(format!("Invalid db_pool_size: {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("REVIEW_ENGINE_NOTIFICATION_CAPACITY") {
            config.notification_capacity = capacity.parse().map_err(|e| {
                EngineError::Configuration(format!("Invalid notification_capacity: {e}"))
            })?;
        }

        Ok(config)
    }
}
