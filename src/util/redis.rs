use crate::config::RedisConfig;
use crate::repository::blob_store::BlobStore;
use crate::repository::repository_error::RepositoryResult;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, error, info, instrument};

/// Redis-backed key/value access for whole JSON documents.
#[derive(Clone)]
pub struct RedisService {
    connection_manager: ConnectionManager,
    config: RedisConfig,
}

impl RedisService {
    /// Connect through a `ConnectionManager` and check the server answers.
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: RedisConfig) -> Result<Self, RedisError> {
        info!("Initializing Redis service");

        config.validate().map_err(|e| {
            error!("Redis configuration validation failed: {}", e);
            RedisError::ConfigError(e.to_string())
        })?;

        debug!("Creating Redis client with URL: {}", config.redacted_url());

        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            RedisError::ConnectionError(format!("Client creation failed: {}", e))
        })?;

        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis connection manager: {}", e);
            RedisError::ConnectionError(format!("Connection manager creation failed: {}", e))
        })?;

        let service = Self { connection_manager, config };
        service.ping().await?;

        info!("Redis service initialized successfully");
        Ok(service)
    }

    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), RedisError> {
        debug!("Pinging Redis server");

        let mut conn = self.connection_manager.clone();
        let result: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| {
            error!("Redis ping failed: {}", e);
            RedisError::OperationError(format!("Ping failed: {}", e))
        })?;

        if result == "PONG" {
            debug!("Redis ping successful");
            Ok(())
        } else {
            error!("Unexpected ping response: {}", result);
            Err(RedisError::OperationError(format!("Unexpected ping response: {}", result)))
        }
    }

    #[instrument(skip(self), fields(key = %key))]
    pub async fn get_string(&self, key: &str) -> Result<Option<String>, RedisError> {
        debug!("Getting key: {}", key);
        let mut conn = self.connection_manager.clone();
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            error!("Failed to get key '{}': {}", key, e);
            RedisError::OperationError(format!("Get operation failed: {}", e))
        })
    }

    #[instrument(skip(self, value), fields(key = %key, size = value.len()))]
    pub async fn set_string(&self, key: &str, value: &str) -> Result<(), RedisError> {
        debug!("Setting key: {}", key);
        let mut conn = self.connection_manager.clone();
        let _: () = conn.set(key, value).await.map_err(|e| {
            error!("Failed to set key '{}': {}", key, e);
            RedisError::OperationError(format!("Set operation failed: {}", e))
        })?;
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    pub async fn delete(&self, key: &str) -> Result<bool, RedisError> {
        debug!("Deleting key: {}", key);
        let mut conn = self.connection_manager.clone();
        let deleted: u64 = conn.del(key).await.map_err(|e| {
            error!("Failed to delete key '{}': {}", key, e);
            RedisError::OperationError(format!("Delete operation failed: {}", e))
        })?;
        Ok(deleted > 0)
    }

    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

#[async_trait]
impl BlobStore for RedisService {
    async fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.get_string(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        Ok(self.set_string(key, value).await?)
    }

    async fn remove(&self, key: &str) -> RepositoryResult<()> {
        self.delete(key).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
