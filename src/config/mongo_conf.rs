use tracing::{debug, error, info, warn};

use crate::config::{env_any, env_parse, env_required, ConfigError};

/// Document store holding gallery images, engine pages and site settings.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub pool_size: u32,
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// `MONGO_URI` is required; `MONGO_DATABASE` falls back to `cpf`.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");
        let defaults = Self::default();

        let database = env_any(&["MONGO_DATABASE"]).unwrap_or_else(|| {
            warn!("MONGO_DATABASE not set, using default: {}", defaults.database);
            defaults.database.clone()
        });
        let config = MongoConfig {
            uri: env_required("MONGO_URI")?,
            database,
            username: env_any(&["MONGO_USERNAME"]),
            password: env_any(&["MONGO_PASSWORD"]),
            pool_size: env_parse("MONGO_POOL_SIZE", defaults.pool_size)?,
            connection_timeout_secs: env_parse("MONGO_CONNECTION_TIMEOUT", defaults.connection_timeout_secs)?,
        };
        debug!(
            "MongoDB database: {}, credentials provided: {}",
            config.database,
            config.username.is_some() && config.password.is_some()
        );

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }

        if self.database.is_empty() {
            error!("MongoDB database is empty");
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }

        if self.pool_size == 0 {
            error!("MongoDB pool size is 0");
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }

        if self.connection_timeout_secs == 0 {
            error!("MongoDB connection timeout is 0");
            return Err(ConfigError::ValidationError("MongoDB connection timeout must be greater than 0".to_string()));
        }

        if matches!(self.username.as_deref(), Some("")) || matches!(self.password.as_deref(), Some("")) {
            error!("MongoDB credentials set but empty");
            return Err(ConfigError::ValidationError("MongoDB credentials cannot be empty if set".to_string()));
        }
        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "cpf".to_string(),
            username: None,
            password: None,
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MongoConfig::default();
        assert_eq!(config.database, "cpf");
        assert_eq!(config.pool_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_uri() {
        let mut config = MongoConfig::default();
        config.uri = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_credentials() {
        let mut config = MongoConfig::default();
        config.username = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = MongoConfig::default();
        config.connection_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
