use tracing::{error, info};

use crate::config::{env_any, ConfigError};

/// Back-office credentials. There is a single admin account guarded by a password.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Plain password, hashed with Argon2 at start-up and then dropped.
    pub password: Option<String>,
    /// Pre-computed Argon2 PHC string; wins over `password` when both are set.
    pub password_hash: Option<String>,
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading admin configuration from environment variables");
        let config = AdminConfig {
            password: env_any(&["ADMIN_PASSWORD", "REACT_APP_ADMIN_PASSWORD"]),
            password_hash: env_any(&["ADMIN_PASSWORD_HASH"]),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password.is_none() && self.password_hash.is_none() {
            error!("Neither ADMIN_PASSWORD nor ADMIN_PASSWORD_HASH is set");
            return Err(ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()));
        }
        if let Some(ref hash) = self.password_hash {
            if !hash.starts_with("$argon2") {
                error!("ADMIN_PASSWORD_HASH is not an Argon2 PHC string");
                return Err(ConfigError::InvalidValue("ADMIN_PASSWORD_HASH must be an Argon2 hash".to_string()));
            }
        }
        if let Some(ref password) = self.password {
            if password.len() < 8 {
                error!("ADMIN_PASSWORD is too short");
                return Err(ConfigError::ValidationError("ADMIN_PASSWORD must be at least 8 characters long".to_string()));
            }
        }
        Ok(())
    }
}
