use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{env_any, ConfigError};

/// Longest accepted session, 30 days.
pub const MAX_SESSION_TTL_MINUTES: i64 = 30 * 24 * 60;

/// Signing configuration for admin session tokens
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing session tokens
    pub jwt_secret: String,
    /// Session lifetime in minutes
    pub session_ttl_minutes: i64,
    /// Token issuer (optional)
    pub jwt_issuer: Option<String>,
}

impl JwtConfig {
    /// Load session token configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SESSION_SECRET (or JWT_SECRET): signing secret, at least 32 characters (required)
    /// - SESSION_TTL_MINUTES: session lifetime in minutes (defaults to 720 = 12 hours)
    /// - JWT_ISSUER: token issuer (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading session token configuration from environment variables");

        let jwt_secret = env_any(&["SESSION_SECRET", "JWT_SECRET"]).ok_or_else(|| {
            error!("SESSION_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("SESSION_SECRET".to_string())
        })?;
        debug!("Session secret loaded (length: {} chars)", jwt_secret.len());

        let session_ttl_minutes = env::var("SESSION_TTL_MINUTES")
            .unwrap_or_else(|_| {
                warn!("SESSION_TTL_MINUTES not set, using default: 720 minutes");
                "720".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid SESSION_TTL_MINUTES value: {}", e);
                ConfigError::ParseError(format!("SESSION_TTL_MINUTES: {}", e))
            })?;

        let jwt_issuer = env::var("JWT_ISSUER").ok();
        if let Some(ref issuer) = jwt_issuer {
            debug!("Session token issuer: {}", issuer);
        }

        let config = JwtConfig { jwt_secret, session_ttl_minutes, jwt_issuer };
        config.validate()?;
        info!("Session token configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("Session secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError(
                "SESSION_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        if self.session_ttl_minutes <= 0 || self.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            error!("Session lifetime out of range: {} minutes", self.session_ttl_minutes);
            return Err(ConfigError::ValidationError(format!(
                "SESSION_TTL_MINUTES must be between 1 and {}",
                MAX_SESSION_TTL_MINUTES
            )));
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_session_testing_should_be_long_enough".to_string(),
            session_ttl_minutes: 720,
            jwt_issuer: Some("cpf-backend-test".to_string()),
        }
    }
}
