pub mod app_conf;
pub mod admin_conf;
pub mod jwt_conf;
pub mod email_conf;
pub mod mongo_conf;
pub mod redis_conf;
pub mod minio_conf;
pub mod quote_api_conf;
pub mod site_conf;

pub use app_conf::AppConfig;
pub use admin_conf::AdminConfig;
pub use jwt_conf::JwtConfig;
pub use email_conf::EmailConfig;
pub use mongo_conf::MongoConfig;
pub use redis_conf::RedisConfig;
pub use minio_conf::MinioConfig;
pub use quote_api_conf::QuoteApiConfig;
pub use site_conf::SiteConfig;

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{error, warn};

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// First non-empty value among `names`, in order.
///
/// Site-level settings accept both the server name (`SITE_LABEL`) and the
/// front-end build name (`REACT_APP_SITE_LABEL`), so both can live in one `.env`.
pub fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Required variable; unset or blank is an error.
pub fn env_required(name: &str) -> Result<String, ConfigError> {
    env_any(&[name]).ok_or_else(|| {
        error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

/// Parsed variable, or `default` (with a warning) when unset.
pub fn env_parse<T: FromStr + Display>(name: &str, default: T) -> Result<T, ConfigError> {
    match env_any(&[name]) {
        Some(raw) => raw.parse().map_err(|_| {
            error!("Invalid {} value", name);
            ConfigError::InvalidValue(format!("Invalid {} value", name))
        }),
        None => {
            warn!("{} not set, using default: {}", name, default);
            Ok(default)
        }
    }
}

pub fn env_bool(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .and_then(|raw| parse_bool(&raw))
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
