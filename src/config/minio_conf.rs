use tracing::{debug, error, info, warn};

use crate::config::{env_any, env_bool, env_required, ConfigError};

/// Object storage for gallery uploads.
#[derive(Debug, Clone)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: String,
    /// Public base URL objects are served from, e.g. `https://cdn.example.com`
    pub links_prefix: String,
    pub secure: bool,
}

impl MinioConfig {
    /// Without `MINIO_ENDPOINT` gallery uploads answer 503.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MinIO configuration from environment variables");

        let endpoint = env_any(&["MINIO_ENDPOINT"])
            .ok_or_else(|| ConfigError::EnvVarNotFound("MINIO_ENDPOINT".to_string()))?;
        let defaults = Self::default();
        let mut config = Self {
            endpoint,
            access_key: env_required("MINIO_ACCESS_KEY")?,
            secret_key: env_required("MINIO_SECRET_KEY")?,
            bucket_name: env_any(&["MINIO_BUCKET_NAME"]).unwrap_or_else(|| {
                warn!("MINIO_BUCKET_NAME not set, using default: {}", defaults.bucket_name);
                defaults.bucket_name.clone()
            }),
            links_prefix: String::new(),
            secure: env_bool("MINIO_SECURE").unwrap_or(false),
        };
        config.links_prefix = env_any(&["MINIO_LINKS_PREFIX"]).unwrap_or_else(|| config.get_endpoint_url());
        debug!("MinIO endpoint: {}, bucket: {}", config.endpoint, config.bucket_name);

        config.validate()?;
        info!("MinIO configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            error!("MinIO endpoint is empty");
            return Err(ConfigError::ValidationError("Endpoint cannot be empty".to_string()));
        }

        if self.access_key.is_empty() || self.secret_key.is_empty() {
            error!("MinIO credentials are empty");
            return Err(ConfigError::ValidationError("Access and secret keys cannot be empty".to_string()));
        }

        if !self.bucket_name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.') {
            error!("Invalid bucket name format: {}", self.bucket_name);
            return Err(ConfigError::ValidationError("Bucket name contains invalid characters".to_string()));
        }

        if self.bucket_name.len() < 3 || self.bucket_name.len() > 63 {
            error!("Invalid bucket name length: {}", self.bucket_name.len());
            return Err(ConfigError::ValidationError("Bucket name must be between 3 and 63 characters".to_string()));
        }
        Ok(())
    }

    /// Get the full endpoint URL with protocol
    pub fn get_endpoint_url(&self) -> String {
        let protocol = if self.secure { "https" } else { "http" };
        format!("{}://{}", protocol, self.endpoint)
    }
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: "cpf-gallery".to_string(),
            links_prefix: "http://localhost:9000".to_string(),
            secure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        assert!(MinioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_bucket_name() {
        let mut config = MinioConfig::default();
        config.bucket_name = "ab".to_string();
        assert!(config.validate().is_err());
        config.bucket_name = "Gallery_Images".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_get_endpoint_url() {
        let mut config = MinioConfig::default();
        assert_eq!(config.get_endpoint_url(), "http://localhost:9000");
        config.secure = true;
        assert_eq!(config.get_endpoint_url(), "https://localhost:9000");
    }
}
