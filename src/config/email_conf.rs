use tracing::{debug, error, info, warn};

use crate::config::{env_any, env_bool, env_parse, env_required, ConfigError};

/// SMTP settings for quote notifications and admin replies.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub use_tls: bool,
    pub use_starttls: bool,
    pub from_email: String,
    pub from_name: String,
    /// Shop inbox receiving new quote notifications
    pub quote_inbox_email: String,
    pub connection_timeout_secs: u64,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");

        let smtp_host = env_any(&["SMTP_HOST"])
            .ok_or_else(|| ConfigError::EnvVarNotFound("SMTP_HOST".to_string()))?;
        let from_email = env_required("SMTP_FROM_EMAIL")?;
        let quote_inbox_email = env_any(&["QUOTE_INBOX_EMAIL"]).unwrap_or_else(|| {
            warn!("QUOTE_INBOX_EMAIL not set, sending quote notifications to SMTP_FROM_EMAIL");
            from_email.clone()
        });
        let from_name = env_any(&["SMTP_FROM_NAME", "SITE_LABEL", "REACT_APP_SITE_LABEL"])
            .unwrap_or_else(|| "Moteurs d'occasion".to_string());

        let config = EmailConfig {
            smtp_host,
            smtp_port: env_parse("SMTP_PORT", 587)?,
            smtp_username: env_any(&["SMTP_USERNAME"]).unwrap_or_default(),
            smtp_password: env_any(&["SMTP_PASSWORD"]).unwrap_or_default(),
            use_tls: env_bool("SMTP_USE_TLS").unwrap_or(true),
            use_starttls: env_bool("SMTP_USE_STARTTLS").unwrap_or(true),
            from_email,
            from_name,
            quote_inbox_email,
            connection_timeout_secs: env_parse("SMTP_CONNECTION_TIMEOUT", 30)?,
        };
        debug!(
            "SMTP {} (TLS: {}, STARTTLS: {}, credentials provided: {})",
            config.get_smtp_url(),
            config.use_tls,
            config.use_starttls,
            !config.smtp_username.is_empty()
        );

        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    /// Create EmailConfig for testing
    pub fn from_test_env() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_tls: false,
            use_starttls: false,
            from_email: "devis@example.com".to_string(),
            from_name: "Test Moteurs".to_string(),
            quote_inbox_email: "atelier@example.com".to_string(),
            connection_timeout_secs: 10,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            error!("SMTP host is empty");
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }

        if self.smtp_port == 0 {
            error!("SMTP port is 0");
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }

        for (label, address) in [("From email", &self.from_email), ("Quote inbox email", &self.quote_inbox_email)] {
            if address.is_empty() || !address.contains('@') {
                error!("{} is missing or malformed", label);
                return Err(ConfigError::ValidationError(format!("{} is invalid", label)));
            }
        }

        if self.connection_timeout_secs == 0 {
            error!("Connection timeout is 0");
            return Err(ConfigError::ValidationError("Connection timeout cannot be 0".to_string()));
        }

        Ok(())
    }

    /// Get SMTP server URL
    pub fn get_smtp_url(&self) -> String {
        format!("{}:{}", self.smtp_host, self.smtp_port)
    }
}
