use std::env;
use tracing::{debug, info, warn};

use crate::config::{env_any, ConfigError};

/// Outbound integrations used by quote intake and the reply inbox.
#[derive(Debug, Clone, Default)]
pub struct QuoteApiConfig {
    /// External quote API; when unset the API channel is left out of the fallback chain.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Bearer token expected from the inbound client-reply webhook.
    pub backend_token: Option<String>,
}

impl QuoteApiConfig {
    /// Expected environment variables (all optional):
    /// - QUOTE_API_URL / REACT_APP_QUOTE_API_URL
    /// - QUOTE_API_KEY / REACT_APP_QUOTE_API_KEY
    /// - QUOTE_API_TIMEOUT_SECS (defaults to 10)
    /// - BACKEND_TOKEN / REACT_APP_BACKEND_TOKEN
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading quote API configuration from environment variables");

        let api_url = env_any(&["QUOTE_API_URL", "REACT_APP_QUOTE_API_URL"]);
        match api_url {
            Some(ref url) => debug!("External quote API: {}", url),
            None => warn!("QUOTE_API_URL not set, quotes skip the external API channel"),
        }

        let api_key = env_any(&["QUOTE_API_KEY", "REACT_APP_QUOTE_API_KEY"]);

        let timeout_secs = match env::var("QUOTE_API_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConfigError::ParseError(format!("QUOTE_API_TIMEOUT_SECS: {}", e)))?,
            Err(_) => 10,
        };

        let backend_token = env_any(&["BACKEND_TOKEN", "REACT_APP_BACKEND_TOKEN"]);

        let config = QuoteApiConfig { api_url, api_key, timeout_secs, backend_token };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!("QUOTE_API_URL is not an http(s) URL: {}", url)));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("QUOTE_API_TIMEOUT_SECS must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = QuoteApiConfig {
            api_url: Some("ftp://quotes.example.com".to_string()),
            timeout_secs: 10,
            ..QuoteApiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = QuoteApiConfig { timeout_secs: 0, ..QuoteApiConfig::default() };
        assert!(config.validate().is_err());
    }
}
