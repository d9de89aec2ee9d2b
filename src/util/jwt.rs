use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

/// Admin session claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (always the single admin account)
    pub sub: String,
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A freshly signed session token
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub max_age_secs: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode session token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode session token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
}

pub trait JwtTokenUtils: Send + Sync {
    fn generate_session_token(&self, subject: &str, role: &str) -> Result<SessionToken, JwtError>;
    fn validate_session_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_session_token(&self, subject: &str, role: &str) -> Result<SessionToken, JwtError> {
        debug!("Generating session token with role: {}", role);

        let now = Utc::now();
        let ttl = Duration::minutes(self.jwt_config.session_ttl_minutes);
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.jwt_config.jwt_issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        match encode(&Header::new(Algorithm::HS256), &claims, &encoding_key) {
            Ok(token) => {
                info!("Session token issued, expires at {}", expires_at.to_rfc3339());
                Ok(SessionToken { token, expires_at, max_age_secs: ttl.num_seconds() })
            }
            Err(err) => {
                error!("Failed to encode session token: {}", err);
                Err(JwtError::EncodingFailed(err.to_string()))
            }
        }
    }

    fn validate_session_token(&self, token: &str) -> Result<Claims, JwtError> {
        debug!("Validating session token");

        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.jwt_config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => {
                if data.claims.exp < Utc::now().timestamp() {
                    warn!("Session token has expired");
                    return Err(JwtError::TokenExpired);
                }
                Ok(data.claims)
            }
            Err(err) if matches!(err.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
                warn!("Session token has expired");
                Err(JwtError::TokenExpired)
            }
            Err(err) => {
                debug!("Rejected session token: {}", err);
                Err(JwtError::DecodingFailed(err.to_string()))
            }
        }
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(JwtError::InvalidToken)?;
        if token.is_empty() {
            return Err(JwtError::InvalidToken);
        }
        Ok(token.to_string())
    }
}
