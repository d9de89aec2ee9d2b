use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use crate::config::AdminConfig;
use crate::util::error::ServiceError;
use crate::util::jwt::{Claims, JwtError, JwtTokenUtils, SessionToken};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

pub const ADMIN_SUBJECT: &str = "admin";
pub const ADMIN_ROLE: &str = "admin";

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check the admin password and sign a session token.
    async fn login(&self, password: String) -> Result<SessionToken, ServiceError>;
    /// Claims of a valid admin session token.
    fn check_token(&self, token: &str) -> Result<Claims, ServiceError>;
    /// Same as `check_token`, for an `Authorization: Bearer` header value.
    fn check_bearer(&self, auth_header: &str) -> Result<Claims, ServiceError>;
}

pub struct AuthServiceImpl {
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
    password_hash: String,
}

impl AuthServiceImpl {
    /// Uses `ADMIN_PASSWORD_HASH` as is, or hashes `ADMIN_PASSWORD` once.
    pub fn new(admin_config: AdminConfig, jwt_utils: Arc<dyn JwtTokenUtils>) -> Result<Self, ServiceError> {
        let password_hash = match (admin_config.password_hash, admin_config.password) {
            (Some(hash), _) => hash,
            (None, Some(password)) => {
                info!("Hashing the admin password from ADMIN_PASSWORD");
                PasswordUtilsImpl::hash_password(&password)
                    .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?
            }
            (None, None) => {
                return Err(ServiceError::InternalError("No admin password configured".to_string()));
            }
        };
        Ok(AuthServiceImpl { jwt_utils, password_hash })
    }
}

fn session_error(err: JwtError) -> ServiceError {
    match err {
        JwtError::TokenExpired => ServiceError::Unauthorized("Session expired".to_string()),
        JwtError::EncodingFailed(msg) => ServiceError::InternalError(msg),
        _ => ServiceError::Unauthorized("Invalid session".to_string()),
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, password))]
    async fn login(&self, password: String) -> Result<SessionToken, ServiceError> {
        info!("Admin login attempt");
        let hash = self.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || PasswordUtilsImpl::verify_password(&password, &hash))
            .await
            .map_err(|e| ServiceError::InternalError(format!("Password check aborted: {}", e)))?
            .map_err(|e| {
                error!("Admin password hash is unusable: {e}");
                ServiceError::InternalError("Password verify error".to_string())
            })?;
        if !valid {
            warn!("Invalid admin password");
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }
        let session = self
            .jwt_utils
            .generate_session_token(ADMIN_SUBJECT, ADMIN_ROLE)
            .map_err(session_error)?;
        info!("Admin logged in successfully");
        Ok(session)
    }

    fn check_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let claims = self.jwt_utils.validate_session_token(token).map_err(session_error)?;
        if claims.role != ADMIN_ROLE {
            return Err(ServiceError::Unauthorized("Admin role required".to_string()));
        }
        Ok(claims)
    }

    fn check_bearer(&self, auth_header: &str) -> Result<Claims, ServiceError> {
        let token = self
            .jwt_utils
            .extract_token_from_header(auth_header)
            .map_err(session_error)?;
        self.check_token(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::util::jwt::JwtTokenUtilsImpl;

    fn service() -> AuthServiceImpl {
        let admin = AdminConfig { password: Some("changeme123".to_string()), password_hash: None };
        AuthServiceImpl::new(admin, Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()))).unwrap()
    }

    #[tokio::test]
    async fn test_login_and_check() {
        let auth = service();
        let session = auth.login("changeme123".to_string()).await.unwrap();
        let claims = auth.check_token(&session.token).unwrap();
        assert_eq!(claims.role, ADMIN_ROLE);
        assert!(auth.check_bearer(&format!("Bearer {}", session.token)).is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let auth = service();
        assert!(matches!(
            auth.login("wrong-password".to_string()).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        assert!(matches!(service().check_token("not.a.token"), Err(ServiceError::Unauthorized(_))));
        assert!(service().check_bearer("Basic abc").is_err());
    }
}
