use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub enum HandlerErrorKind {
    NotFound,
    Validation,
    Internal,
    Unauthorized,
    Conflict,
    BadRequest,
    PayloadTooLarge,
    Upstream,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::NotFound => "NotFound",
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::Internal => "Internal",
            HandlerErrorKind::Unauthorized => "Unauthorized",
            HandlerErrorKind::Conflict => "Conflict",
            HandlerErrorKind::BadRequest => "BadRequest",
            HandlerErrorKind::PayloadTooLarge => "PayloadTooLarge",
            HandlerErrorKind::Upstream => "Upstream",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize)]
pub struct HandlerError {
    pub error: HandlerErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl HandlerError {
    pub fn new(error: HandlerErrorKind, message: impl Into<String>) -> Self {
        HandlerError { error, message: message.into(), details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Unauthorized, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self.error {
            HandlerErrorKind::NotFound => StatusCode::NOT_FOUND,
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerErrorKind::Conflict => StatusCode::CONFLICT,
            HandlerErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            HandlerErrorKind::Upstream => StatusCode::SERVICE_UNAVAILABLE,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, axum::Json(self)).into_response()
    }
}

impl From<validator::ValidationErrors> for HandlerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HandlerError::new(HandlerErrorKind::Validation, "Validation error").with_details(errors.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum ServiceError {
    NotFound(String),
    InvalidInput(String),
    InternalError(String),
    Conflict(String),
    Unauthorized(String),
    /// A mail server, object store or remote API failed or is not configured.
    Upstream(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ServiceError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ServiceError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::Upstream(msg) => write!(f, "Upstream Error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<crate::repository::repository_error::RepositoryError> for ServiceError {
    fn from(err: crate::repository::repository_error::RepositoryError) -> Self {
        use crate::repository::repository_error::RepositoryError;
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::ValidationError(msg) => ServiceError::InvalidInput(msg),
            RepositoryError::AlreadyExists(msg) => ServiceError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => ServiceError::InternalError(msg),
            RepositoryError::ConnectionError(msg) => ServiceError::InternalError(msg),
            RepositoryError::SerializationError(msg) => ServiceError::InternalError(msg),
            RepositoryError::Generic(e) => ServiceError::InternalError(e.to_string()),
        }
    }
}

impl From<crate::util::email::EmailError> for ServiceError {
    fn from(err: crate::util::email::EmailError) -> Self {
        use crate::util::email::EmailError;
        match err {
            EmailError::AddressError(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

impl From<crate::util::minio::MinioError> for ServiceError {
    fn from(err: crate::util::minio::MinioError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        let kind = match &err {
            ServiceError::NotFound(_) => HandlerErrorKind::NotFound,
            ServiceError::InvalidInput(_) => HandlerErrorKind::Validation,
            ServiceError::Conflict(_) => HandlerErrorKind::Conflict,
            ServiceError::Unauthorized(_) => HandlerErrorKind::Unauthorized,
            ServiceError::Upstream(_) => HandlerErrorKind::Upstream,
            ServiceError::InternalError(_) => HandlerErrorKind::Internal,
        };
        let message = match err {
            ServiceError::NotFound(msg)
            | ServiceError::InvalidInput(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::Upstream(msg)
            | ServiceError::InternalError(msg) => msg,
        };
        HandlerError::new(kind, message)
    }
}
