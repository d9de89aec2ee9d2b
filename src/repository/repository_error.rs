/// Storage failures shared by the blob-backed quote store and the Mongo collections.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Already Exists: {0}")]
    AlreadyExists(String),
    #[error("Validation Error: {0}")]
    ValidationError(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// Backing store unreachable.
    #[error("Connection Error: {0}")]
    ConnectionError(String),
    #[error("Serialization Error: {0}")]
    SerializationError(String),
    #[error("Repository Error: {0}")]
    Generic(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        RepositoryError::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        RepositoryError::AlreadyExists(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        RepositoryError::ValidationError(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        RepositoryError::DatabaseError(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        RepositoryError::ConnectionError(msg.into())
    }
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::Write(_) => {
                // E11000 is the duplicate key code
                if err.to_string().contains("E11000") {
                    RepositoryError::AlreadyExists(format!("Duplicate key: {}", err))
                } else {
                    RepositoryError::DatabaseError(format!("Write error: {}", err))
                }
            }
            ErrorKind::Authentication { .. } => {
                RepositoryError::ConnectionError(format!("Authentication failed: {}", err))
            }
            ErrorKind::InvalidArgument { .. } => {
                RepositoryError::ValidationError(format!("Invalid argument: {}", err))
            }
            ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } => {
                RepositoryError::ConnectionError(format!("Connection error: {}", err))
            }
            _ => RepositoryError::Generic(Box::new(err)),
        }
    }
}

impl From<bson::ser::Error> for RepositoryError {
    fn from(err: bson::ser::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON serialization error: {}", err))
    }
}

impl From<bson::de::Error> for RepositoryError {
    fn from(err: bson::de::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON deserialization error: {}", err))
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<crate::util::redis::RedisError> for RepositoryError {
    fn from(err: crate::util::redis::RedisError) -> Self {
        use crate::util::redis::RedisError;
        match err {
            RedisError::ConnectionError(msg) | RedisError::ConfigError(msg) => {
                RepositoryError::ConnectionError(format!("Redis: {}", msg))
            }
            RedisError::SerializationError(msg) => RepositoryError::SerializationError(msg),
            other => RepositoryError::DatabaseError(format!("Redis: {}", other)),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
