pub mod jwt;
pub mod minio;
pub mod password;
pub mod redis;
pub mod email;
pub mod logger;
pub mod error;
pub mod links;
pub mod slug;
