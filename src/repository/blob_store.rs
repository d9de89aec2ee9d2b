use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repository::repository_error::RepositoryResult;

/// Key to string store holding whole JSON documents.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> RepositoryResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> RepositoryResult<()>;
    async fn remove(&self, key: &str) -> RepositoryResult<()>;
}

/// Process-local store used in tests and when Redis is not configured.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> RepositoryResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
