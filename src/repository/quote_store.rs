use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::model::quote::{NewQuote, QuoteItem, QuotePatch, QuoteResponse, QuoteStatus};
use crate::repository::blob_store::BlobStore;
use crate::repository::repository_error::RepositoryResult;

/// Key holding the serialized quote list.
pub const QUOTES_KEY: &str = "cpf_quotes_v1";

/// The quote mailbox. Every call reads and rewrites the whole list.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn get_all(&self) -> RepositoryResult<Vec<QuoteItem>>;
    async fn save_all(&self, quotes: &[QuoteItem]) -> RepositoryResult<()>;
    async fn find(&self, id: &str) -> RepositoryResult<Option<QuoteItem>>;
    async fn add(&self, quote: NewQuote) -> RepositoryResult<QuoteItem>;
    async fn update(&self, id: &str, patch: QuotePatch) -> RepositoryResult<Option<QuoteItem>>;
    async fn delete(&self, id: &str) -> RepositoryResult<bool>;
    async fn append_response(&self, id: &str, response: QuoteResponse) -> RepositoryResult<Option<QuoteItem>>;
    async fn clear(&self) -> RepositoryResult<()>;
}

pub struct BlobQuoteRepository {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl BlobQuoteRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_key(store, QUOTES_KEY)
    }

    pub fn with_key(store: Arc<dyn BlobStore>, key: &str) -> Self {
        BlobQuoteRepository { store, key: key.to_string() }
    }

    /// Read-modify-write helper; `None` from `change` skips the write.
    async fn modify<T, F>(&self, change: F) -> RepositoryResult<Option<T>>
    where
        F: FnOnce(&mut Vec<QuoteItem>) -> Option<T> + Send,
        T: Send,
    {
        let mut quotes = self.get_all().await?;
        match change(&mut quotes) {
            Some(out) => {
                self.save_all(&quotes).await?;
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl QuoteRepository for BlobQuoteRepository {
    #[instrument(skip(self), fields(key = %self.key))]
    async fn get_all(&self) -> RepositoryResult<Vec<QuoteItem>> {
        let raw = match self.store.get(&self.key).await? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };
        match serde_json::from_str::<Vec<QuoteItem>>(&raw) {
            Ok(quotes) => {
                debug!("Loaded {} quotes", quotes.len());
                Ok(quotes)
            }
            Err(e) => {
                warn!("Quote blob is unreadable, treating it as empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self, quotes), fields(key = %self.key, count = quotes.len()))]
    async fn save_all(&self, quotes: &[QuoteItem]) -> RepositoryResult<()> {
        let raw = serde_json::to_string(quotes)?;
        self.store.set(&self.key, &raw).await
    }

    async fn find(&self, id: &str) -> RepositoryResult<Option<QuoteItem>> {
        Ok(self.get_all().await?.into_iter().find(|q| q.id == id))
    }

    #[instrument(skip(self, quote), fields(vehicle_id = %quote.vehicle_id))]
    async fn add(&self, quote: NewQuote) -> RepositoryResult<QuoteItem> {
        let item = QuoteItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: quote.name,
            email: quote.email,
            phone: quote.phone,
            vehicle_id: quote.vehicle_id,
            message: quote.message,
            created_at: chrono::Utc::now().to_rfc3339(),
            channel: quote.channel.unwrap_or_default(),
            status: QuoteStatus::Nouveau,
            responses: Vec::new(),
        };
        let mut quotes = self.get_all().await?;
        quotes.insert(0, item.clone());
        self.save_all(&quotes).await?;
        info!(quote_id = %item.id, channel = %item.channel, "Quote recorded");
        Ok(item)
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    async fn update(&self, id: &str, patch: QuotePatch) -> RepositoryResult<Option<QuoteItem>> {
        self.modify(|quotes| {
            let quote = quotes.iter_mut().find(|q| q.id == id)?;
            patch.apply(quote);
            Some(quote.clone())
        })
        .await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let removed = self
            .modify(|quotes| {
                let before = quotes.len();
                quotes.retain(|q| q.id != id);
                (quotes.len() != before).then_some(())
            })
            .await?;
        Ok(removed.is_some())
    }

    #[instrument(skip(self, response), fields(id = %id, channel = response.channel.as_str()))]
    async fn append_response(&self, id: &str, response: QuoteResponse) -> RepositoryResult<Option<QuoteItem>> {
        self.modify(|quotes| {
            let quote = quotes.iter_mut().find(|q| q.id == id)?;
            quote.responses.push(response);
            Some(quote.clone())
        })
        .await
    }

    #[instrument(skip(self), fields(key = %self.key))]
    async fn clear(&self) -> RepositoryResult<()> {
        info!("Clearing quote mailbox");
        self.store.remove(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quote::{QuoteChannel, ResponseChannel};
    use crate::repository::blob_store::MemoryBlobStore;

    fn repo() -> (Arc<MemoryBlobStore>, BlobQuoteRepository) {
        let store = Arc::new(MemoryBlobStore::new());
        (store.clone(), BlobQuoteRepository::new(store))
    }

    fn new_quote(vehicle: &str) -> NewQuote {
        NewQuote {
            name: "Jeanne".to_string(),
            email: Some("jeanne@example.com".to_string()),
            vehicle_id: vehicle.to_string(),
            ..NewQuote::default()
        }
    }

    fn response(message: &str) -> QuoteResponse {
        QuoteResponse {
            channel: ResponseChannel::Email,
            message: message.to_string(),
            created_at: "2024-05-01T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_unique_ids_and_defaults() {
        let (_, repo) = repo();
        let first = repo.add(new_quote("K9K")).await.unwrap();
        let second = repo.add(new_quote("M9R")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.status, QuoteStatus::Nouveau);
        assert_eq!(first.channel, QuoteChannel::Unknown);
        assert!(first.responses.is_empty());

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id, "newest quote is prepended");
    }

    #[tokio::test]
    async fn test_add_keeps_given_channel() {
        let (_, repo) = repo();
        let mut quote = new_quote("K9K");
        quote.channel = Some(QuoteChannel::Api);
        assert_eq!(repo.add(quote).await.unwrap().channel, QuoteChannel::Api);
    }

    #[tokio::test]
    async fn test_update_preserves_responses_without_patch_responses() {
        let (_, repo) = repo();
        let quote = repo.add(new_quote("K9K")).await.unwrap();
        repo.append_response(&quote.id, response("Prix: 900 EUR")).await.unwrap();

        let updated = repo
            .update(&quote.id, QuotePatch::status(QuoteStatus::EnCours))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, QuoteStatus::EnCours);
        assert_eq!(updated.responses, vec![response("Prix: 900 EUR")]);

        let replaced = repo
            .update(&quote.id, QuotePatch { responses: Some(Vec::new()), ..QuotePatch::default() })
            .await
            .unwrap()
            .unwrap();
        assert!(replaced.responses.is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_none() {
        let (_, repo) = repo();
        repo.add(new_quote("K9K")).await.unwrap();
        assert!(repo.update("missing", QuotePatch::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_the_matching_id() {
        let (_, repo) = repo();
        let a = repo.add(new_quote("A")).await.unwrap();
        let b = repo.add(new_quote("B")).await.unwrap();
        let c = repo.add(new_quote("C")).await.unwrap();

        assert!(repo.delete(&b.id).await.unwrap());
        let ids: Vec<String> = repo.get_all().await.unwrap().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);

        assert!(!repo.delete("missing").await.unwrap());
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_blob_reads_as_empty() {
        let (store, repo) = repo();
        store.set(QUOTES_KEY, "{not json").await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());

        repo.add(new_quote("K9K")).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blob_is_camel_case_json() {
        let (store, repo) = repo();
        repo.add(new_quote("K9K")).await.unwrap();
        let raw = store.get(QUOTES_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"vehicleId\":\"K9K\""));
        assert!(raw.contains("\"status\":\"nouveau\""));
    }

    #[tokio::test]
    async fn test_clear_empties_the_mailbox() {
        let (_, repo) = repo();
        repo.add(new_quote("K9K")).await.unwrap();
        repo.clear().await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());
    }
}
