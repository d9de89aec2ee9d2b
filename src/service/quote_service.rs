use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::dto::pagination::{normalize, Page};
use crate::dto::quote_dto::{QuoteListQuery, QuoteRequestForm};
use crate::model::quote::{QuoteItem, QuotePatch, QuoteStatus};
use crate::repository::quote_store::QuoteRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn list_quotes(&self, query: QuoteListQuery) -> Result<Page<QuoteItem>, ServiceError>;
    async fn get_quote(&self, id: &str) -> Result<QuoteItem, ServiceError>;
    async fn update_quote(&self, id: &str, patch: QuotePatch) -> Result<QuoteItem, ServiceError>;
    async fn update_quote_status(&self, id: &str, status: QuoteStatus) -> Result<QuoteItem, ServiceError>;
    /// `false` when no quote had that id.
    async fn delete_quote(&self, id: &str) -> Result<bool, ServiceError>;
    async fn clear_quotes(&self) -> Result<(), ServiceError>;
}

pub struct QuoteServiceImpl {
    pub quotes: Arc<dyn QuoteRepository>,
}

impl QuoteServiceImpl {
    pub fn new(quotes: Arc<dyn QuoteRepository>) -> Self {
        QuoteServiceImpl { quotes }
    }
}

/// Case-insensitive substring match over the searchable quote fields.
pub fn matches_search(quote: &QuoteItem, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        Some(quote.name.as_str()),
        quote.email.as_deref(),
        quote.phone.as_deref(),
        Some(quote.vehicle_id.as_str()),
        Some(quote.message.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("Quote not found: {}", id))
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    #[instrument(skip(self))]
    async fn list_quotes(&self, query: QuoteListQuery) -> Result<Page<QuoteItem>, ServiceError> {
        let (page, limit) = normalize(query.page, query.limit);
        let needle = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let res = self.quotes.get_all().await;
        let all = match res {
            Ok(quotes) => quotes,
            Err(e) => {
                error!("Failed to list quotes: {e}");
                return Err(ServiceError::from(e));
            }
        };
        let filtered: Vec<QuoteItem> = all
            .into_iter()
            .filter(|q| query.status.map_or(true, |status| q.status == status))
            .filter(|q| needle.map_or(true, |needle| matches_search(q, needle)))
            .collect();
        info!("Fetched {} matching quotes", filtered.len());
        Ok(Page::from_all(filtered, page, limit))
    }

    #[instrument(skip(self))]
    async fn get_quote(&self, id: &str) -> Result<QuoteItem, ServiceError> {
        self.quotes.find(id).await?.ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self, patch))]
    async fn update_quote(&self, id: &str, patch: QuotePatch) -> Result<QuoteItem, ServiceError> {
        info!("Updating quote");
        if patch.edits_submission() {
            let mut edited = self.get_quote(id).await?;
            patch.clone().apply(&mut edited);
            QuoteRequestForm::from_quote(&edited).validate_submission()?;
        }
        let res = self.quotes.update(id, patch).await;
        match &res {
            Ok(Some(_)) => info!("Quote updated successfully"),
            Ok(None) => info!("No quote to update"),
            Err(e) => error!("Failed to update quote: {e}"),
        }
        res?.ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self))]
    async fn update_quote_status(&self, id: &str, status: QuoteStatus) -> Result<QuoteItem, ServiceError> {
        info!("Updating quote status to {}", status.as_str());
        self.update_quote(id, QuotePatch::status(status)).await
    }

    #[instrument(skip(self))]
    async fn delete_quote(&self, id: &str) -> Result<bool, ServiceError> {
        let res = self.quotes.delete(id).await;
        match &res {
            Ok(true) => info!("Quote deleted successfully"),
            Ok(false) => info!("No quote to delete"),
            Err(e) => error!("Failed to delete quote: {e}"),
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    async fn clear_quotes(&self) -> Result<(), ServiceError> {
        let res = self.quotes.clear().await;
        if let Err(e) = &res {
            error!("Failed to clear quotes: {e}");
        }
        res.map_err(ServiceError::from)
    }
}
