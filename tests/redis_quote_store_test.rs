use cpf_backend::config::RedisConfig;
use cpf_backend::model::quote::{NewQuote, QuotePatch, QuoteStatus};
use cpf_backend::repository::blob_store::BlobStore;
use cpf_backend::repository::quote_store::{BlobQuoteRepository, QuoteRepository};
use cpf_backend::util::redis::RedisService;
use std::sync::Arc;
use tracing::info;

mod common;

/// Needs a reachable Redis configured through `.env` (`REDIS_HOST`, ...).
async fn setup_store() -> Arc<RedisService> {
    let _ = dotenv::dotenv();
    common::init_tracing();
    let config = RedisConfig::from_env().expect("Failed to load RedisConfig");
    Arc::new(RedisService::new(config).await.expect("Failed to connect to Redis"))
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_quote_store_round_trip_on_redis() {
    let redis = setup_store().await;
    let key = format!("cpf_quotes_test_{}", uuid::Uuid::new_v4());
    info!("Using Redis database {}", redis.config().database);
    let repo = BlobQuoteRepository::with_key(redis.clone(), &key);

    let quote = repo
        .add(NewQuote {
            name: "Luc Martin".to_string(),
            phone: Some("0612345678".to_string()),
            vehicle_id: "K9K 832".to_string(),
            ..NewQuote::default()
        })
        .await
        .expect("Failed to add quote");
    info!("Stored quote {} under {}", quote.id, key);

    let updated = repo
        .update(&quote.id, QuotePatch::status(QuoteStatus::Termine))
        .await
        .expect("Failed to update quote")
        .expect("Quote vanished");
    assert_eq!(updated.status, QuoteStatus::Termine);

    let raw = redis.get(&key).await.expect("Failed to read blob").expect("Blob missing");
    assert!(raw.contains("\"termine\""));

    assert!(repo.delete(&quote.id).await.expect("Failed to delete quote"));
    assert!(repo.get_all().await.expect("Failed to list quotes").is_empty());
    redis.remove(&key).await.expect("Failed to clean up");
}
