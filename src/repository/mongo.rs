use bson::{doc, Bson, Document};
use futures::stream::StreamExt;
use mongodb::options::{ClientOptions, Credential, FindOptions, ResolverConfig};
use mongodb::{Client, Cursor, Database};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::config::MongoConfig;
use crate::repository::repository_error::RepositoryResult;

/// Open the shared database handle all Mongo repositories are built from.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("CpfBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));
    client_options.server_selection_timeout =
        Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    let db = client.database(&config.database);
    db.run_command(doc! { "ping": 1 }, None).await?;
    info!("Connected to MongoDB");
    Ok(db)
}

/// Escape a user string for use inside a `$regex`.
pub fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.^$|?*+()[]{}/-".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `$or` of case-insensitive substring matches, or an empty filter for a blank query.
pub fn search_filter(fields: &[&str], q: Option<&str>) -> Document {
    match q.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            let pattern = escape_regex(q);
            let clauses: Vec<Bson> = fields
                .iter()
                .map(|field| {
                    let mut clause = Document::new();
                    clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                    Bson::Document(clause)
                })
                .collect();
            doc! { "$or": clauses }
        }
        None => Document::new(),
    }
}

pub fn page_options(sort: Document, page: u32, limit: u32) -> FindOptions {
    FindOptions::builder()
        .sort(sort)
        .skip(u64::from(page.saturating_sub(1)) * u64::from(limit))
        .limit(i64::from(limit))
        .build()
}

/// Drain a cursor, failing on the first undecodable document.
pub async fn collect_all<T>(mut cursor: Cursor<T>) -> RepositoryResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let mut items = Vec::new();
    while let Some(item) = cursor.next().await {
        items.push(item?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("1.5 dCi (K9K)"), "1\\.5 dCi \\(K9K\\)");
        assert_eq!(escape_regex("plain"), "plain");
    }

    #[test]
    fn test_search_filter_blank_is_empty() {
        assert!(search_filter(&["title"], Some("  ")).is_empty());
        assert!(search_filter(&["title"], None).is_empty());
    }

    #[test]
    fn test_search_filter_builds_or_clauses() {
        let filter = search_filter(&["title", "alt"], Some("moteur"));
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn test_page_options_skip() {
        let opts = page_options(doc! { "position": 1 }, 3, 20);
        assert_eq!(opts.skip, Some(40));
        assert_eq!(opts.limit, Some(20));
    }
}
