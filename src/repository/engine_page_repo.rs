use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::stream::StreamExt;
use mongodb::{options::FindOptions, Collection, Database};
use tracing::{error, info, instrument};

use crate::model::engine_page::{BrandCount, EnginePage};
use crate::repository::mongo::{collect_all, page_options, search_filter};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

const SEARCH_FIELDS: [&str; 5] = ["code", "title", "brand", "description", "compatibleModels"];

/// Narrowing applied on top of the text search.
#[derive(Debug, Clone, Default)]
pub struct EnginePageFilter {
    pub q: Option<String>,
    pub published_only: bool,
    pub brand_slug: Option<String>,
}

impl EnginePageFilter {
    fn to_document(&self) -> Document {
        let mut filter = search_filter(&SEARCH_FIELDS, self.q.as_deref());
        if self.published_only {
            filter.insert("published", true);
        }
        if let Some(brand_slug) = &self.brand_slug {
            filter.insert("brandSlug", brand_slug.as_str());
        }
        filter
    }
}

#[async_trait]
pub trait EnginePageRepository: Send + Sync {
    async fn create(&self, page: EnginePage) -> RepositoryResult<EnginePage>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<EnginePage>;
    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<EnginePage>>;
    /// Lookup by slug first, then by code.
    async fn find_by_slug_or_code(&self, key: &str) -> RepositoryResult<Option<EnginePage>>;
    async fn search(&self, filter: &EnginePageFilter, page: u32, limit: u32) -> RepositoryResult<(Vec<EnginePage>, u64)>;
    async fn list_published(&self) -> RepositoryResult<Vec<EnginePage>>;
    async fn brands(&self) -> RepositoryResult<Vec<BrandCount>>;
    async fn replace(&self, page: &EnginePage) -> RepositoryResult<()>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoEnginePageRepository {
    collection: Collection<EnginePage>,
}

impl MongoEnginePageRepository {
    pub fn new(db: &Database) -> Self {
        MongoEnginePageRepository { collection: db.collection("engine_pages") }
    }
}

fn count_of(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        _ => 0,
    }
}

#[async_trait]
impl EnginePageRepository for MongoEnginePageRepository {
    #[instrument(skip(self, page), fields(code = %page.code))]
    async fn create(&self, mut page: EnginePage) -> RepositoryResult<EnginePage> {
        if self.find_by_code(&page.code).await?.is_some() {
            return Err(RepositoryError::already_exists(format!("Engine page already exists for code: {}", page.code)));
        }
        page.id = Some(ObjectId::new());
        self.collection.insert_one(&page, None).await.map_err(|e| {
            error!("Failed to insert engine page: {}", e);
            RepositoryError::from(e)
        })?;
        info!("Engine page created");
        Ok(page)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<EnginePage> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Engine page not found for ID: {}", id)))
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<EnginePage>> {
        Ok(self.collection.find_one(doc! { "code": code }, None).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_slug_or_code(&self, key: &str) -> RepositoryResult<Option<EnginePage>> {
        if let Some(page) = self.collection.find_one(doc! { "slug": key }, None).await? {
            return Ok(Some(page));
        }
        self.find_by_code(key).await
    }

    #[instrument(skip(self), fields(page, limit))]
    async fn search(&self, filter: &EnginePageFilter, page: u32, limit: u32) -> RepositoryResult<(Vec<EnginePage>, u64)> {
        let filter = filter.to_document();
        let total = self.collection.count_documents(filter.clone(), None).await?;
        let options = page_options(doc! { "brand": 1, "code": 1 }, page, limit);
        let cursor = self.collection.find(filter, options).await?;
        let items = collect_all(cursor).await?;
        info!("Fetched {} of {} engine pages", items.len(), total);
        Ok((items, total))
    }

    #[instrument(skip(self))]
    async fn list_published(&self) -> RepositoryResult<Vec<EnginePage>> {
        let options = FindOptions::builder().sort(doc! { "brand": 1, "code": 1 }).build();
        let cursor = self.collection.find(doc! { "published": true }, options).await?;
        collect_all(cursor).await
    }

    #[instrument(skip(self))]
    async fn brands(&self) -> RepositoryResult<Vec<BrandCount>> {
        let pipeline = vec![
            doc! { "$match": { "published": true } },
            doc! { "$group": { "_id": "$brandSlug", "brand": { "$first": "$brand" }, "count": { "$sum": 1 } } },
            doc! { "$sort": { "brand": 1 } },
        ];
        let mut cursor = self.collection.aggregate(pipeline, None).await?;
        let mut brands = Vec::new();
        while let Some(row) = cursor.next().await {
            let row = row?;
            brands.push(BrandCount {
                brand_slug: row.get_str("_id").unwrap_or_default().to_string(),
                brand: row.get_str("brand").unwrap_or_default().to_string(),
                count: count_of(row.get("count")),
            });
        }
        Ok(brands)
    }

    #[instrument(skip(self, page), fields(id = ?page.id, code = %page.code))]
    async fn replace(&self, page: &EnginePage) -> RepositoryResult<()> {
        let id = page.id.ok_or_else(|| RepositoryError::validation("Engine page has no id"))?;
        if let Some(other) = self.find_by_code(&page.code).await? {
            if other.id != Some(id) {
                return Err(RepositoryError::already_exists(format!("Engine page already exists for code: {}", page.code)));
            }
        }
        let result = self.collection.replace_one(doc! { "_id": id }, page, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Engine page not found for ID: {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Engine page not found for ID: {}", id)));
        }
        info!("Engine page deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_document() {
        let filter = EnginePageFilter {
            q: Some("k9k".to_string()),
            published_only: true,
            brand_slug: Some("renault".to_string()),
        }
        .to_document();
        assert!(filter.contains_key("$or"));
        assert_eq!(filter.get_bool("published").unwrap(), true);
        assert_eq!(filter.get_str("brandSlug").unwrap(), "renault");
    }

    #[test]
    fn test_count_of() {
        assert_eq!(count_of(Some(&Bson::Int32(4))), 4);
        assert_eq!(count_of(Some(&Bson::Int64(7))), 7);
        assert_eq!(count_of(None), 0);
    }
}
