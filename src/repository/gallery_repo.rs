use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{options::FindOptions, Collection, Database};
use tracing::{error, info, instrument};

use crate::model::gallery::GalleryImage;
use crate::repository::mongo::{collect_all, page_options, search_filter};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

const SEARCH_FIELDS: [&str; 3] = ["title", "alt", "category"];

#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn create(&self, image: GalleryImage) -> RepositoryResult<GalleryImage>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<GalleryImage>;
    async fn list_published(&self) -> RepositoryResult<Vec<GalleryImage>>;
    async fn search(&self, q: Option<&str>, page: u32, limit: u32) -> RepositoryResult<(Vec<GalleryImage>, u64)>;
    async fn replace(&self, image: &GalleryImage) -> RepositoryResult<()>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoGalleryRepository {
    collection: Collection<GalleryImage>,
}

impl MongoGalleryRepository {
    pub fn new(db: &Database) -> Self {
        MongoGalleryRepository { collection: db.collection("gallery_images") }
    }
}

#[async_trait]
impl GalleryRepository for MongoGalleryRepository {
    #[instrument(skip(self, image), fields(object_key = %image.object_key))]
    async fn create(&self, mut image: GalleryImage) -> RepositoryResult<GalleryImage> {
        image.id = Some(ObjectId::new());
        self.collection.insert_one(&image, None).await.map_err(|e| {
            error!("Failed to insert gallery image: {}", e);
            RepositoryError::from(e)
        })?;
        info!("Gallery image created");
        Ok(image)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<GalleryImage> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Gallery image not found for ID: {}", id)))
    }

    #[instrument(skip(self))]
    async fn list_published(&self) -> RepositoryResult<Vec<GalleryImage>> {
        let options = FindOptions::builder().sort(doc! { "position": 1, "createdAt": -1 }).build();
        let cursor = self.collection.find(doc! { "published": true }, options).await?;
        collect_all(cursor).await
    }

    #[instrument(skip(self), fields(page, limit))]
    async fn search(&self, q: Option<&str>, page: u32, limit: u32) -> RepositoryResult<(Vec<GalleryImage>, u64)> {
        let filter = search_filter(&SEARCH_FIELDS, q);
        let total = self.collection.count_documents(filter.clone(), None).await?;
        let options = page_options(doc! { "position": 1, "createdAt": -1 }, page, limit);
        let cursor = self.collection.find(filter, options).await?;
        let items = collect_all(cursor).await?;
        info!("Fetched {} of {} gallery images", items.len(), total);
        Ok((items, total))
    }

    #[instrument(skip(self, image), fields(id = ?image.id))]
    async fn replace(&self, image: &GalleryImage) -> RepositoryResult<()> {
        let id = image.id.ok_or_else(|| RepositoryError::validation("Gallery image has no id"))?;
        let result = self.collection.replace_one(doc! { "_id": id }, image, None).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("Gallery image not found for ID: {}", id)));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Gallery image not found for ID: {}", id)));
        }
        info!("Gallery image deleted");
        Ok(())
    }
}
